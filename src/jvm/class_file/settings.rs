/// Knobs controlling how much checking happens before a class file is written
///
/// Checks run over the whole class before a single byte is produced, so a class which fails them
/// produces no output at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSettings {
    /// Every constant index must be in range, must not be the unusable slot after a `Long` or
    /// `Double`, and must point at the kind of constant its position requires
    pub check_constant_indices: bool,

    /// Every attribute must be one which the class file format allows where it is attached (eg.
    /// no `SourceFile` inside `Code`)
    pub check_attribute_placement: bool,
}

impl WriterSettings {
    /// Settings for models which are already known to be well-formed
    pub fn unchecked() -> WriterSettings {
        WriterSettings {
            check_constant_indices: false,
            check_attribute_placement: false,
        }
    }

    pub fn checks_anything(&self) -> bool {
        self.check_constant_indices || self.check_attribute_placement
    }
}

impl Default for WriterSettings {
    fn default() -> Self {
        WriterSettings {
            check_constant_indices: true,
            check_attribute_placement: true,
        }
    }
}
