use crate::jvm::class_file::{ConstantIndex, Serialize, Utf8ConstantIndex};
use crate::jvm::Error;
use byteorder::WriteBytesExt;

/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.16
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface (eg. `Ljava/lang/Deprecated;`)
    pub type_index: Utf8ConstantIndex,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl Serialize for Annotation {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.type_index.serialize(writer)?;
        self.element_value_pairs.serialize(writer)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValuePair {
    pub element_name: Utf8ConstantIndex,
    pub value: ElementValue,
}

impl Serialize for ElementValuePair {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.element_name.serialize(writer)?;
        self.value.serialize(writer)?;
        Ok(())
    }
}

/// Value of an annotation element
///
/// Serializing an `ElementValue` never writes an element name: names only exist on
/// [`ElementValuePair`], so array elements and annotation defaults are bare.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.16.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// Primitive or string constant
    Constant {
        tag: ElementConstantTag,
        value: ConstantIndex,
    },

    /// Enum constant, as the field descriptor of the enum and the simple name of the constant
    EnumConstant {
        type_name: Utf8ConstantIndex,
        const_name: Utf8ConstantIndex,
    },

    /// Class literal, as a return descriptor (eg. `Ljava/lang/Object;` or `V`)
    Class(Utf8ConstantIndex),

    /// Nested annotation
    Annotation(Annotation),

    /// Array of values
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Constant { tag, .. } => tag.tag(),
            ElementValue::EnumConstant { .. } => b'e',
            ElementValue::Class(_) => b'c',
            ElementValue::Annotation(_) => b'@',
            ElementValue::Array(_) => b'[',
        }
    }
}

impl Serialize for ElementValue {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.tag().serialize(writer)?;
        match self {
            ElementValue::Constant { value, .. } => value.serialize(writer)?,
            ElementValue::EnumConstant {
                type_name,
                const_name,
            } => {
                type_name.serialize(writer)?;
                const_name.serialize(writer)?;
            }
            ElementValue::Class(class_info) => class_info.serialize(writer)?,
            ElementValue::Annotation(annotation) => annotation.serialize(writer)?,
            ElementValue::Array(values) => values.serialize(writer)?,
        };
        Ok(())
    }
}

/// Type of a constant element value, which also determines the pool constant it points at
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ElementConstantTag {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    String,
}

impl ElementConstantTag {
    pub fn tag(self) -> u8 {
        match self {
            ElementConstantTag::Byte => b'B',
            ElementConstantTag::Char => b'C',
            ElementConstantTag::Double => b'D',
            ElementConstantTag::Float => b'F',
            ElementConstantTag::Int => b'I',
            ElementConstantTag::Long => b'J',
            ElementConstantTag::Short => b'S',
            ElementConstantTag::Boolean => b'Z',
            ElementConstantTag::String => b's',
        }
    }
}
