use super::class_file::{AttributeContext, ConstantIndex, ConstantKind};
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The output sink failed
    IoError(std::io::Error),

    /// A sequence has more elements than its count field can express
    TooManyElements { what: &'static str, len: usize },

    /// Bytecode array is longer than the 65535 bytes a method body may hold
    CodeTooLong(usize),

    /// Bytecode array is empty, but a method body needs at least one instruction
    EmptyCode,

    /// Encoded `CONSTANT_Utf8_info` is longer than 65535 bytes
    Utf8TooLong(usize),

    /// Index is zero where that isn't allowed, is past the end of the pool, or points at the
    /// unusable slot following a `Long` or `Double`
    InvalidConstantIndex { index: ConstantIndex, pool_len: u16 },

    /// Index points at a constant of the wrong kind
    WrongConstantKind {
        index: ConstantIndex,
        expected: ConstantKind,
        found: ConstantKind,
    },

    /// Attribute appears somewhere the class file format doesn't allow it
    MisplacedAttribute {
        attribute: &'static str,
        context: AttributeContext,
    },

    /// Attribute is attached more than once where the class file format allows only one
    DuplicateAttribute {
        attribute: &'static str,
        context: AttributeContext,
    },

    /// Name index of an attribute points at a different name than its body has
    AttributeNameMismatch {
        index: ConstantIndex,
        expected: &'static str,
    },

    /// Attribute without a fixed name can't have its name looked up
    UnnamedAttribute,

    /// `chop_frame` can only remove 1 to 3 locals
    ChopOutOfRange(u8),

    /// `append_frame` can only add 1 to 3 locals
    AppendOutOfRange(usize),

    /// The constants pool builder ran out of indices
    ConstantPoolOverflow { offset: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "I/O error: {}", err),
            Error::TooManyElements { what, len } => {
                write!(f, "{} has {} elements, which does not fit its count", what, len)
            }
            Error::CodeTooLong(len) => write!(f, "code array is {} bytes long", len),
            Error::EmptyCode => write!(f, "code array is empty"),
            Error::Utf8TooLong(len) => write!(f, "UTF-8 constant is {} bytes long", len),
            Error::InvalidConstantIndex { index, pool_len } => write!(
                f,
                "constant index #{} is not valid in a pool with count {}",
                index.0, pool_len
            ),
            Error::WrongConstantKind {
                index,
                expected,
                found,
            } => write!(
                f,
                "constant #{} should be {:?} but is {:?}",
                index.0, expected, found
            ),
            Error::MisplacedAttribute { attribute, context } => {
                write!(f, "{} attribute is not allowed on a {:?}", attribute, context)
            }
            Error::DuplicateAttribute { attribute, context } => write!(
                f,
                "{} attribute appears more than once on a {:?}",
                attribute, context
            ),
            Error::AttributeNameMismatch { index, expected } => write!(
                f,
                "attribute name #{} does not spell out {}",
                index.0, expected
            ),
            Error::UnnamedAttribute => write!(f, "unknown attributes need an explicit name"),
            Error::ChopOutOfRange(k) => write!(f, "chop frame cannot remove {} locals", k),
            Error::AppendOutOfRange(k) => write!(f, "append frame cannot add {} locals", k),
            Error::ConstantPoolOverflow { offset } => {
                write!(f, "constant pool is full at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}
