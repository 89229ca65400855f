use crate::jvm::class_file::{Attribute, ClassConstantIndex, Serialize, Utf8ConstantIndex};
use crate::jvm::Error;
use byteorder::WriteBytesExt;

/// Body of the `Code` attribute
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.3
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,

    /// Encoded bytecode instructions
    pub code_array: Vec<u8>,
    pub exception_table: Vec<ExceptionHandler>,

    /// Only `LineNumberTable`, `LocalVariableTable`, `LocalVariableTypeTable`, `StackMap`,
    /// `StackMapTable` and unknown attributes belong here
    pub attributes: Vec<Attribute>,
}

impl Code {
    /// A method body may not exceed this many bytes
    pub const MAX_CODE_LENGTH: usize = u16::MAX as usize;
}

impl Serialize for Code {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.max_stack.serialize(writer)?;
        self.max_locals.serialize(writer)?;

        let code_len = self.code_array.len();
        if code_len == 0 {
            return Err(Error::EmptyCode);
        } else if code_len > Code::MAX_CODE_LENGTH {
            return Err(Error::CodeTooLong(code_len));
        }
        (code_len as u32).serialize(writer)?;
        writer.write_all(&self.code_array)?;

        self.exception_table.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of exception handler range (inclusive)
    pub start_pc: u16,

    /// End of exception handler range (exclusive)
    pub end_pc: u16,

    /// Start of the exception handler
    pub handler_pc: u16,

    /// Class of exceptions caught, or `ClassConstantIndex::NONE` to catch everything
    pub catch_type: ClassConstantIndex,
}

impl Serialize for ExceptionHandler {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.start_pc.serialize(writer)?;
        self.end_pc.serialize(writer)?;
        self.handler_pc.serialize(writer)?;
        self.catch_type.serialize(writer)?;
        Ok(())
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.12
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

impl Serialize for LineNumber {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.start_pc.serialize(writer)?;
        self.line_number.serialize(writer)?;
        Ok(())
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.13
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: Utf8ConstantIndex,
    pub descriptor: Utf8ConstantIndex,

    /// Local variable slot
    pub index: u16,
}

impl Serialize for LocalVariable {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.start_pc.serialize(writer)?;
        self.length.serialize(writer)?;
        self.name.serialize(writer)?;
        self.descriptor.serialize(writer)?;
        self.index.serialize(writer)?;
        Ok(())
    }
}

/// Same layout as [`LocalVariable`], but with a generic signature instead of a descriptor
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.14
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalVariableType {
    pub start_pc: u16,
    pub length: u16,
    pub name: Utf8ConstantIndex,
    pub signature: Utf8ConstantIndex,
    pub index: u16,
}

impl Serialize for LocalVariableType {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.start_pc.serialize(writer)?;
        self.length.serialize(writer)?;
        self.name.serialize(writer)?;
        self.signature.serialize(writer)?;
        self.index.serialize(writer)?;
        Ok(())
    }
}
