use crate::jvm::class_file::{serialize_len_u16, Attribute, AttributeBody, Serialize};
use crate::jvm::Error;
use crate::util::{Offset, OffsetVec, Width};
use byteorder::WriteBytesExt;
use std::collections::HashMap;

/// Constants as in the constant pool
///
/// Every variant carries only what its body on the wire needs: literal values, or indices of
/// other constants.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Constant string value, already in modified UTF-8 form
    Utf8(ModifiedUtf8),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Field
    FieldRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Method of a class
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Method of an interface
    InterfaceMethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle {
        handle_kind: HandleKind,

        /// Depending on the method kind, this points to different things:
        ///
        ///   - `FieldRef` for `GetField`, `GetStatic`, `PutField`, `PutStatic`
        ///   - `MethodRef` or `InterfaceMethodRef` for the rest
        member: ConstantIndex,
    },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Module name (only in `module-info` classes)
    Module(Utf8ConstantIndex),

    /// Package name (only in `module-info` classes)
    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Tag byte which starts the `cp_info` structure
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => 1,
            Constant::Integer(_) => 3,
            Constant::Float(_) => 4,
            Constant::Long(_) => 5,
            Constant::Double(_) => 6,
            Constant::Class(_) => 7,
            Constant::String(_) => 8,
            Constant::FieldRef { .. } => 9,
            Constant::MethodRef { .. } => 10,
            Constant::InterfaceMethodRef { .. } => 11,
            Constant::NameAndType { .. } => 12,
            Constant::MethodHandle { .. } => 15,
            Constant::MethodType { .. } => 16,
            Constant::Dynamic { .. } => 17,
            Constant::InvokeDynamic { .. } => 18,
            Constant::Module(_) => 19,
            Constant::Package(_) => 20,
        }
    }

    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::Utf8(_) => ConstantKind::Utf8,
            Constant::Integer(_) => ConstantKind::Integer,
            Constant::Float(_) => ConstantKind::Float,
            Constant::Long(_) => ConstantKind::Long,
            Constant::Double(_) => ConstantKind::Double,
            Constant::Class(_) => ConstantKind::Class,
            Constant::String(_) => ConstantKind::String,
            Constant::FieldRef { .. } => ConstantKind::FieldRef,
            Constant::MethodRef { .. } => ConstantKind::MethodRef,
            Constant::InterfaceMethodRef { .. } => ConstantKind::InterfaceMethodRef,
            Constant::NameAndType { .. } => ConstantKind::NameAndType,
            Constant::MethodHandle { .. } => ConstantKind::MethodHandle,
            Constant::MethodType { .. } => ConstantKind::MethodType,
            Constant::Dynamic { .. } => ConstantKind::Dynamic,
            Constant::InvokeDynamic { .. } => ConstantKind::InvokeDynamic,
            Constant::Module(_) => ConstantKind::Module,
            Constant::Package(_) => ConstantKind::Package,
        }
    }
}

/// Discriminant of [`Constant`], used when reporting a reference to the wrong kind of constant
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum ConstantKind {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,

    /// Anything which can be loaded by `ldc`
    Loadable,

    /// Initial value of a constant field: a number or a string
    ConstantValue,

    /// Any constant at all
    Any,
}

impl ConstantKind {
    /// Does a constant of kind `found` satisfy a requirement for `self`?
    pub fn accepts(self, found: ConstantKind) -> bool {
        match self {
            ConstantKind::Any => true,
            ConstantKind::Loadable => matches!(
                found,
                ConstantKind::Integer
                    | ConstantKind::Float
                    | ConstantKind::Long
                    | ConstantKind::Double
                    | ConstantKind::Class
                    | ConstantKind::String
                    | ConstantKind::MethodHandle
                    | ConstantKind::MethodType
                    | ConstantKind::Dynamic
            ),
            ConstantKind::ConstantValue => matches!(
                found,
                ConstantKind::Integer
                    | ConstantKind::Float
                    | ConstantKind::Long
                    | ConstantKind::Double
                    | ConstantKind::String
            ),
            ConstantKind::MethodRef => matches!(
                found,
                ConstantKind::MethodRef | ConstantKind::InterfaceMethodRef
            ),
            expected => expected == found,
        }
    }
}

impl Serialize for Constant {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.tag().serialize(writer)?;
        match self {
            Constant::Utf8(utf8) => utf8.serialize(writer)?,
            Constant::Integer(integer) => integer.serialize(writer)?,
            Constant::Float(float) => float.serialize(writer)?,
            Constant::Long(long) => long.serialize(writer)?,
            Constant::Double(double) => double.serialize(writer)?,
            Constant::Class(name) => name.serialize(writer)?,
            Constant::String(utf8) => utf8.serialize(writer)?,
            Constant::FieldRef {
                class,
                name_and_type,
            }
            | Constant::MethodRef {
                class,
                name_and_type,
            }
            | Constant::InterfaceMethodRef {
                class,
                name_and_type,
            } => {
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::NameAndType { name, descriptor } => {
                name.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::MethodHandle {
                handle_kind,
                member,
            } => {
                handle_kind.serialize(writer)?;
                member.serialize(writer)?;
            }
            Constant::MethodType { descriptor } => descriptor.serialize(writer)?,
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            }
            | Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => {
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::Module(name) | Constant::Package(name) => name.serialize(writer)?,
        };
        Ok(())
    }
}

/// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`. Quoting
/// the JVM specification:
///
/// > All 8-byte constants take up two entries in the constant_pool table of the class file. If a
/// > CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the constant_pool table
/// > at index n, then the next usable item in the pool is located at index n+2. The constant_pool
/// > index n+1 must be valid but is considered unusable.
impl Width for Constant {
    fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

/// The pool is written as its count (one more than the largest usable index, counting the
/// unusable slots after wide constants) followed by every entry. Unusable slots have no bytes.
impl Serialize for OffsetVec<Constant> {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        serialize_len_u16(self.offset_len().0, "constant pool", writer)?;
        for (_, _, constant) in self {
            constant.serialize(writer)?;
        }
        Ok(())
    }
}

/// Bytes of a `CONSTANT_Utf8_info`, already in the JVM's modified UTF-8 form
///
/// Use `ModifiedUtf8::from` to encode a regular Rust string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ModifiedUtf8(Vec<u8>);

impl ModifiedUtf8 {
    /// Wrap bytes which are known to already be in modified UTF-8
    pub fn from_encoded(bytes: Vec<u8>) -> ModifiedUtf8 {
        ModifiedUtf8(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for ModifiedUtf8 {
    fn from(string: &str) -> ModifiedUtf8 {
        ModifiedUtf8(encode_modified_utf8(string))
    }
}

impl std::fmt::Debug for ModifiedUtf8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for ModifiedUtf8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        let len = u16::try_from(self.0.len()).map_err(|_| Error::Utf8TooLong(self.0.len()))?;
        len.serialize(writer)?;
        writer.write_all(&self.0)?;
        Ok(())
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = Vec::with_capacity(string.len());
    for c in string.chars() {
        let code: u32 = c as u32;
        match code {
            0x0001..=0x007F => buffer.push(code as u8),

            // `\u{0000}` lands here too, so there are never null bytes in the output
            0x0000 | 0x0080..=0x07FF => {
                buffer.push((code >> 6 & 0x1F) as u8 | 0b1100_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
            0x0800..=0xFFFF => push_three_byte_unit(&mut buffer, code),

            // Supplementary characters become a surrogate pair, each encoded in 3 bytes
            _ => {
                let shifted = code - 0x10000;
                push_three_byte_unit(&mut buffer, 0xD800 | (shifted >> 10));
                push_three_byte_unit(&mut buffer, 0xDC00 | (shifted & 0x3FF));
            }
        }
    }
    buffer
}

fn push_three_byte_unit(buffer: &mut Vec<u8>, unit: u32) {
    buffer.push((unit >> 12 & 0x0F) as u8 | 0b1110_0000);
    buffer.push((unit >> 6 & 0x3F) as u8 | 0b1000_0000);
    buffer.push((unit & 0x3F) as u8 | 0b1000_0000);
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ConstantIndex(pub u16);

impl ConstantIndex {
    /// Index 0, used wherever the format allows "no constant"
    pub const NONE: ConstantIndex = ConstantIndex(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.0.serialize(writer)
    }
}

/// Index which is expected to point at a specific kind of constant
pub trait TypedConstantIndex: Copy {
    const KIND: ConstantKind;

    fn index(self) -> ConstantIndex;
}

impl TypedConstantIndex for ConstantIndex {
    const KIND: ConstantKind = ConstantKind::Any;

    fn index(self) -> ConstantIndex {
        self
    }
}

macro_rules! typed_constant_index {
    ($name:ident, $kind:expr) => {
        #[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
        pub struct $name(pub ConstantIndex);

        impl $name {
            pub const NONE: $name = $name(ConstantIndex::NONE);

            pub fn is_none(self) -> bool {
                self.0.is_none()
            }
        }

        impl TypedConstantIndex for $name {
            const KIND: ConstantKind = $kind;

            fn index(self) -> ConstantIndex {
                self.0
            }
        }

        impl From<$name> for ConstantIndex {
            fn from(index: $name) -> ConstantIndex {
                index.0
            }
        }

        impl Serialize for $name {
            fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
                self.0.serialize(writer)
            }
        }
    };
}

typed_constant_index!(Utf8ConstantIndex, ConstantKind::Utf8);
typed_constant_index!(ClassConstantIndex, ConstantKind::Class);
typed_constant_index!(StringConstantIndex, ConstantKind::String);
typed_constant_index!(NameAndTypeConstantIndex, ConstantKind::NameAndType);
typed_constant_index!(FieldRefConstantIndex, ConstantKind::FieldRef);
typed_constant_index!(MethodRefConstantIndex, ConstantKind::MethodRef);
typed_constant_index!(MethodHandleConstantIndex, ConstantKind::MethodHandle);
typed_constant_index!(LoadableConstantIndex, ConstantKind::Loadable);

/// Type of method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-5.html#jvms-5.4.3.5-220
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl HandleKind {
    /// Kind of constant the handle's `member` must point at
    pub fn member_kind(self) -> ConstantKind {
        match self {
            HandleKind::GetField
            | HandleKind::GetStatic
            | HandleKind::PutField
            | HandleKind::PutStatic => ConstantKind::FieldRef,
            HandleKind::InvokeInterface => ConstantKind::InterfaceMethodRef,
            _ => ConstantKind::MethodRef,
        }
    }
}

impl Serialize for HandleKind {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        let byte: u8 = match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9,
        };
        byte.serialize(writer)
    }
}

/// Class file constants pool builder
///
/// The pool is append only and deduplicates entries. Once it is fully built up, it can be
/// consumed into a regular [`OffsetVec`] for a [`super::ClassFile`].
pub struct ConstantsPool {
    constants: OffsetVec<Constant>,

    utf8s: HashMap<String, Utf8ConstantIndex>,
    classes: HashMap<Utf8ConstantIndex, ClassConstantIndex>,
    strings: HashMap<Utf8ConstantIndex, StringConstantIndex>,
    name_and_types: HashMap<(Utf8ConstantIndex, Utf8ConstantIndex), NameAndTypeConstantIndex>,
    fieldrefs: HashMap<(ClassConstantIndex, NameAndTypeConstantIndex), FieldRefConstantIndex>,
    methodrefs:
        HashMap<(ClassConstantIndex, NameAndTypeConstantIndex, bool), MethodRefConstantIndex>,
    integers: HashMap<i32, LoadableConstantIndex>,
    floats: HashMap<u32, LoadableConstantIndex>,
    longs: HashMap<i64, LoadableConstantIndex>,
    doubles: HashMap<u64, LoadableConstantIndex>,
}

impl Default for ConstantsPool {
    fn default() -> Self {
        ConstantsPool::new()
    }
}

impl ConstantsPool {
    /// Largest count the pool may have, so the largest usable index is one less
    const MAX_COUNT: usize = u16::MAX as usize;

    /// Make a fresh empty constants pool
    pub fn new() -> ConstantsPool {
        ConstantsPool {
            constants: OffsetVec::new_starting_at(Offset(1)),
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            strings: HashMap::new(),
            name_and_types: HashMap::new(),
            fieldrefs: HashMap::new(),
            methodrefs: HashMap::new(),
            integers: HashMap::new(),
            floats: HashMap::new(),
            longs: HashMap::new(),
            doubles: HashMap::new(),
        }
    }

    /// Push a constant into the constant pool, provided there is space for it
    ///
    /// Note: indexing starts at 1 and some constants take two spaces.
    pub fn push_constant(&mut self, constant: Constant) -> Result<ConstantIndex, Error> {
        let offset = self.constants.offset_len().0;
        if offset + constant.width() > ConstantsPool::MAX_COUNT {
            return Err(Error::ConstantPoolOverflow { offset });
        }
        self.constants.push(constant);
        Ok(ConstantIndex(offset as u16))
    }

    /// Consume the pool and return the final vector of constants
    pub fn into_offset_vec(self) -> OffsetVec<Constant> {
        self.constants
    }

    /// Get or insert a utf8 constant
    pub fn get_utf8(&mut self, utf8: &str) -> Result<Utf8ConstantIndex, Error> {
        if let Some(idx) = self.utf8s.get(utf8) {
            return Ok(*idx);
        }
        let constant = Constant::Utf8(ModifiedUtf8::from(utf8));
        let idx = Utf8ConstantIndex(self.push_constant(constant)?);
        self.utf8s.insert(utf8.to_owned(), idx);
        Ok(idx)
    }

    /// Get or insert a class constant from a binary name (eg. `java/lang/Object`)
    pub fn get_class(&mut self, name: &str) -> Result<ClassConstantIndex, Error> {
        let name = self.get_utf8(name)?;
        if let Some(idx) = self.classes.get(&name) {
            return Ok(*idx);
        }
        let idx = ClassConstantIndex(self.push_constant(Constant::Class(name))?);
        self.classes.insert(name, idx);
        Ok(idx)
    }

    /// Get or insert a string constant
    pub fn get_string(&mut self, string: &str) -> Result<StringConstantIndex, Error> {
        let utf8 = self.get_utf8(string)?;
        if let Some(idx) = self.strings.get(&utf8) {
            return Ok(*idx);
        }
        let idx = StringConstantIndex(self.push_constant(Constant::String(utf8))?);
        self.strings.insert(utf8, idx);
        Ok(idx)
    }

    /// Get or insert a name & type constant
    pub fn get_name_and_type(
        &mut self,
        name: &str,
        descriptor: &str,
    ) -> Result<NameAndTypeConstantIndex, Error> {
        let name = self.get_utf8(name)?;
        let descriptor = self.get_utf8(descriptor)?;
        if let Some(idx) = self.name_and_types.get(&(name, descriptor)) {
            return Ok(*idx);
        }
        let constant = Constant::NameAndType { name, descriptor };
        let idx = NameAndTypeConstantIndex(self.push_constant(constant)?);
        self.name_and_types.insert((name, descriptor), idx);
        Ok(idx)
    }

    /// Get or insert a `CONSTANT_Fieldref_info`
    pub fn get_field_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<FieldRefConstantIndex, Error> {
        let class = self.get_class(class)?;
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        if let Some(idx) = self.fieldrefs.get(&(class, name_and_type)) {
            return Ok(*idx);
        }
        let constant = Constant::FieldRef {
            class,
            name_and_type,
        };
        let idx = FieldRefConstantIndex(self.push_constant(constant)?);
        self.fieldrefs.insert((class, name_and_type), idx);
        Ok(idx)
    }

    /// Get or insert a `CONSTANT_Methodref_info` or `CONSTANT_InterfaceMethodref_info`
    pub fn get_method_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> Result<MethodRefConstantIndex, Error> {
        let class = self.get_class(class)?;
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        let key = (class, name_and_type, is_interface);
        if let Some(idx) = self.methodrefs.get(&key) {
            return Ok(*idx);
        }
        let constant = if is_interface {
            Constant::InterfaceMethodRef {
                class,
                name_and_type,
            }
        } else {
            Constant::MethodRef {
                class,
                name_and_type,
            }
        };
        let idx = MethodRefConstantIndex(self.push_constant(constant)?);
        self.methodrefs.insert(key, idx);
        Ok(idx)
    }

    pub fn get_integer(&mut self, integer: i32) -> Result<LoadableConstantIndex, Error> {
        if let Some(idx) = self.integers.get(&integer) {
            return Ok(*idx);
        }
        let idx = LoadableConstantIndex(self.push_constant(Constant::Integer(integer))?);
        self.integers.insert(integer, idx);
        Ok(idx)
    }

    /// Floats are deduplicated by bit pattern, so `-0.0` and `NaN`s are kept distinct
    pub fn get_float(&mut self, float: f32) -> Result<LoadableConstantIndex, Error> {
        if let Some(idx) = self.floats.get(&float.to_bits()) {
            return Ok(*idx);
        }
        let idx = LoadableConstantIndex(self.push_constant(Constant::Float(float))?);
        self.floats.insert(float.to_bits(), idx);
        Ok(idx)
    }

    pub fn get_long(&mut self, long: i64) -> Result<LoadableConstantIndex, Error> {
        if let Some(idx) = self.longs.get(&long) {
            return Ok(*idx);
        }
        let idx = LoadableConstantIndex(self.push_constant(Constant::Long(long))?);
        self.longs.insert(long, idx);
        Ok(idx)
    }

    pub fn get_double(&mut self, double: f64) -> Result<LoadableConstantIndex, Error> {
        if let Some(idx) = self.doubles.get(&double.to_bits()) {
            return Ok(*idx);
        }
        let idx = LoadableConstantIndex(self.push_constant(Constant::Double(double))?);
        self.doubles.insert(double.to_bits(), idx);
        Ok(idx)
    }

    /// Attach the name of an attribute, inserting it into the pool if needed
    pub fn get_attribute(&mut self, body: AttributeBody) -> Result<Attribute, Error> {
        let name = body.name().ok_or(Error::UnnamedAttribute)?;
        let name_index = self.get_utf8(name)?;
        Ok(Attribute { name_index, body })
    }

    /// Attach a name to the raw bytes of an attribute
    pub fn get_unknown_attribute(&mut self, name: &str, info: Vec<u8>) -> Result<Attribute, Error> {
        let name_index = self.get_utf8(name)?;
        Ok(Attribute {
            name_index,
            body: AttributeBody::Unknown(info),
        })
    }
}
