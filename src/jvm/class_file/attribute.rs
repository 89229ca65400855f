use crate::jvm::class_file::{
    serialize_framed, serialize_list_u8, Annotation, ClassConstantIndex, Code, ElementValue,
    LineNumber, LoadableConstantIndex, LocalVariable, LocalVariableType,
    MethodHandleConstantIndex, NameAndTypeConstantIndex, Serialize, StackMapFrame,
    StackMapFullFrame, Utf8ConstantIndex,
};
use crate::jvm::{Error, InnerClassAccessFlags, ParameterAccessFlags};
use byteorder::WriteBytesExt;

/// Attributes (used in classes, fields, methods, and even on some attributes)
///
/// Every attribute is stored in the same way: the index of its name, the `u32` length of its
/// body, then the body. The name index is resolved by whoever builds the class (it should point
/// at the UTF-8 constant matching [`AttributeBody::name`]).
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name_index: Utf8ConstantIndex,
    pub body: AttributeBody,
}

impl Serialize for Attribute {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.name_index.serialize(writer)?;
        serialize_framed(writer, |body| self.body.serialize(body))?;
        Ok(())
    }
}

/// Where an attribute is attached
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum AttributeContext {
    Class,
    Field,
    Method,

    /// Nested inside the `Code` attribute of a method
    Code,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeBody {
    /// Attribute this crate doesn't model, kept as raw bytes
    Unknown(Vec<u8>),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.10
    SourceFile(Utf8ConstantIndex),

    /// Directory of the source file (non-standard, written by some compilers)
    SourceDir(Utf8ConstantIndex),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.11
    SourceDebugExtension(Vec<u8>),

    /// Every inner class referenced in a class' constant pool must be included in the inner
    /// classes attribute on the class.
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.6
    InnerClasses(Vec<InnerClass>),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.7
    EnclosingMethod {
        class: ClassConstantIndex,

        /// `NameAndTypeConstantIndex::NONE` when the class is not enclosed by a method
        method: NameAndTypeConstantIndex,
    },

    Deprecated,
    Synthetic,

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.9
    Signature(Utf8ConstantIndex),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.2
    ConstantValue(LoadableConstantIndex),

    /// Checked exceptions a method may throw
    Exceptions(Vec<ClassConstantIndex>),

    Code(Code),

    /// CLDC stack maps, which predate `StackMapTable`
    StackMap(Vec<StackMapFullFrame>),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.4
    StackMapTable(Vec<StackMapFrame>),

    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    LocalVariableTypeTable(Vec<LocalVariableType>),

    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),

    /// Annotations on each formal parameter (the parameter count is a `u8`)
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),

    /// Default value of an annotation interface element
    AnnotationDefault(ElementValue),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.23
    BootstrapMethods(Vec<BootstrapMethod>),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.28
    NestHost(ClassConstantIndex),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.29
    NestMembers(Vec<ClassConstantIndex>),

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.24
    MethodParameters(Vec<MethodParameter>),
}

impl AttributeBody {
    /// Name of the attribute, which is what the attribute's name index should point at
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            AttributeBody::Unknown(_) => return None,
            AttributeBody::SourceFile(_) => "SourceFile",
            AttributeBody::SourceDir(_) => "SourceDir",
            AttributeBody::SourceDebugExtension(_) => "SourceDebugExtension",
            AttributeBody::InnerClasses(_) => "InnerClasses",
            AttributeBody::EnclosingMethod { .. } => "EnclosingMethod",
            AttributeBody::Deprecated => "Deprecated",
            AttributeBody::Synthetic => "Synthetic",
            AttributeBody::Signature(_) => "Signature",
            AttributeBody::ConstantValue(_) => "ConstantValue",
            AttributeBody::Exceptions(_) => "Exceptions",
            AttributeBody::Code(_) => "Code",
            AttributeBody::StackMap(_) => "StackMap",
            AttributeBody::StackMapTable(_) => "StackMapTable",
            AttributeBody::LineNumberTable(_) => "LineNumberTable",
            AttributeBody::LocalVariableTable(_) => "LocalVariableTable",
            AttributeBody::LocalVariableTypeTable(_) => "LocalVariableTypeTable",
            AttributeBody::RuntimeVisibleAnnotations(_) => "RuntimeVisibleAnnotations",
            AttributeBody::RuntimeInvisibleAnnotations(_) => "RuntimeInvisibleAnnotations",
            AttributeBody::RuntimeVisibleParameterAnnotations(_) => {
                "RuntimeVisibleParameterAnnotations"
            }
            AttributeBody::RuntimeInvisibleParameterAnnotations(_) => {
                "RuntimeInvisibleParameterAnnotations"
            }
            AttributeBody::AnnotationDefault(_) => "AnnotationDefault",
            AttributeBody::BootstrapMethods(_) => "BootstrapMethods",
            AttributeBody::NestHost(_) => "NestHost",
            AttributeBody::NestMembers(_) => "NestMembers",
            AttributeBody::MethodParameters(_) => "MethodParameters",
        };
        Some(name)
    }

    /// Does the class file format allow at most one of this attribute in any one place?
    pub fn at_most_once(&self) -> bool {
        !matches!(
            self,
            AttributeBody::Unknown(_)
                | AttributeBody::SourceDir(_)
                | AttributeBody::Deprecated
                | AttributeBody::Synthetic
                | AttributeBody::StackMap(_)
                | AttributeBody::LineNumberTable(_)
                | AttributeBody::LocalVariableTable(_)
                | AttributeBody::LocalVariableTypeTable(_)
        )
    }

    /// Can this attribute be attached in the given context?
    pub fn allowed_in(&self, context: AttributeContext) -> bool {
        match self {
            AttributeBody::Unknown(_) => true,

            AttributeBody::SourceFile(_)
            | AttributeBody::SourceDir(_)
            | AttributeBody::SourceDebugExtension(_)
            | AttributeBody::InnerClasses(_)
            | AttributeBody::EnclosingMethod { .. }
            | AttributeBody::BootstrapMethods(_)
            | AttributeBody::NestHost(_)
            | AttributeBody::NestMembers(_) => context == AttributeContext::Class,

            AttributeBody::Deprecated
            | AttributeBody::Synthetic
            | AttributeBody::Signature(_)
            | AttributeBody::RuntimeVisibleAnnotations(_)
            | AttributeBody::RuntimeInvisibleAnnotations(_) => context != AttributeContext::Code,

            AttributeBody::ConstantValue(_) => context == AttributeContext::Field,

            AttributeBody::Code(_)
            | AttributeBody::Exceptions(_)
            | AttributeBody::RuntimeVisibleParameterAnnotations(_)
            | AttributeBody::RuntimeInvisibleParameterAnnotations(_)
            | AttributeBody::AnnotationDefault(_)
            | AttributeBody::MethodParameters(_) => context == AttributeContext::Method,

            AttributeBody::StackMap(_)
            | AttributeBody::StackMapTable(_)
            | AttributeBody::LineNumberTable(_)
            | AttributeBody::LocalVariableTable(_)
            | AttributeBody::LocalVariableTypeTable(_) => context == AttributeContext::Code,
        }
    }
}

/// Serializes just the body (what goes after the length)
impl Serialize for AttributeBody {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            AttributeBody::Unknown(bytes) | AttributeBody::SourceDebugExtension(bytes) => {
                writer.write_all(bytes)?
            }
            AttributeBody::SourceFile(utf8)
            | AttributeBody::SourceDir(utf8)
            | AttributeBody::Signature(utf8) => utf8.serialize(writer)?,
            AttributeBody::InnerClasses(inner_classes) => inner_classes.serialize(writer)?,
            AttributeBody::EnclosingMethod { class, method } => {
                class.serialize(writer)?;
                method.serialize(writer)?;
            }
            AttributeBody::Deprecated | AttributeBody::Synthetic => (),
            AttributeBody::ConstantValue(value) => value.serialize(writer)?,
            AttributeBody::Exceptions(classes) | AttributeBody::NestMembers(classes) => {
                classes.serialize(writer)?
            }
            AttributeBody::Code(code) => code.serialize(writer)?,
            AttributeBody::StackMap(frames) => frames.serialize(writer)?,
            AttributeBody::StackMapTable(frames) => frames.serialize(writer)?,
            AttributeBody::LineNumberTable(lines) => lines.serialize(writer)?,
            AttributeBody::LocalVariableTable(locals) => locals.serialize(writer)?,
            AttributeBody::LocalVariableTypeTable(locals) => locals.serialize(writer)?,
            AttributeBody::RuntimeVisibleAnnotations(annotations)
            | AttributeBody::RuntimeInvisibleAnnotations(annotations) => {
                annotations.serialize(writer)?
            }
            AttributeBody::RuntimeVisibleParameterAnnotations(parameters)
            | AttributeBody::RuntimeInvisibleParameterAnnotations(parameters) => {
                serialize_list_u8(parameters, "parameter annotations", writer)?
            }
            AttributeBody::AnnotationDefault(value) => value.serialize(writer)?,
            AttributeBody::BootstrapMethods(methods) => methods.serialize(writer)?,
            AttributeBody::NestHost(class) => class.serialize(writer)?,
            AttributeBody::MethodParameters(parameters) => {
                serialize_list_u8(parameters, "method parameters", writer)?
            }
        };
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class: ClassConstantIndex,

    /// `ClassConstantIndex::NONE` for local and anonymous classes
    pub outer_class: ClassConstantIndex,

    /// `Utf8ConstantIndex::NONE` for anonymous classes
    pub inner_name: Utf8ConstantIndex,
    pub access_flags: InnerClassAccessFlags,
}

impl Serialize for InnerClass {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.inner_class.serialize(writer)?;
        self.outer_class.serialize(writer)?;
        self.inner_name.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub bootstrap_method: MethodHandleConstantIndex,
    pub bootstrap_arguments: Vec<LoadableConstantIndex>,
}

impl Serialize for BootstrapMethod {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.bootstrap_method.serialize(writer)?;
        self.bootstrap_arguments.serialize(writer)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// `Utf8ConstantIndex::NONE` for a parameter without a name
    pub name: Utf8ConstantIndex,
    pub access_flags: ParameterAccessFlags,
}

impl Serialize for MethodParameter {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.name.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        Ok(())
    }
}
