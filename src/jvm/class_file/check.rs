use crate::jvm::class_file::{
    Annotation, Attribute, AttributeBody, AttributeContext, ClassFile, Constant, ConstantIndex,
    ConstantKind, ElementConstantTag, ElementValue, StackMapFrame, TypedConstantIndex,
    Utf8ConstantIndex, VerificationType, WriterSettings,
};
use crate::jvm::Error;
use crate::util::{Offset, OffsetResult, OffsetVec};

/// Check a class file before it is encoded
///
/// Nothing here changes the model: the point is to fail loudly instead of producing a class file
/// which the JVM would reject (or worse, misinterpret).
pub fn check_class_file(class: &ClassFile, settings: &WriterSettings) -> Result<(), Error> {
    let checker = Checker {
        constants: &class.constants,
        settings,
    };

    if settings.check_constant_indices {
        checker.check_pool()?;
        checker.require(class.this_class)?;
        checker.require_optional(class.super_class)?;
        for interface in &class.interfaces {
            checker.require(*interface)?;
        }
    }

    for field in &class.fields {
        if settings.check_constant_indices {
            checker.require(field.name_index)?;
            checker.require(field.descriptor_index)?;
        }
        checker.check_attributes(&field.attributes, AttributeContext::Field)?;
    }

    for method in &class.methods {
        if settings.check_constant_indices {
            checker.require(method.name_index)?;
            checker.require(method.descriptor_index)?;
        }
        checker.check_attributes(&method.attributes, AttributeContext::Method)?;
    }

    checker.check_attributes(&class.attributes, AttributeContext::Class)
}

struct Checker<'a> {
    constants: &'a OffsetVec<Constant>,
    settings: &'a WriterSettings,
}

impl<'a> Checker<'a> {
    fn invalid(&self, index: ConstantIndex) -> Error {
        Error::InvalidConstantIndex {
            index,
            pool_len: self.constants.offset_len().0.min(u16::MAX as usize) as u16,
        }
    }

    /// Index must point at the start of a constant of the right kind
    fn require<I: TypedConstantIndex>(&self, index: I) -> Result<(), Error> {
        let index = index.index();
        if index.is_none() {
            return Err(self.invalid(index));
        }
        match self.constants.get_offset(Offset(index.0 as usize)) {
            OffsetResult::Ok(_, constant) => {
                let found = constant.kind();
                if I::KIND.accepts(found) {
                    Ok(())
                } else {
                    Err(Error::WrongConstantKind {
                        index,
                        expected: I::KIND,
                        found,
                    })
                }
            }
            _ => Err(self.invalid(index)),
        }
    }

    /// Like `require`, but index 0 (no constant) is also fine
    fn require_optional<I: TypedConstantIndex>(&self, index: I) -> Result<(), Error> {
        if index.index().is_none() {
            Ok(())
        } else {
            self.require(index)
        }
    }

    fn require_kind(&self, index: ConstantIndex, expected: ConstantKind) -> Result<(), Error> {
        self.require(index)?;
        match self.constants.get_offset(Offset(index.0 as usize)).ok() {
            Some(constant) if expected.accepts(constant.kind()) => Ok(()),
            Some(constant) => Err(Error::WrongConstantKind {
                index,
                expected,
                found: constant.kind(),
            }),
            None => Err(self.invalid(index)),
        }
    }

    /// The pool itself must be 1-indexed and its entries must only refer to each other correctly
    fn check_pool(&self) -> Result<(), Error> {
        let first_offset = match self.constants.iter().next() {
            Some((offset, _, _)) => offset,
            None => self.constants.offset_len(),
        };
        if first_offset != Offset(1) {
            return Err(self.invalid(ConstantIndex::NONE));
        }
        if self.constants.offset_len().0 > u16::MAX as usize {
            return Err(Error::TooManyElements {
                what: "constant pool",
                len: self.constants.offset_len().0,
            });
        }

        for (_, _, constant) in self.constants {
            match constant {
                Constant::Utf8(_)
                | Constant::Integer(_)
                | Constant::Float(_)
                | Constant::Long(_)
                | Constant::Double(_) => (),
                Constant::Class(utf8)
                | Constant::String(utf8)
                | Constant::Module(utf8)
                | Constant::Package(utf8) => self.require(*utf8)?,
                Constant::MethodType { descriptor } => self.require(*descriptor)?,
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
                    self.require(*class)?;
                    self.require(*name_and_type)?;
                }
                Constant::NameAndType { name, descriptor } => {
                    self.require(*name)?;
                    self.require(*descriptor)?;
                }
                Constant::MethodHandle {
                    handle_kind,
                    member,
                } => self.require_kind(*member, handle_kind.member_kind())?,
                Constant::Dynamic { name_and_type, .. }
                | Constant::InvokeDynamic { name_and_type, .. } => {
                    self.require(*name_and_type)?
                }
            }
        }
        Ok(())
    }

    fn check_attributes(
        &self,
        attributes: &[Attribute],
        context: AttributeContext,
    ) -> Result<(), Error> {
        let mut seen: Vec<&'static str> = vec![];
        for attribute in attributes {
            let name = attribute.body.name();
            if self.settings.check_attribute_placement {
                if !attribute.body.allowed_in(context) {
                    return Err(Error::MisplacedAttribute {
                        attribute: name.unwrap_or("unknown"),
                        context,
                    });
                }
                if let Some(name) = name.filter(|_| attribute.body.at_most_once()) {
                    if seen.contains(&name) {
                        return Err(Error::DuplicateAttribute {
                            attribute: name,
                            context,
                        });
                    }
                    seen.push(name);
                }
            }
            if self.settings.check_constant_indices {
                self.require(attribute.name_index)?;
                if let Some(expected) = name {
                    self.require_name(attribute.name_index, expected)?;
                }
            }
            self.check_attribute_body(&attribute.body)?;
        }
        Ok(())
    }

    /// The JVM picks the attribute layout from its name, so the name must match the body
    fn require_name(&self, index: Utf8ConstantIndex, expected: &'static str) -> Result<(), Error> {
        match self.constants.get_offset(Offset(index.0 .0 as usize)).ok() {
            Some(Constant::Utf8(utf8)) if utf8.as_bytes() == expected.as_bytes() => Ok(()),
            _ => Err(Error::AttributeNameMismatch {
                index: index.0,
                expected,
            }),
        }
    }

    fn check_attribute_body(&self, body: &AttributeBody) -> Result<(), Error> {
        // Only `Code` nests attributes, so that is the only body to look into for placement
        if let AttributeBody::Code(code) = body {
            if self.settings.check_constant_indices {
                for handler in &code.exception_table {
                    self.require_optional(handler.catch_type)?;
                }
            }
            self.check_attributes(&code.attributes, AttributeContext::Code)?;
        }
        if !self.settings.check_constant_indices {
            return Ok(());
        }

        match body {
            AttributeBody::Unknown(_)
            | AttributeBody::SourceDebugExtension(_)
            | AttributeBody::Deprecated
            | AttributeBody::Synthetic
            | AttributeBody::Code(_)
            | AttributeBody::LineNumberTable(_) => (),
            AttributeBody::SourceFile(utf8)
            | AttributeBody::SourceDir(utf8)
            | AttributeBody::Signature(utf8) => self.require(*utf8)?,
            AttributeBody::InnerClasses(inner_classes) => {
                for inner_class in inner_classes {
                    self.require(inner_class.inner_class)?;
                    self.require_optional(inner_class.outer_class)?;
                    self.require_optional(inner_class.inner_name)?;
                }
            }
            AttributeBody::EnclosingMethod { class, method } => {
                self.require(*class)?;
                self.require_optional(*method)?;
            }
            AttributeBody::ConstantValue(value) => {
                self.require_kind(value.0, ConstantKind::ConstantValue)?
            }
            AttributeBody::Exceptions(classes) | AttributeBody::NestMembers(classes) => {
                for class in classes {
                    self.require(*class)?;
                }
            }
            AttributeBody::NestHost(class) => self.require(*class)?,
            AttributeBody::StackMap(frames) => {
                for frame in frames {
                    self.check_verification_types(&frame.locals)?;
                    self.check_verification_types(&frame.stack)?;
                }
            }
            AttributeBody::StackMapTable(frames) => {
                for frame in frames {
                    match frame {
                        StackMapFrame::Same { .. }
                        | StackMapFrame::SameExtended { .. }
                        | StackMapFrame::Chop { .. } => (),
                        StackMapFrame::SameLocalsOneStack { stack, .. } => {
                            self.check_verification_types(std::slice::from_ref(stack))?
                        }
                        StackMapFrame::Append { locals, .. } => {
                            self.check_verification_types(locals)?
                        }
                        StackMapFrame::Full { locals, stack, .. } => {
                            self.check_verification_types(locals)?;
                            self.check_verification_types(stack)?;
                        }
                    }
                }
            }
            AttributeBody::LocalVariableTable(locals) => {
                for local in locals {
                    self.require(local.name)?;
                    self.require(local.descriptor)?;
                }
            }
            AttributeBody::LocalVariableTypeTable(locals) => {
                for local in locals {
                    self.require(local.name)?;
                    self.require(local.signature)?;
                }
            }
            AttributeBody::RuntimeVisibleAnnotations(annotations)
            | AttributeBody::RuntimeInvisibleAnnotations(annotations) => {
                for annotation in annotations {
                    self.check_annotation(annotation)?;
                }
            }
            AttributeBody::RuntimeVisibleParameterAnnotations(parameters)
            | AttributeBody::RuntimeInvisibleParameterAnnotations(parameters) => {
                for annotation in parameters.iter().flatten() {
                    self.check_annotation(annotation)?;
                }
            }
            AttributeBody::AnnotationDefault(value) => self.check_element_value(value)?,
            AttributeBody::BootstrapMethods(methods) => {
                for method in methods {
                    self.require(method.bootstrap_method)?;
                    for argument in &method.bootstrap_arguments {
                        self.require(*argument)?;
                    }
                }
            }
            AttributeBody::MethodParameters(parameters) => {
                for parameter in parameters {
                    self.require_optional(parameter.name)?;
                }
            }
        }
        Ok(())
    }

    fn check_verification_types(&self, types: &[VerificationType]) -> Result<(), Error> {
        for verification_type in types {
            if let VerificationType::Object(class) = verification_type {
                self.require(*class)?;
            }
        }
        Ok(())
    }

    fn check_annotation(&self, annotation: &Annotation) -> Result<(), Error> {
        self.require(annotation.type_index)?;
        for pair in &annotation.element_value_pairs {
            self.require(pair.element_name)?;
            self.check_element_value(&pair.value)?;
        }
        Ok(())
    }

    fn check_element_value(&self, value: &ElementValue) -> Result<(), Error> {
        match value {
            ElementValue::Constant { tag, value } => {
                let expected = match tag {
                    ElementConstantTag::Byte
                    | ElementConstantTag::Char
                    | ElementConstantTag::Int
                    | ElementConstantTag::Short
                    | ElementConstantTag::Boolean => ConstantKind::Integer,
                    ElementConstantTag::Double => ConstantKind::Double,
                    ElementConstantTag::Float => ConstantKind::Float,
                    ElementConstantTag::Long => ConstantKind::Long,

                    // String element values point straight at the UTF-8 constant
                    ElementConstantTag::String => ConstantKind::Utf8,
                };
                self.require_kind(*value, expected)
            }
            ElementValue::EnumConstant {
                type_name,
                const_name,
            } => {
                self.require(*type_name)?;
                self.require(*const_name)
            }
            ElementValue::Class(class_info) => self.require(*class_info),
            ElementValue::Annotation(annotation) => self.check_annotation(annotation),
            ElementValue::Array(values) => {
                for value in values {
                    self.check_element_value(value)?;
                }
                Ok(())
            }
        }
    }
}
