mod walker;

use classwriter::jvm::class_file::*;
use classwriter::jvm::{
    ClassAccessFlags, Error, FieldAccessFlags, InnerClassAccessFlags, MethodAccessFlags,
};
use std::thread;

/// Class `Test` with no superclass, members, or attributes
fn trivial_class() -> ClassFile {
    let mut constants = ConstantsPool::new();
    let this_class = constants.get_class("Test").unwrap();
    constants.get_utf8("Code").unwrap();

    ClassFile {
        version: Version::JAVA8,
        constants: constants.into_offset_vec(),
        access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        this_class,
        super_class: ClassConstantIndex::NONE,
        interfaces: vec![],
        fields: vec![],
        methods: vec![],
        attributes: vec![],
    }
}

/// Class with a `public void run() { return; }` method and whatever else the pool ends up with
fn class_with_method(build: impl FnOnce(&mut ConstantsPool, &mut ClassFile)) -> ClassFile {
    let mut constants = ConstantsPool::new();
    let this_class = constants.get_class("Test").unwrap();
    let super_class = constants.get_class("java/lang/Object").unwrap();
    let code = constants
        .get_attribute(AttributeBody::Code(Code {
            max_stack: 1,
            max_locals: 1,
            code_array: vec![0xB1],
            exception_table: vec![],
            attributes: vec![],
        }))
        .unwrap();
    let method = Method {
        access_flags: MethodAccessFlags::PUBLIC,
        name_index: constants.get_utf8("run").unwrap(),
        descriptor_index: constants.get_utf8("()V").unwrap(),
        attributes: vec![code],
    };

    let mut class = ClassFile {
        version: Version::JAVA8,
        constants: Default::default(),
        access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        this_class,
        super_class,
        interfaces: vec![],
        fields: vec![],
        methods: vec![method],
        attributes: vec![],
    };
    build(&mut constants, &mut class);
    class.constants = constants.into_offset_vec();
    class
}

#[test]
fn trivial_class_layout() {
    let bytes = trivial_class().to_bytes(&WriterSettings::default()).unwrap();

    // Fixed header and counts, plus `Utf8 "Test"`, `Class #1`, and `Utf8 "Code"`
    assert_eq!(bytes.len(), 24 + 7 + 3 + 7);
    assert_eq!(&bytes[0..4], &ClassFile::MAGIC);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 52]);
    assert_eq!(&bytes[8..10], &[0, 4]);
    assert_eq!(
        &bytes[27..],
        &[
            0x00, 0x21, // access flags
            0x00, 0x02, // this class
            0x00, 0x00, // super class
            0x00, 0x00, // interfaces
            0x00, 0x00, // fields
            0x00, 0x00, // methods
            0x00, 0x00, // attributes
        ]
    );

    let walked = walker::walk(&bytes);
    assert_eq!(walked.major_version, 52);
    assert_eq!(walked.minor_version, 0);
    assert_eq!(walked.constant_pool_count, 4);
    assert_eq!(walked.this_class, 2);
    assert_eq!(walked.super_class, 0);
}

#[test]
fn single_empty_method() {
    let class = class_with_method(|_, _| ());
    let bytes = class.to_bytes(&WriterSettings::default()).unwrap();
    let walked = walker::walk(&bytes);

    let method = &walked.methods[0];
    assert_eq!(method.access_flags, 0x0001);
    assert_eq!(method.name, "run");
    assert_eq!(method.descriptor, "()V");
    assert_eq!(method.attributes.len(), 1);

    let code = &method.attributes[0];
    assert_eq!(code.name, "Code");
    assert_eq!(code.info.len(), 2 + 2 + 4 + 1 + 2 + 2);
    assert_eq!(code.info, vec![0, 1, 0, 1, 0, 0, 0, 1, 0xB1, 0, 0, 0, 0]);
}

#[test]
fn array_valued_annotation_element() {
    let mut constants = ConstantsPool::new();
    let this_class = constants.get_class("Test").unwrap();
    let marker = constants.get_utf8("LMarker;").unwrap();
    let values = constants.get_utf8("values").unwrap();
    let one = constants.get_integer(1).unwrap();
    let two = constants.get_integer(2).unwrap();
    let annotations = constants
        .get_attribute(AttributeBody::RuntimeVisibleAnnotations(vec![Annotation {
            type_index: marker,
            element_value_pairs: vec![ElementValuePair {
                element_name: values,
                value: ElementValue::Array(vec![
                    ElementValue::Constant {
                        tag: ElementConstantTag::Int,
                        value: one.0,
                    },
                    ElementValue::Constant {
                        tag: ElementConstantTag::Int,
                        value: two.0,
                    },
                ]),
            }],
        }]))
        .unwrap();

    let mut class = trivial_class();
    class.this_class = this_class;
    class.constants = constants.into_offset_vec();
    class.attributes.push(annotations);

    let bytes = class.to_bytes(&WriterSettings::default()).unwrap();
    let walked = walker::walk(&bytes);
    let attribute = &walked.attributes[0];
    assert_eq!(attribute.name, "RuntimeVisibleAnnotations");
    assert_eq!(
        attribute.info,
        vec![
            0, 1, // one annotation
            0, 3, // `LMarker;`
            0, 1, // one pair
            0, 4, // `values`
            b'[', 0, 2, // array of two
            b'I', 0, 5, // 1
            b'I', 0, 6, // 2
        ]
    );
}

#[test]
fn fields_and_wide_constants() {
    let class = class_with_method(|constants, class| {
        let value = constants.get_long(-1).unwrap();
        let constant_value = constants
            .get_attribute(AttributeBody::ConstantValue(value))
            .unwrap();
        class.fields.push(Field {
            access_flags: FieldAccessFlags::PUBLIC
                | FieldAccessFlags::STATIC
                | FieldAccessFlags::FINAL,
            name_index: constants.get_utf8("ALL_ONES").unwrap(),
            descriptor_index: constants.get_utf8("J").unwrap(),
            attributes: vec![constant_value],
        });
    });

    let bytes = class.to_bytes(&WriterSettings::default()).unwrap();
    let walked = walker::walk(&bytes);
    let field = &walked.fields[0];
    assert_eq!(field.access_flags, 0x0019);
    assert_eq!(field.name, "ALL_ONES");
    assert_eq!(field.attributes[0].name, "ConstantValue");
    assert_eq!(field.attributes[0].info.len(), 2);
}

#[test]
fn nested_code_attributes_are_framed() {
    let class = class_with_method(|constants, class| {
        let object = constants.get_class("java/lang/Object").unwrap();
        let line_numbers = constants
            .get_attribute(AttributeBody::LineNumberTable(vec![LineNumber {
                start_pc: 0,
                line_number: 7,
            }]))
            .unwrap();
        let stack_map = constants
            .get_attribute(AttributeBody::StackMapTable(vec![
                StackMapFrame::SameLocalsOneStack {
                    offset_delta: 10,
                    stack: VerificationType::Object(object),
                },
                StackMapFrame::Same { offset_delta: 200 },
                StackMapFrame::Full {
                    offset_delta: 0,
                    locals: vec![VerificationType::Integer, VerificationType::Long],
                    stack: vec![],
                },
            ]))
            .unwrap();

        let code = match &mut class.methods[0].attributes[0].body {
            AttributeBody::Code(code) => code,
            _ => unreachable!(),
        };
        code.code_array = vec![0x00; 300];
        code.code_array.push(0xB1);
        code.exception_table.push(ExceptionHandler {
            start_pc: 0,
            end_pc: 10,
            handler_pc: 20,
            catch_type: ClassConstantIndex::NONE,
        });
        code.attributes = vec![line_numbers, stack_map];
    });

    let bytes = class.to_bytes(&WriterSettings::default()).unwrap();
    let walked = walker::walk(&bytes);
    let code = &walked.methods[0].attributes[0];
    assert_eq!(code.nested.len(), 2);
    assert_eq!(code.nested[0].name, "LineNumberTable");
    assert_eq!(code.nested[0].info, vec![0, 1, 0, 0, 0, 7]);

    let stack_map = &code.nested[1];
    assert_eq!(stack_map.name, "StackMapTable");
    assert_eq!(
        stack_map.info,
        vec![
            0, 3, // frames
            74, 7, 0, 4, // same_locals_1_stack_item_frame, object `java/lang/Object`
            251, 0, 200, // same_frame_extended
            255, 0, 0, 0, 2, 1, 4, 0, 0, // full_frame
        ]
    );
}

#[test]
fn encoding_is_deterministic() {
    let class = class_with_method(|constants, class| {
        let source_file = constants.get_utf8("Test.java").unwrap();
        let attribute = constants
            .get_attribute(AttributeBody::SourceFile(source_file))
            .unwrap();
        class.attributes.push(attribute);
    });
    let settings = WriterSettings::default();
    assert_eq!(
        class.to_bytes(&settings).unwrap(),
        class.to_bytes(&settings).unwrap()
    );
}

#[test]
fn concurrent_encoding_of_one_model() {
    let class = class_with_method(|_, _| ());
    let settings = WriterSettings::default();
    let expected = class.to_bytes(&settings).unwrap();

    thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| class.to_bytes(&settings).unwrap()))
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), expected);
        }
    });
}

#[test]
fn misplaced_attribute_writes_nothing() {
    let class = class_with_method(|constants, class| {
        let source_file = constants.get_utf8("Test.java").unwrap();
        let attribute = constants
            .get_attribute(AttributeBody::SourceFile(source_file))
            .unwrap();
        if let AttributeBody::Code(code) = &mut class.methods[0].attributes[0].body {
            code.attributes.push(attribute);
        }
    });

    let mut sink: Vec<u8> = vec![];
    match class.write_to(&WriterSettings::default(), &mut sink) {
        Err(Error::MisplacedAttribute {
            attribute: "SourceFile",
            context: AttributeContext::Code,
        }) => (),
        other => panic!("unexpected result {:?}", other),
    }
    assert!(sink.is_empty());

    // Turning the check off trusts the model and writes it anywhere
    let settings = WriterSettings {
        check_attribute_placement: false,
        ..WriterSettings::default()
    };
    let written = class.write_to(&settings, &mut sink).unwrap();
    assert_eq!(written, sink.len());
    walker::walk(&sink);
}

#[test]
fn bad_index_writes_nothing() {
    let mut class = trivial_class();
    class.interfaces.push(ClassConstantIndex(ConstantIndex(1)));

    let mut sink: Vec<u8> = vec![];
    match class.write_to(&WriterSettings::default(), &mut sink) {
        Err(Error::WrongConstantKind {
            index: ConstantIndex(1),
            expected: ConstantKind::Class,
            found: ConstantKind::Utf8,
        }) => (),
        other => panic!("unexpected result {:?}", other),
    }
    assert!(sink.is_empty());
}

#[test]
fn oversized_code_writes_nothing() {
    let class = class_with_method(|_, class| {
        if let AttributeBody::Code(code) = &mut class.methods[0].attributes[0].body {
            code.code_array = vec![0x00; 70_000];
        }
    });

    let mut sink: Vec<u8> = vec![];
    assert!(matches!(
        class.write_to(&WriterSettings::unchecked(), &mut sink),
        Err(Error::CodeTooLong(70_000))
    ));
    assert!(sink.is_empty());
}

#[test]
fn malformed_classes_are_rejected() {
    let settings = WriterSettings::default();

    // `SourceFile` body under the name `Code`
    let class = class_with_method(|constants, class| {
        let source_file = constants.get_utf8("Test.java").unwrap();
        class.attributes.push(Attribute {
            name_index: constants.get_utf8("Code").unwrap(),
            body: AttributeBody::SourceFile(source_file),
        });
    });
    assert!(matches!(
        class.to_bytes(&settings),
        Err(Error::AttributeNameMismatch {
            expected: "SourceFile",
            ..
        })
    ));

    // Field initialized from a class constant
    let class = class_with_method(|constants, class| {
        let object = constants.get_class("java/lang/Object").unwrap();
        let constant_value = constants
            .get_attribute(AttributeBody::ConstantValue(LoadableConstantIndex(object.0)))
            .unwrap();
        class.fields.push(Field {
            access_flags: FieldAccessFlags::STATIC | FieldAccessFlags::FINAL,
            name_index: constants.get_utf8("X").unwrap(),
            descriptor_index: constants.get_utf8("I").unwrap(),
            attributes: vec![constant_value],
        });
    });
    assert!(matches!(
        class.to_bytes(&settings),
        Err(Error::WrongConstantKind {
            expected: ConstantKind::ConstantValue,
            found: ConstantKind::Class,
            ..
        })
    ));

    // Method body with no instructions, rejected even when nothing is checked
    let class = class_with_method(|_, class| {
        if let AttributeBody::Code(code) = &mut class.methods[0].attributes[0].body {
            code.code_array.clear();
        }
    });
    assert!(matches!(class.to_bytes(&settings), Err(Error::EmptyCode)));
    assert!(matches!(
        class.to_bytes(&WriterSettings::unchecked()),
        Err(Error::EmptyCode)
    ));

    // Method with two bodies
    let class = class_with_method(|_, class| {
        let code = class.methods[0].attributes[0].clone();
        class.methods[0].attributes.push(code);
    });
    assert!(matches!(
        class.to_bytes(&settings),
        Err(Error::DuplicateAttribute {
            attribute: "Code",
            context: AttributeContext::Method,
        })
    ));
}

#[test]
fn class_attribute_bodies_are_walked() {
    let class = class_with_method(|constants, class| {
        let outer = constants.get_class("Outer").unwrap();
        let host = constants.get_class("Host").unwrap();
        let member = constants.get_class("Host$Member").unwrap();
        let enclosing = constants.get_name_and_type("run", "()V").unwrap();
        let inner_name = constants.get_utf8("Test").unwrap();
        let signature = constants.get_utf8("Ljava/lang/Object;").unwrap();
        let source_dir = constants.get_utf8("src/main/java").unwrap();

        let bodies = vec![
            AttributeBody::SourceDir(source_dir),
            AttributeBody::Signature(signature),
            AttributeBody::InnerClasses(vec![InnerClass {
                inner_class: class.this_class,
                outer_class: outer,
                inner_name,
                access_flags: InnerClassAccessFlags::PUBLIC | InnerClassAccessFlags::STATIC,
            }]),
            AttributeBody::EnclosingMethod {
                class: outer,
                method: enclosing,
            },
            AttributeBody::NestHost(host),
            AttributeBody::NestMembers(vec![member]),
            AttributeBody::SourceDebugExtension(b"SMAP".to_vec()),
        ];
        for body in bodies {
            let attribute = constants.get_attribute(body).unwrap();
            class.attributes.push(attribute);
        }
    });

    let bytes = class.to_bytes(&WriterSettings::default()).unwrap();
    let walked = walker::walk(&bytes);
    let names: Vec<&str> = walked
        .attributes
        .iter()
        .map(|attribute| attribute.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "SourceDir",
            "Signature",
            "InnerClasses",
            "EnclosingMethod",
            "NestHost",
            "NestMembers",
            "SourceDebugExtension",
        ]
    );
    assert_eq!(walked.attributes[2].info.len(), 2 + 8);
    assert_eq!(walked.attributes[3].info.len(), 4);
    assert_eq!(walked.attributes[6].info, b"SMAP".to_vec());
}

#[test]
fn save_to_path_creates_directories() {
    let directory = std::env::temp_dir().join(format!("classwriter-test-{}", std::process::id()));
    let path = directory.join("nested").join("Test.class");

    let class = trivial_class();
    class
        .save_to_path(&WriterSettings::default(), &path, true)
        .unwrap();
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, class.to_bytes(&WriterSettings::default()).unwrap());

    std::fs::remove_dir_all(&directory).unwrap();
}
