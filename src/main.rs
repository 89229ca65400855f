use classwriter::jvm::class_file::{
    AttributeBody, ClassFile, Code, ConstantsPool, LineNumber, Method, Version, WriterSettings,
};
use classwriter::jvm::{self, ClassAccessFlags, MethodAccessFlags};

use clap::{value_parser, Arg, Command};
use std::path::Path;
use std::process;

fn main() -> Result<(), jvm::Error> {
    env_logger::init();

    let matches = Command::new("JVM class writer")
        .version(clap::crate_version!())
        .about("Writes a minimal JVM class with a default constructor")
        .arg(
            Arg::new("class")
                .long("class")
                .value_name("CLASS_NAME")
                .required(true)
                .help("Binary name of the class (eg. `foo/bar/Baz`)"),
        )
        .arg(
            Arg::new("super")
                .long("super")
                .value_name("CLASS_NAME")
                .default_value("java/lang/Object")
                .help("Binary name of the superclass"),
        )
        .arg(
            Arg::new("source-file")
                .long("source-file")
                .value_name("FILE")
                .help("Record a `SourceFile` attribute with this name"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .value_name("RELEASE")
                .default_value("8")
                .value_parser(value_parser!(u16).range(1..))
                .help("Java release the class file targets"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("DIRECTORY")
                .default_value(".")
                .help("Directory under which the class file is written"),
        )
        .get_matches();

    let class_name = matches.get_one::<String>("class").unwrap();
    let super_name = matches.get_one::<String>("super").unwrap();
    let source_file = matches.get_one::<String>("source-file");
    let release = *matches.get_one::<u16>("target").unwrap();
    let output = matches.get_one::<String>("output").unwrap();

    let version = match Version::from_java_release(release) {
        Some(version) => version,
        None => {
            log::error!("No class file version for Java release {}", release);
            process::exit(1);
        }
    };

    let class = empty_class(class_name, super_name, source_file.map(String::as_str), version)?;

    let class_file = Path::new(output).join(format!("{}.class", class_name));
    log::info!("Writing '{}'", class_file.display());
    class.save_to_path(&WriterSettings::default(), &class_file, true)?;

    Ok(())
}

/// Public class whose only member is a constructor delegating to the superclass
fn empty_class(
    class_name: &str,
    super_name: &str,
    source_file: Option<&str>,
    version: Version,
) -> Result<ClassFile, jvm::Error> {
    let mut constants = ConstantsPool::new();
    let this_class = constants.get_class(class_name)?;
    let super_class = constants.get_class(super_name)?;
    let super_init = constants.get_method_ref(super_name, "<init>", "()V", false)?;
    let [init_hi, init_lo] = super_init.0 .0.to_be_bytes();

    let line_numbers = constants.get_attribute(AttributeBody::LineNumberTable(vec![LineNumber {
        start_pc: 0,
        line_number: 1,
    }]))?;
    let code = constants.get_attribute(AttributeBody::Code(Code {
        max_stack: 1,
        max_locals: 1,
        code_array: vec![
            0x2A, // aload_0
            0xB7, init_hi, init_lo, // invokespecial
            0xB1, // return
        ],
        exception_table: vec![],
        attributes: vec![line_numbers],
    }))?;
    let constructor = Method {
        access_flags: MethodAccessFlags::PUBLIC,
        name_index: constants.get_utf8("<init>")?,
        descriptor_index: constants.get_utf8("()V")?,
        attributes: vec![code],
    };

    let mut attributes = vec![];
    if let Some(source_file) = source_file {
        let source_file = constants.get_utf8(source_file)?;
        attributes.push(constants.get_attribute(AttributeBody::SourceFile(source_file))?);
    }

    Ok(ClassFile {
        version,
        constants: constants.into_offset_vec(),
        access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        this_class,
        super_class,
        interfaces: vec![],
        fields: vec![],
        methods: vec![constructor],
        attributes,
    })
}
