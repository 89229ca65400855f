//! Write JVM classes
//!
//! ### Simple example
//!
//! Consider the following simple Java class:
//!
//! ```java,ignore,no_run
//! public class Empty {
//!     public Empty() {
//!         super();
//!     }
//! }
//! ```
//!
//! Generating an analogous class file can be done as follows:
//!
//! ```
//! use classwriter::jvm::class_file::*;
//! use classwriter::jvm::*;
//!
//! # fn generate_class() -> Result<Vec<u8>, Error> {
//! let mut constants = ConstantsPool::new();
//! let this_class = constants.get_class("me/alec/Empty")?;
//! let super_class = constants.get_class("java/lang/Object")?;
//! let super_init = constants.get_method_ref("java/lang/Object", "<init>", "()V", false)?;
//! let [hi, lo] = super_init.0 .0.to_be_bytes();
//!
//! // `aload_0; invokespecial java/lang/Object.<init>()V; return`
//! let code = constants.get_attribute(AttributeBody::Code(Code {
//!     max_stack: 1,
//!     max_locals: 1,
//!     code_array: vec![0x2A, 0xB7, hi, lo, 0xB1],
//!     exception_table: vec![],
//!     attributes: vec![],
//! }))?;
//! let constructor = Method {
//!     access_flags: MethodAccessFlags::PUBLIC,
//!     name_index: constants.get_utf8("<init>")?,
//!     descriptor_index: constants.get_utf8("()V")?,
//!     attributes: vec![code],
//! };
//!
//! let class_file = ClassFile {
//!     version: Version::JAVA8,
//!     constants: constants.into_offset_vec(),
//!     access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
//!     this_class,
//!     super_class,
//!     interfaces: vec![],
//!     fields: vec![],
//!     methods: vec![constructor],
//!     attributes: vec![],
//! };
//!
//! // Finally, encode the class into bytes
//! let class_bytes: Vec<u8> = class_file.to_bytes(&WriterSettings::default())?;
//! assert_eq!(&class_bytes[0..4], &ClassFile::MAGIC);
//! # Ok(class_bytes)
//! # }
//! # generate_class().unwrap();
//! ```

mod access_flags;
pub mod class_file;
mod errors;

pub use access_flags::*;
pub use errors::*;
