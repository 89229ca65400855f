//! Byte-exact serializer for JVM class files
//!
//! The [`jvm::class_file`] module models a fully resolved class (constant pool, members, and
//! attributes) and encodes it into the binary format described in [chapter 4 of the JVM
//! specification][0].
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html

pub mod jvm;
mod util;

pub use util::{Offset, OffsetResult, OffsetVec, OffsetVecIter, Width};
