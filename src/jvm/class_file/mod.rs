//! Model of the class file format, and its binary encoding
//!
//! Everything in here is already resolved: structures refer to each other through constant pool
//! indices. Encoding walks the model exactly once and only ever appends to its output.

mod annotation;
mod attribute;
mod binary_format;
mod check;
mod class;
mod code;
mod constants;
mod field;
mod method;
mod settings;
mod stack_map;
mod version;

pub use annotation::*;
pub use attribute::*;
pub use binary_format::*;
pub use check::*;
pub use class::*;
pub use code::*;
pub use constants::*;
pub use field::*;
pub use method::*;
pub use settings::*;
pub use stack_map::*;
pub use version::*;
