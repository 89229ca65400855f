use crate::jvm::class_file::{ClassConstantIndex, Serialize};
use crate::jvm::Error;
use byteorder::WriteBytesExt;

/// These types are from [this hierarchy][0]
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.4
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,

    /// In the constructor, the `this` parameter starts with this type then turns into an object
    /// type after `<init>` is called
    UninitializedThis,

    /// Object type
    Object(ClassConstantIndex),

    /// State of an object after `new` has been called but `<init>` has not been called. The
    /// offset is that of the `new` instruction from the start of the method body.
    Uninitialized(u16),
}

impl Serialize for VerificationType {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            VerificationType::Top => 0u8.serialize(writer)?,
            VerificationType::Integer => 1u8.serialize(writer)?,
            VerificationType::Float => 2u8.serialize(writer)?,
            VerificationType::Double => 3u8.serialize(writer)?,
            VerificationType::Long => 4u8.serialize(writer)?,
            VerificationType::Null => 5u8.serialize(writer)?,
            VerificationType::UninitializedThis => 6u8.serialize(writer)?,
            VerificationType::Object(cls) => {
                7u8.serialize(writer)?;
                cls.serialize(writer)?;
            }
            VerificationType::Uninitialized(off) => {
                8u8.serialize(writer)?;
                off.serialize(writer)?;
            }
        };
        Ok(())
    }
}

/// Frame of a `StackMapTable` attribute
///
/// The tag byte is never stored: it is derived from the variant, the size of `offset_delta`, and
/// the number of locals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
    /// Frame has the same locals as the previous frame and number of stack items is zero
    /// Tags: 0-63 or 251
    Same { offset_delta: u16 },

    /// Frame has the same locals as the previous frame and number of stack items is one
    /// Tags: 64-127 or 247
    SameLocalsOneStack {
        offset_delta: u16,
        stack: VerificationType,
    },

    /// Frame is like the previous frame, but without the last `chopped_k` locals
    ///
    /// Note: `chopped_k` must be in the range 1 to 3 inclusive
    /// Tags: 248-250
    Chop { offset_delta: u16, chopped_k: u8 },

    /// Same as `Same`, but always in the extended form even when the delta would fit the tag
    /// Tag: 251
    SameExtended { offset_delta: u16 },

    /// Frame is like the previous frame, but with 1 to 3 extra locals
    /// Tags: 252-254
    Append {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },

    /// Frame has exactly the locals and stack specified
    /// Tag: 255
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    const SAME_LOCALS_ONE_STACK: u8 = 64;
    const SAME_LOCALS_ONE_STACK_EXTENDED: u8 = 247;
    const SAME_EXTENDED: u8 = 251;
    const FULL: u8 = 255;

    /// Largest `offset_delta` which fits in the tag of the compact frame forms
    const MAX_COMPACT_DELTA: u16 = 63;

    /// Frame tag, as chosen from the ranges fixed by the class file format
    pub fn tag(&self) -> Result<u8, Error> {
        let tag = match self {
            StackMapFrame::Same { offset_delta } => {
                if *offset_delta <= StackMapFrame::MAX_COMPACT_DELTA {
                    *offset_delta as u8
                } else {
                    StackMapFrame::SAME_EXTENDED
                }
            }
            StackMapFrame::SameLocalsOneStack { offset_delta, .. } => {
                if *offset_delta <= StackMapFrame::MAX_COMPACT_DELTA {
                    StackMapFrame::SAME_LOCALS_ONE_STACK + *offset_delta as u8
                } else {
                    StackMapFrame::SAME_LOCALS_ONE_STACK_EXTENDED
                }
            }
            StackMapFrame::Chop { chopped_k, .. } => {
                if !(1..=3).contains(chopped_k) {
                    return Err(Error::ChopOutOfRange(*chopped_k));
                }
                StackMapFrame::SAME_EXTENDED - chopped_k
            }
            StackMapFrame::SameExtended { .. } => StackMapFrame::SAME_EXTENDED,
            StackMapFrame::Append { locals, .. } => {
                if !(1..=3).contains(&locals.len()) {
                    return Err(Error::AppendOutOfRange(locals.len()));
                }
                StackMapFrame::SAME_EXTENDED + locals.len() as u8
            }
            StackMapFrame::Full { .. } => StackMapFrame::FULL,
        };
        Ok(tag)
    }
}

impl Serialize for StackMapFrame {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        let tag = self.tag()?;
        tag.serialize(writer)?;

        match self {
            // `same_frame` and `same_frame_extended`
            StackMapFrame::Same { offset_delta } | StackMapFrame::SameExtended { offset_delta } => {
                if tag == StackMapFrame::SAME_EXTENDED {
                    offset_delta.serialize(writer)?;
                }
            }

            // `same_locals_1_stack_item_frame` and `same_locals_1_stack_item_frame_extended`
            StackMapFrame::SameLocalsOneStack {
                offset_delta,
                stack,
            } => {
                if tag == StackMapFrame::SAME_LOCALS_ONE_STACK_EXTENDED {
                    offset_delta.serialize(writer)?;
                }
                stack.serialize(writer)?;
            }

            // `chop_frame`
            StackMapFrame::Chop { offset_delta, .. } => offset_delta.serialize(writer)?,

            // `append_frame`
            StackMapFrame::Append {
                offset_delta,
                locals,
            } => {
                offset_delta.serialize(writer)?;
                for local in locals {
                    local.serialize(writer)?;
                }
            }

            // `full_frame`
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            } => {
                offset_delta.serialize(writer)?;
                locals.serialize(writer)?;
                stack.serialize(writer)?;
            }
        };
        Ok(())
    }
}

/// Frame of the older (CLDC) `StackMap` attribute
///
/// These are always full frames, and have no tag. Unlike `StackMapTable` frames, the offset is
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackMapFullFrame {
    pub offset: u16,
    pub locals: Vec<VerificationType>,
    pub stack: Vec<VerificationType>,
}

impl Serialize for StackMapFullFrame {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.offset.serialize(writer)?;
        self.locals.serialize(writer)?;
        self.stack.serialize(writer)?;
        Ok(())
    }
}
