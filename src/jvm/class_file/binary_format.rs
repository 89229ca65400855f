use crate::jvm::Error;
use byteorder::{BigEndian, WriteBytesExt};

/// Utility trait for serializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - tags are always `u8`
///   - when serializing a sequence, the length of the sequence is usually `u16`
///   - variable length structures (attributes) are prefixed by their `u32` byte length
///
pub trait Serialize: Sized {
    /// Serialize construct into a binary output stream
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error>;
}

impl Serialize for u8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_u8(*self)?)
    }
}

impl Serialize for u16 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_u16::<BigEndian>(*self)?)
    }
}

impl Serialize for u32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_u32::<BigEndian>(*self)?)
    }
}

impl Serialize for u64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_u64::<BigEndian>(*self)?)
    }
}

impl Serialize for i32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_i32::<BigEndian>(*self)?)
    }
}

impl Serialize for i64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_i64::<BigEndian>(*self)?)
    }
}

impl Serialize for f32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_f32::<BigEndian>(*self)?)
    }
}

impl Serialize for f64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        Ok(writer.write_f64::<BigEndian>(*self)?)
    }
}

/// Size in `u16` is the first thing serialized
impl<A: Serialize> Serialize for Vec<A> {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        serialize_len_u16(self.len(), "list", writer)?;
        for elem in self {
            elem.serialize(writer)?;
        }
        Ok(())
    }
}

/// Write a `u16` element count, failing if the count does not fit
pub fn serialize_len_u16<W: WriteBytesExt>(
    len: usize,
    what: &'static str,
    writer: &mut W,
) -> Result<(), Error> {
    let len = u16::try_from(len).map_err(|_| Error::TooManyElements { what, len })?;
    len.serialize(writer)
}

/// Write a sequence prefixed by a `u8` element count (used in a handful of method attributes)
pub fn serialize_list_u8<A: Serialize, W: WriteBytesExt>(
    elems: &[A],
    what: &'static str,
    writer: &mut W,
) -> Result<(), Error> {
    let len = u8::try_from(elems.len()).map_err(|_| Error::TooManyElements {
        what,
        len: elems.len(),
    })?;
    len.serialize(writer)?;
    for elem in elems {
        elem.serialize(writer)?;
    }
    Ok(())
}

/// Encode a variable length structure into a scratch buffer, then write its `u32` length followed
/// by the buffered bytes.
///
/// The length of a body is only known once it is fully encoded (and bodies nest), so every level
/// measures its own scratch buffer. The output only ever gets appended to.
pub fn serialize_framed<W, F>(writer: &mut W, encode_body: F) -> Result<usize, Error>
where
    W: WriteBytesExt,
    F: FnOnce(&mut Vec<u8>) -> Result<(), Error>,
{
    let mut scratch: Vec<u8> = vec![];
    encode_body(&mut scratch)?;

    let len = u32::try_from(scratch.len()).map_err(|_| Error::TooManyElements {
        what: "attribute body bytes",
        len: scratch.len(),
    })?;
    len.serialize(writer)?;
    writer.write_all(&scratch)?;
    Ok(scratch.len())
}
