use crate::jvm::class_file::{
    check_class_file, Attribute, ClassConstantIndex, Constant, Field, Method, Serialize, Version,
    WriterSettings,
};
use crate::jvm::{ClassAccessFlags, Error};
use crate::util::OffsetVec;
use byteorder::WriteBytesExt;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Representation of the [`class` file format of the JVM][0]
///
/// The constants must start at offset 1 (which is what [`super::ConstantsPool`] produces).
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub version: Version,
    pub constants: OffsetVec<Constant>,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,

    /// `ClassConstantIndex::NONE` only for `java/lang/Object` and `module-info`
    pub super_class: ClassConstantIndex,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Magic header bytes that go at the front of the serialized class file
    pub const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

    /// Check the class, then encode it
    ///
    /// Either the complete class comes back, or an error does.
    pub fn to_bytes(&self, settings: &WriterSettings) -> Result<Vec<u8>, Error> {
        if settings.checks_anything() {
            if let Err(err) = check_class_file(self, settings) {
                log::error!("Refusing to write malformed class: {}", err);
                return Err(err);
            }
        }

        let mut bytes: Vec<u8> = vec![];
        if let Err(err) = self.serialize(&mut bytes) {
            log::error!("Failed to encode class #{}: {}", self.this_class.0 .0, err);
            return Err(err);
        }
        log::debug!(
            "Encoded class #{} into {} bytes",
            self.this_class.0 .0,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Check and encode the class, then hand it to the sink in one piece
    ///
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, settings: &WriterSettings, sink: &mut W) -> Result<usize, Error> {
        let bytes = self.to_bytes(settings)?;
        sink.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Save the class file to disk
    pub fn save_to_path<P: AsRef<Path>>(
        &self,
        settings: &WriterSettings,
        path: P,
        create_missing_directories: bool,
    ) -> Result<(), Error> {
        let bytes = self.to_bytes(settings)?;
        let path = path.as_ref();
        if create_missing_directories {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Raw encoding, without any of the checks in [`ClassFile::to_bytes`]
impl Serialize for ClassFile {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_all(&ClassFile::MAGIC)?;
        self.version.serialize(writer)?;
        log::trace!("Writing {} constants", self.constants.len());
        self.constants.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        self.this_class.serialize(writer)?;
        self.super_class.serialize(writer)?;
        self.interfaces.serialize(writer)?;
        log::trace!(
            "Writing {} fields and {} methods",
            self.fields.len(),
            self.methods.len()
        );
        self.fields.serialize(writer)?;
        self.methods.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}
