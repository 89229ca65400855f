use crate::jvm::class_file::Serialize;
use crate::jvm::Error;
use byteorder::WriteBytesExt;

/// Version of the class file, which is used to verify that the JVM has the
/// necessary features to interpret the class
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Version {
    pub major_version: u16,
    pub minor_version: u16,
}

impl Version {
    /// JVM class file version corresponding to Java SE 6 (released December 2006)
    pub const JAVA6: Version = Version::new(50, 0);

    /// JVM class file version corresponding to Java SE 8 (released March 2014)
    pub const JAVA8: Version = Version::new(52, 0);

    /// JVM class file version corresponding to Java SE 11 (released September 2018)
    pub const JAVA11: Version = Version::new(55, 0);

    /// JVM class file version corresponding to Java SE 17 (released September 2021)
    pub const JAVA17: Version = Version::new(61, 0);

    pub const fn new(major_version: u16, minor_version: u16) -> Version {
        Version {
            major_version,
            minor_version,
        }
    }

    /// Java release matching this version (eg. `8` for `52.0`)
    pub fn java_release(&self) -> Option<u16> {
        match self.major_version {
            45 => Some(1),
            46..=u16::MAX => Some(self.major_version - 44),
            _ => None,
        }
    }

    /// Class file version matching a Java release (eg. `52.0` for `8`)
    pub fn from_java_release(release: u16) -> Option<Version> {
        match release {
            0 => None,
            1 => Some(Version::new(45, 3)),
            _ => release.checked_add(44).map(|major| Version::new(major, 0)),
        }
    }
}

impl Serialize for Version {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<(), Error> {
        self.minor_version.serialize(writer)?;
        self.major_version.serialize(writer)?;
        Ok(())
    }
}
