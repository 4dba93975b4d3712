use std::fmt;

use serde::{Deserialize, Serialize};

/// QMK Setting Identifier.
///
/// Valid ids are `1..=0xFFFE`; `0xFFFF` terminates the discovery list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qsid(u16);

impl Qsid {
    /// Discovery terminator.
    pub const SENTINEL: u16 = 0xFFFF;
    /// Smallest valid id.
    pub const MIN: u16 = 1;
    /// Largest valid id.
    pub const MAX: u16 = 0xFFFE;

    /// Validate a raw id.
    pub fn new(raw: u16) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&raw).then_some(Self(raw))
    }

    /// The raw id.
    pub fn get(self) -> u16 {
        self.0
    }

    /// Wire encoding: low byte first.
    pub fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl TryFrom<u16> for Qsid {
    type Error = u16;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(raw)
    }
}

impl fmt::Display for Qsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-wire width of a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    Byte = 1,
    Short = 2,
    Long = 4,
}

impl FieldWidth {
    /// Map a declared definition width. A missing width means one byte.
    pub fn from_declared(width: Option<u8>) -> Option<Self> {
        match width {
            None | Some(1) => Some(Self::Byte),
            Some(2) => Some(Self::Short),
            Some(4) => Some(Self::Long),
            Some(_) => None,
        }
    }

    /// Number of value bytes on the wire.
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Largest value representable at this width.
    pub fn max_value(self) -> u32 {
        match self {
            Self::Byte => u8::MAX as u32,
            Self::Short => u16::MAX as u32,
            Self::Long => u32::MAX,
        }
    }

    /// Keep only the bytes this width carries.
    pub fn truncate(self, value: u32) -> u32 {
        value & self.max_value()
    }
}

impl fmt::Display for FieldWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Long => "long",
        })
    }
}
