//! Vial QMK settings sub-commands.
//!
//! Every settings request is sent under the Vial command prefix; the
//! sub-command byte selects the operation.

use std::fmt;

/// Vial command prefix byte (`CMD_VIA_VIAL_PREFIX`).
pub const VIAL_PREFIX: u8 = 0xFE;

/// A settings sub-command understood by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// List supported QSIDs, one page at a time.
    Query = 0x09,
    /// Read one setting value.
    Get = 0x0A,
    /// Write one setting value.
    Set = 0x0B,
}

impl Command {
    /// Wire id of this sub-command.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Parse a wire id.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0x09 => Some(Self::Query),
            0x0A => Some(Self::Get),
            0x0B => Some(Self::Set),
            _ => None,
        }
    }

    /// Human-readable name for logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Get => "GET",
            Self::Set => "SET",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
