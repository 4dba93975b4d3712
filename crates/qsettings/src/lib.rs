//! Read and write QMK keyboard settings over the Vial protocol.
//!
//! # Crate Structure
//!
//! - [`transport`]: Request/response transport abstraction and device sockets
//! - [`frame`]: Fixed-size Vial report framing
//! - [`schema`]: Settings definitions and the QSID → width projection
//! - [`sync`]: Discovery, reading and writing of settings

/// Re-export transport types.
pub mod transport {
    pub use qsettings_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use qsettings_frame::*;
}

/// Re-export schema types.
pub mod schema {
    pub use qsettings_schema::*;
}

/// Re-export synchronization types.
pub mod sync {
    pub use qsettings_sync::*;
}
