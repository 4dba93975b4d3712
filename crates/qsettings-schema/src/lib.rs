//! QMK settings definitions.
//!
//! The settings definition is a JSON document of tabs, each holding fields
//! that name a QSID and its wire width. It lists every setting QMK knows
//! about, whether or not a given keyboard implements it.
//!
//! This crate loads and validates that document and flattens it into the
//! only view the protocol layer needs: [`SchemaProjection`], a QSID →
//! [`FieldWidth`] lookup.

pub mod config;
pub mod definition;
pub mod error;
pub mod projection;
pub mod types;
pub mod validator;

pub use config::LoadConfig;
pub use definition::{Field, SettingsDefinition, Tab};
pub use error::{Result, SchemaError};
pub use projection::SchemaProjection;
pub use types::{FieldWidth, Qsid};
