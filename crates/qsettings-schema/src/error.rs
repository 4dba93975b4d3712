/// Errors that can occur while loading a settings definition.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The definition file could not be read.
    #[error("failed to load settings definition: {0}")]
    LoadFailed(String),

    /// The definition is not valid JSON or does not match the model.
    #[error("settings definition is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The definition failed structural validation.
    #[error("settings definition failed validation: {0}")]
    ValidationFailed(String),

    /// A field names a QSID outside `1..=0xFFFE`.
    #[error("invalid qsid {qsid} in tab {tab:?}")]
    InvalidQsid { tab: String, qsid: u32 },

    /// A field declares a width other than 1, 2 or 4.
    #[error("invalid width {width} for qsid {qsid}")]
    InvalidWidth { qsid: u16, width: u8 },

    /// Two fields share a QSID but disagree on its width.
    #[error("qsid {qsid} declared with widths {first} and {second}")]
    ConflictingWidth { qsid: u16, first: u8, second: u8 },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
