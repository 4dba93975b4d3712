/// Controls how settings definitions are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
    /// Maximum bytes read from a definition file.
    pub max_file_size: usize,
    /// When true, the document is checked against the definition JSON Schema
    /// before it is deserialized.
    pub validate: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024,
            validate: true,
        }
    }
}
