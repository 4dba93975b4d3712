/// QSIDs per discovery page: one 32-byte report of u16 values.
pub const DEFAULT_PAGE_SIZE: u16 = 16;

/// Discovery scan settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// How far the cursor advances after each page without a terminator.
    pub page_size: u16,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// What a read pass does when one setting cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Abort on the first failing QSID.
    #[default]
    FailFast,
    /// Attempt every QSID and report failures alongside the values read.
    BestEffort,
}

/// Settings for a [`crate::Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub discovery: DiscoveryConfig,
    pub read_policy: ReadPolicy,
}
