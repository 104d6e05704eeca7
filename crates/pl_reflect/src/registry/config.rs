// -----------------------------------------------------------------------------
// RegistryConfig

/// What happens when a class name is registered a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicatePolicy {
    /// The new class replaces the old one and a warning is logged.
    #[default]
    Replace,
    /// Registration fails with [`RegisterError::Duplicate`](super::RegisterError::Duplicate).
    Reject,
}

/// Runtime options of a [`ClassRegistry`](super::ClassRegistry).
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "serde")] {
/// use pl_reflect::registry::{DuplicatePolicy, RegistryConfig};
///
/// let config: RegistryConfig = serde_json::from_str(r#"{ "duplicate_policy": "Reject" }"#).unwrap();
/// assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
/// assert!(config.warn_on_read_only_write);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Log a warning when a string write hits a read-only attribute.
    pub warn_on_read_only_write: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Replace,
            warn_on_read_only_write: true,
        }
    }
}
