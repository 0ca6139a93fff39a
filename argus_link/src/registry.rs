//! Hardware category enablement

use argus::consts::KNOWN_HARDWARE;
use std::collections::BTreeMap;

/// Map of hardware category name → enabled flag.
///
/// Starts with every known category enabled. Names are not validated: a
/// category nobody reports is harmless and simply never matches. Lookups of
/// unknown names answer `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareRegistry {
    enabled: BTreeMap<String, bool>,
}

impl HardwareRegistry {
    /// Registry with all known categories enabled.
    pub fn new() -> Self {
        let enabled = KNOWN_HARDWARE
            .iter()
            .map(|name| (name.to_string(), true))
            .collect();
        Self { enabled }
    }

    /// Registry with the given overrides applied on top of the defaults.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a bool)>,
    {
        let mut registry = Self::new();
        for (name, enabled) in overrides {
            registry.set_enabled(name, *enabled);
        }
        registry
    }

    /// Enable or disable a category. Unknown names are inserted as given.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        match self.enabled.get_mut(name) {
            Some(flag) => *flag = enabled,
            None => {
                self.enabled.insert(name.to_string(), enabled);
            }
        }
    }

    /// Whether a category is enabled; `false` when it was never registered.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.get(name).copied().unwrap_or(false)
    }

    /// All registered categories in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.enabled.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }
}

impl Default for HardwareRegistry {
    fn default() -> Self {
        Self::new()
    }
}
