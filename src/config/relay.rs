//! Process-wide relay tunables

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::policy::normalize_app_key;
use crate::screen::SplitType;

/// Global relay defaults and the application allow/deny lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Master switch; when off no event is ever relayed
    pub globally_enabled: bool,
    /// Overlap margin (scroll units) used when neither policy nor region set one
    pub default_overlap_height: u32,
    /// Split applied to displays without their own settings
    pub default_split_type: SplitType,
    /// Share of the first pane for two-way splits
    pub default_split_ratio: f64,
    /// Distance (scroll units) from a content edge that triggers a hand-off
    pub scroll_trigger_threshold: u32,
    /// Applications allowed to relay (empty = no restriction)
    pub allow_list: BTreeSet<String>,
    /// Applications never relayed; wins over `allow_list`
    pub deny_list: BTreeSet<String>,
}

pub const DEFAULT_OVERLAP_HEIGHT: u32 = 50;
pub const DEFAULT_SCROLL_TRIGGER_THRESHOLD: u32 = 50;
pub const DEFAULT_SPLIT_RATIO: f64 = 0.5;

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            globally_enabled: true,
            default_overlap_height: DEFAULT_OVERLAP_HEIGHT,
            default_split_type: SplitType::LeftRight,
            default_split_ratio: DEFAULT_SPLIT_RATIO,
            scroll_trigger_threshold: DEFAULT_SCROLL_TRIGGER_THRESHOLD,
            allow_list: BTreeSet::new(),
            deny_list: BTreeSet::new(),
        }
    }
}

impl RelayConfig {
    /// Repair values a hand-edited file may get wrong.
    ///
    /// Non-finite or out-of-range ratios fall back to the default and list
    /// entries are normalized the same way application keys are.
    pub fn sanitized(mut self) -> Self {
        if !(self.default_split_ratio.is_finite() && (0.0..=1.0).contains(&self.default_split_ratio)) {
            tracing::warn!(
                "Invalid default split ratio {}, using {}",
                self.default_split_ratio,
                DEFAULT_SPLIT_RATIO
            );
            self.default_split_ratio = DEFAULT_SPLIT_RATIO;
        }

        self.allow_list = normalize_list(&self.allow_list);
        self.deny_list = normalize_list(&self.deny_list);
        self
    }

    pub fn allow(&mut self, app_key: &str) {
        let key = normalize_app_key(app_key);
        if !key.is_empty() {
            self.allow_list.insert(key);
        }
    }

    pub fn deny(&mut self, app_key: &str) {
        let key = normalize_app_key(app_key);
        if !key.is_empty() {
            self.deny_list.insert(key);
        }
    }
}

fn normalize_list(list: &BTreeSet<String>) -> BTreeSet<String> {
    list.iter()
        .map(|k| normalize_app_key(k))
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert!(config.globally_enabled);
        assert_eq!(config.default_overlap_height, 50);
        assert_eq!(config.scroll_trigger_threshold, 50);
        assert_eq!(config.default_split_type, SplitType::LeftRight);
        assert!(config.allow_list.is_empty());
    }

    #[test]
    fn test_sanitized_repairs_ratio_and_lists() {
        let mut config = RelayConfig {
            default_split_ratio: f64::NAN,
            ..Default::default()
        };
        config.deny_list.insert("  Chrome ".to_string());
        config.deny_list.insert("   ".to_string());

        let config = config.sanitized();

        assert_eq!(config.default_split_ratio, DEFAULT_SPLIT_RATIO);
        assert_eq!(config.deny_list.len(), 1);
        assert!(config.deny_list.contains("chrome"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RelayConfig = toml::from_str("scroll_trigger_threshold = 20").unwrap();
        assert_eq!(config.scroll_trigger_threshold, 20);
        assert_eq!(config.default_overlap_height, DEFAULT_OVERLAP_HEIGHT);
    }
}
