//! Application relay policies
//!
//! Per-application preferences keyed by process name, with an optional
//! window title pattern, plus the global allow/deny eligibility check.

mod glob;

pub use glob::glob_match;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;
use crate::screen::{Rect, SplitType};

/// Kind of application (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppCategory {
    Browser,
    Document,
    CodeEditor,
    ImageViewer,
    VideoPlayer,
    Game,
    #[default]
    Other,
}

/// An explicit pane an application wants instead of the automatic split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRegion {
    pub bounds: Rect,
    /// Overlap margin for hand-offs out of this pane
    #[serde(default)]
    pub overlap_height: Option<u32>,
}

/// Relay preference for one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPolicy {
    /// Process name the policy applies to
    pub match_key: String,
    /// Glob over the window title; `None` matches every title
    #[serde(default)]
    pub title_pattern: Option<String>,
    #[serde(default = "default_true")]
    pub relay_enabled: bool,
    #[serde(default)]
    pub preferred_split_type: SplitType,
    #[serde(default = "default_split_ratio")]
    pub preferred_split_ratio: f64,
    #[serde(default)]
    pub app_category: AppCategory,
    #[serde(default)]
    pub custom_regions: Vec<CustomRegion>,
}

fn default_true() -> bool {
    true
}

fn default_split_ratio() -> f64 {
    0.5
}

impl ApplicationPolicy {
    /// The policy used for applications nobody configured
    pub fn new(match_key: &str) -> Self {
        Self {
            match_key: normalize_app_key(match_key),
            title_pattern: None,
            relay_enabled: true,
            preferred_split_type: SplitType::LeftRight,
            preferred_split_ratio: default_split_ratio(),
            app_category: AppCategory::Other,
            custom_regions: Vec::new(),
        }
    }

    fn builtin(match_key: &str, title_pattern: &str, app_category: AppCategory) -> Self {
        Self {
            title_pattern: Some(title_pattern.to_string()),
            app_category,
            ..Self::new(match_key)
        }
    }

    pub fn matches_title(&self, title: &str) -> bool {
        self.title_pattern
            .as_deref()
            .map_or(true, |pattern| glob_match(pattern, title))
    }

    /// Overlap set on the custom pane whose bounds are exactly `region`
    pub fn custom_overlap_for(&self, region: &Rect) -> Option<u32> {
        self.custom_regions
            .iter()
            .find(|c| c.bounds == *region)
            .and_then(|c| c.overlap_height)
    }

    fn is_valid(&self) -> bool {
        !self.match_key.is_empty()
            && self.preferred_split_ratio.is_finite()
            && (0.0..=1.0).contains(&self.preferred_split_ratio)
    }
}

/// Normalize an application identifier for lookups.
///
/// Process names compare case-insensitively and without surrounding space.
pub fn normalize_app_key(app_key: &str) -> String {
    app_key.trim().to_lowercase()
}

/// Holds the per-application policies
#[derive(Debug, Clone, Default)]
pub struct ApplicationPolicyStore {
    policies: HashMap<String, ApplicationPolicy>,
}

impl ApplicationPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with policies for common readers, browsers and editors
    pub fn with_builtin_policies() -> Self {
        let mut store = Self::new();
        for policy in [
            ApplicationPolicy::builtin("chrome", "*Google Chrome*", AppCategory::Browser),
            ApplicationPolicy::builtin("msedge", "*Microsoft Edge*", AppCategory::Browser),
            ApplicationPolicy::builtin("code", "*Visual Studio Code*", AppCategory::CodeEditor),
            ApplicationPolicy::builtin("acrobat", "*Adobe Acrobat*", AppCategory::Document),
            ApplicationPolicy::builtin("notepad", "*Notepad*", AppCategory::Other),
        ] {
            store.upsert(policy);
        }
        store
    }

    /// Policy for a window of `app_key` titled `window_title`.
    ///
    /// Falls back to the default policy when the key is unknown or the
    /// stored policy's title pattern does not match.
    pub fn policy_for(&self, app_key: &str, window_title: &str) -> ApplicationPolicy {
        let key = normalize_app_key(app_key);
        match self.policies.get(&key) {
            Some(policy) if policy.matches_title(window_title) => policy.clone(),
            Some(_) => {
                tracing::trace!("Title '{}' does not match policy for '{}'", window_title, key);
                ApplicationPolicy::new(&key)
            }
            None => ApplicationPolicy::new(&key),
        }
    }

    /// Insert or replace the policy for its key. Last write wins.
    ///
    /// Returns `false` and leaves the store untouched for a malformed policy.
    pub fn upsert(&mut self, mut policy: ApplicationPolicy) -> bool {
        policy.match_key = normalize_app_key(&policy.match_key);
        if !policy.is_valid() {
            tracing::warn!(
                "Ignoring invalid policy for '{}' (split ratio {})",
                policy.match_key,
                policy.preferred_split_ratio
            );
            return false;
        }

        tracing::debug!("Policy for '{}' updated", policy.match_key);
        self.policies.insert(policy.match_key.clone(), policy);
        true
    }

    pub fn remove(&mut self, app_key: &str) -> Option<ApplicationPolicy> {
        self.policies.remove(&normalize_app_key(app_key))
    }

    /// Whether the allow/deny lists let `app_key` relay at all.
    ///
    /// Deny always wins; an empty allow list allows everything else.
    pub fn is_eligible(&self, app_key: &str, config: &RelayConfig) -> bool {
        let key = normalize_app_key(app_key);
        if config.deny_list.contains(&key) {
            return false;
        }
        config.allow_list.is_empty() || config.allow_list.contains(&key)
    }

    pub fn policies(&self) -> impl Iterator<Item = &ApplicationPolicy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
