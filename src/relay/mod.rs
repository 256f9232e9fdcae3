//! Relay module - decides when scrolled content continues in a neighbor
//!
//! Provides:
//! - Scroll event and command types
//! - The stateless relay engine (boundary test, target, offset)
//! - The router that turns raw host notifications into decisions
//! - Shared state guarded for single-writer / many-reader access

mod engine;
mod router;
mod state;

pub use engine::RelayEngine;
pub use router::{normalize, ScrollEventRouter, SCROLL_UNITS_PER_LINE, WHEEL_DELTA};
pub use state::RelayState;

use serde::Serialize;

use crate::host::WindowId;
use crate::screen::RegionId;

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl std::str::FromStr for ScrollDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            other => Err(format!("unknown scroll direction '{}'", other)),
        }
    }
}

/// A normalized scroll notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollEvent {
    pub window_id: WindowId,
    pub direction: ScrollDirection,
    /// Scroll units, always > 0. Reported with each decision; the trigger
    /// test reads the position the host already applied.
    pub magnitude: u32,
    /// Region the window is in, `None` when it could not be resolved
    pub source_region_id: Option<RegionId>,
}

/// Live scroll values of one window, read from the host per event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScrollMetrics {
    /// Current scroll offset
    pub position: i32,
    /// Total scrollable extent of the content
    pub content_extent: i32,
    /// Visible height of the viewport
    pub client_height: i32,
}

impl ScrollMetrics {
    pub fn new(position: i32, content_extent: i32, client_height: i32) -> Self {
        Self {
            position,
            content_extent,
            client_height,
        }
    }

    /// Values a real scrollbar can never report
    pub fn is_valid(&self) -> bool {
        self.client_height > 0 && self.position >= 0 && self.content_extent >= 0
    }
}

/// What the engine needs to know about the scrolled window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Owning application (process name)
    pub app_key: String,
    pub title: String,
    pub metrics: ScrollMetrics,
}

/// Why an event did not produce a hand-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Raw notification was not a recognizable line/wheel scroll
    UnrecognizedInput,
    /// Host could not describe the window
    UnknownWindow,
    GloballyDisabled,
    /// Application excluded by the allow/deny lists
    NotEligible,
    PolicyDisabled,
    UnknownRegion,
    RegionDisabled,
    InvalidMetrics,
    NotNearBoundary,
    NoNeighbor,
    TargetDisabled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::UnrecognizedInput => "unrecognized input",
            SkipReason::UnknownWindow => "unknown window",
            SkipReason::GloballyDisabled => "relay globally disabled",
            SkipReason::NotEligible => "application not eligible",
            SkipReason::PolicyDisabled => "relay disabled by application policy",
            SkipReason::UnknownRegion => "source region unknown",
            SkipReason::RegionDisabled => "relay disabled for source region",
            SkipReason::InvalidMetrics => "invalid scroll metrics",
            SkipReason::NotNearBoundary => "not near a boundary",
            SkipReason::NoNeighbor => "no neighbor in scroll direction",
            SkipReason::TargetDisabled => "relay disabled for target region",
        };
        f.write_str(text)
    }
}

/// Outcome of evaluating one scroll event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncCommand {
    /// Window the scroll happened in
    pub source_window_id: WindowId,
    /// Window to scroll, when the host knows one in the target region
    pub target_window_id: Option<WindowId>,
    pub target_region_id: Option<RegionId>,
    /// Offset to apply to the target, never negative
    pub target_scroll_position: i32,
    /// `false` means handled with no hand-off needed
    pub triggered: bool,
    /// First failing check when not triggered
    pub skipped: Option<SkipReason>,
}

impl SyncCommand {
    pub fn skipped(source_window_id: WindowId, reason: SkipReason) -> Self {
        Self {
            source_window_id,
            target_window_id: None,
            target_region_id: None,
            target_scroll_position: 0,
            triggered: false,
            skipped: Some(reason),
        }
    }

    pub fn handoff(source_window_id: WindowId, target_region_id: RegionId, position: i32) -> Self {
        Self {
            source_window_id,
            target_window_id: None,
            target_region_id: Some(target_region_id),
            target_scroll_position: position.max(0),
            triggered: true,
            skipped: None,
        }
    }
}
