//! Raw scroll notifications
//!
//! Platform-independent representation of what a host reports before
//! normalization.

/// Host window handle
pub type WindowId = u64;

/// Scrollbar line codes as reported by the host
pub mod line_codes {
    pub const LINE_UP: u32 = 0;
    pub const LINE_DOWN: u32 = 1;
    pub const PAGE_UP: u32 = 2;
    pub const PAGE_DOWN: u32 = 3;
    pub const THUMB_POSITION: u32 = 4;
}

/// What kind of scroll the host observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawScrollKind {
    /// Mouse wheel; positive delta scrolls up, one notch is `WHEEL_DELTA`
    Wheel { delta: i32 },
    /// Scrollbar command identified by a line code
    ScrollBar { code: u32 },
}

/// A raw scroll notification for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawScrollEvent {
    pub window_id: WindowId,
    pub kind: RawScrollKind,
}

impl RawScrollEvent {
    pub fn wheel(window_id: WindowId, delta: i32) -> Self {
        Self {
            window_id,
            kind: RawScrollKind::Wheel { delta },
        }
    }

    pub fn scroll_bar(window_id: WindowId, code: u32) -> Self {
        Self {
            window_id,
            kind: RawScrollKind::ScrollBar { code },
        }
    }
}
