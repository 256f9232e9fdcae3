//! In-memory host
//!
//! Keeps displays and windows in memory and implements the synchronous host
//! traits over them. Scroll positions are clamped the way a scrollbar would.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::events::WindowId;
use super::traits::{DisplayEnumerator, HostError, HostResult, WindowIdentity, WindowScrollAccessor};
use crate::policy::normalize_app_key;
use crate::screen::{DisplayRegion, RawDisplayDescriptor, Rect};

/// A window living on the simulated host
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedWindow {
    pub app_key: String,
    pub title: String,
    /// Id of the display the window sits on
    pub display_id: String,
    pub bounds: Rect,
    pub position: i32,
    pub client_height: i32,
    pub content_extent: i32,
}

impl SimulatedWindow {
    /// Largest offset the content can be scrolled to
    pub fn max_position(&self) -> i32 {
        (self.content_extent - self.client_height).max(0)
    }
}

#[derive(Debug, Default)]
struct HostState {
    displays: Vec<RawDisplayDescriptor>,
    windows: BTreeMap<WindowId, SimulatedWindow>,
    next_window_id: WindowId,
}

/// In-memory implementation of the host traits
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: Mutex<HostState>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_displays(displays: Vec<RawDisplayDescriptor>) -> Self {
        let host = Self::new();
        host.set_displays(displays);
        host
    }

    /// Replace the display set (a display configuration change)
    pub fn set_displays(&self, displays: Vec<RawDisplayDescriptor>) {
        self.lock().displays = displays;
    }

    /// Open a window and return its id
    pub fn open_window(&self, window: SimulatedWindow) -> WindowId {
        let mut state = self.lock();
        state.next_window_id += 1;
        let id = state.next_window_id;
        state.windows.insert(id, window);
        id
    }

    pub fn close_window(&self, window: WindowId) -> Option<SimulatedWindow> {
        self.lock().windows.remove(&window)
    }

    pub fn window(&self, window: WindowId) -> Option<SimulatedWindow> {
        self.lock().windows.get(&window).cloned()
    }

    /// Scroll a window by `delta` units (positive scrolls down).
    ///
    /// Returns the new, clamped position.
    pub fn scroll_by(&self, window: WindowId, delta: i32) -> HostResult<i32> {
        let mut state = self.lock();
        let w = state
            .windows
            .get_mut(&window)
            .ok_or(HostError::WindowNotFound(window))?;
        w.position = w.position.saturating_add(delta).clamp(0, w.max_position());
        Ok(w.position)
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_window<T>(&self, window: WindowId, f: impl FnOnce(&SimulatedWindow) -> T) -> HostResult<T> {
        self.lock()
            .windows
            .get(&window)
            .map(f)
            .ok_or(HostError::WindowNotFound(window))
    }
}

impl DisplayEnumerator for SimulatedHost {
    fn displays(&self) -> HostResult<Vec<RawDisplayDescriptor>> {
        Ok(self.lock().displays.clone())
    }
}

impl WindowScrollAccessor for SimulatedHost {
    fn position(&self, window: WindowId) -> HostResult<i32> {
        self.with_window(window, |w| w.position)
    }

    fn set_position(&self, window: WindowId, position: i32) -> HostResult<()> {
        let mut state = self.lock();
        let w = state
            .windows
            .get_mut(&window)
            .ok_or(HostError::WindowNotFound(window))?;
        w.position = position.clamp(0, w.max_position());
        Ok(())
    }

    fn client_height(&self, window: WindowId) -> HostResult<i32> {
        self.with_window(window, |w| w.client_height)
    }

    fn content_extent(&self, window: WindowId) -> HostResult<i32> {
        self.with_window(window, |w| w.content_extent)
    }
}

impl WindowIdentity for SimulatedHost {
    fn owner_application_key(&self, window: WindowId) -> HostResult<String> {
        self.with_window(window, |w| w.app_key.clone())
    }

    fn title(&self, window: WindowId) -> HostResult<String> {
        self.with_window(window, |w| w.title.clone())
    }

    fn containing_display(&self, window: WindowId) -> HostResult<RawDisplayDescriptor> {
        let state = self.lock();
        let w = state
            .windows
            .get(&window)
            .ok_or(HostError::WindowNotFound(window))?;
        state
            .displays
            .iter()
            .find(|d| d.id == w.display_id)
            .cloned()
            .ok_or_else(|| HostError::DisplayNotFound(w.display_id.clone()))
    }

    fn window_bounds(&self, window: WindowId) -> HostResult<Rect> {
        self.with_window(window, |w| w.bounds)
    }

    fn window_in_region(&self, region: &DisplayRegion, app_key: &str, exclude: WindowId) -> Option<WindowId> {
        let app_key = normalize_app_key(app_key);
        self.lock()
            .windows
            .iter()
            .filter(|(id, _)| **id != exclude)
            .filter(|(_, w)| normalize_app_key(&w.app_key) == app_key)
            .find(|(_, w)| {
                let (cx, cy) = w.bounds.center();
                region.bounds.contains_point(cx, cy)
            })
            .map(|(id, _)| *id)
    }
}
