//! Host trait definitions
//!
//! Defines the interface a platform backend must provide.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::events::{RawScrollEvent, WindowId};
use crate::relay::ScrollMetrics;
use crate::screen::{DisplayRegion, RawDisplayDescriptor, Rect};

/// Errors that can occur talking to the host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Window not found: {0}")]
    WindowNotFound(WindowId),

    #[error("Display not found: {0}")]
    DisplayNotFound(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Event source already started")]
    AlreadyStarted,

    #[error("Event source not started")]
    NotStarted,
}

pub type HostResult<T> = Result<T, HostError>;

/// Produces the current set of displays
pub trait DisplayEnumerator: Send + Sync {
    fn displays(&self) -> HostResult<Vec<RawDisplayDescriptor>>;
}

/// Reads and writes a window's scroll state
pub trait WindowScrollAccessor: Send + Sync {
    fn position(&self, window: WindowId) -> HostResult<i32>;

    fn set_position(&self, window: WindowId, position: i32) -> HostResult<()>;

    /// Visible height of the window's viewport
    fn client_height(&self, window: WindowId) -> HostResult<i32>;

    /// Total scrollable extent of the window's content
    fn content_extent(&self, window: WindowId) -> HostResult<i32>;

    /// All three values the relay engine reads, in one call
    fn metrics(&self, window: WindowId) -> HostResult<ScrollMetrics> {
        Ok(ScrollMetrics {
            position: self.position(window)?,
            content_extent: self.content_extent(window)?,
            client_height: self.client_height(window)?,
        })
    }
}

/// Identifies a window's owner, title and location
pub trait WindowIdentity: Send + Sync {
    /// Process name of the owning application
    fn owner_application_key(&self, window: WindowId) -> HostResult<String>;

    fn title(&self, window: WindowId) -> HostResult<String>;

    /// Display the window currently sits on
    fn containing_display(&self, window: WindowId) -> HostResult<RawDisplayDescriptor>;

    fn window_bounds(&self, window: WindowId) -> HostResult<Rect>;

    /// A window of `app_key` shown in `region`, other than `exclude`.
    ///
    /// Finding or creating the window that continues the content is up to
    /// the host; the default finds none.
    fn window_in_region(&self, _region: &DisplayRegion, _app_key: &str, _exclude: WindowId) -> Option<WindowId> {
        None
    }
}

/// Push feed of raw scroll notifications
#[async_trait]
pub trait ScrollEventSource: Send + Sync {
    /// Start delivering events
    /// Returns a receiver that will emit raw notifications
    async fn start(&mut self) -> HostResult<mpsc::Receiver<RawScrollEvent>>;

    /// Stop delivering events
    async fn stop(&mut self) -> HostResult<()>;

    fn is_running(&self) -> bool;
}
