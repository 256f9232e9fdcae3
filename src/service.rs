//! Relay service
//!
//! Owns the scroll event source and drives the router: each raw event is
//! evaluated to completion, the resulting hand-off is applied to the host and
//! an event is published for whoever is watching.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::host::{
    DisplayEnumerator, HostError, RawScrollEvent, ScrollEventSource, WindowId, WindowIdentity, WindowScrollAccessor,
};
use crate::relay::{RelayState, ScrollEventRouter, SyncCommand};
use crate::screen::{split_display, RegionId};

/// Service errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Service already running")]
    AlreadyRunning,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Commands accepted while the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayControl {
    Enable,
    Disable,
    Toggle,
    /// Re-enumerate displays and rebuild the topology
    RefreshDisplays,
    Shutdown,
}

/// Events emitted by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RelayEvent {
    /// A target window was scrolled to continue the content
    HandoffApplied {
        source_window: WindowId,
        target_window: WindowId,
        target_region: RegionId,
        position: i32,
    },
    /// A hand-off was decided but could not be carried out
    HandoffDropped {
        source_window: WindowId,
        target_region: Option<RegionId>,
        reason: String,
    },
    /// Topology rebuilt from the host's displays
    DisplaysRefreshed { regions: usize },
    RelayToggled { enabled: bool },
    Error { message: String },
}

/// Scroll relay service
pub struct RelayService {
    router: ScrollEventRouter,
    displays: Arc<dyn DisplayEnumerator>,
    scroll: Arc<dyn WindowScrollAccessor>,
    source: Box<dyn ScrollEventSource>,
    /// Event sender
    event_tx: mpsc::Sender<RelayEvent>,
    /// Event receiver (for consumers)
    event_rx: Option<mpsc::Receiver<RelayEvent>>,
    control_tx: mpsc::Sender<RelayControl>,
    control_rx: Option<mpsc::Receiver<RelayControl>>,
}

impl RelayService {
    /// Create a service over a host that provides every synchronous trait
    pub fn new<H>(state: RelayState, host: Arc<H>, source: Box<dyn ScrollEventSource>) -> Self
    where
        H: DisplayEnumerator + WindowIdentity + WindowScrollAccessor + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (control_tx, control_rx) = mpsc::channel(16);

        Self {
            router: ScrollEventRouter::new(state, host.clone(), host.clone()),
            displays: host.clone(),
            scroll: host,
            source,
            event_tx,
            event_rx: Some(event_rx),
            control_tx,
            control_rx: Some(control_rx),
        }
    }

    /// Take the event receiver (can only be called once)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<RelayEvent>> {
        self.event_rx.take()
    }

    /// Sender for control commands
    pub fn control_handle(&self) -> mpsc::Sender<RelayControl> {
        self.control_tx.clone()
    }

    pub fn state(&self) -> &RelayState {
        self.router.state()
    }

    /// Re-enumerate the host's displays, split each one and rebuild the
    /// topology. Returns the number of regions.
    pub fn refresh_displays(&self) -> ServiceResult<usize> {
        let displays = self.displays.displays()?;
        let state = self.router.state();

        let (split_type, split_ratio) = {
            let config = state.config();
            (config.default_split_type, config.default_split_ratio)
        };

        let mut topology = state.topology_mut();
        topology.set_defaults(split_type, split_ratio);

        let panes: Vec<_> = displays
            .iter()
            .flat_map(|display| {
                let settings = topology.settings_for(&display.id, display.display_id());
                split_display(
                    display,
                    settings.split_type.unwrap_or(split_type),
                    settings.split_ratio.unwrap_or(split_ratio),
                    &settings.custom_regions,
                )
            })
            .collect();

        let regions = topology.rebuild(panes);
        tracing::info!(
            "Topology rebuilt: {} display(s), {} region(s)",
            displays.len(),
            regions
        );
        Ok(regions)
    }

    /// Evaluate one raw event, apply the outcome and publish it
    pub fn process(&self, raw: &RawScrollEvent) -> Option<RelayEvent> {
        let command = self.router.on_scroll(raw);
        let event = self.apply(&command)?;
        self.publish(event.clone());
        Some(event)
    }

    /// Carry out a decided hand-off.
    ///
    /// Commands whose target region vanished since evaluation, or that have
    /// no target window, are dropped. Returns `None` when nothing was decided.
    pub fn apply(&self, command: &SyncCommand) -> Option<RelayEvent> {
        if !command.triggered {
            return None;
        }

        let dropped = |reason: String| {
            tracing::debug!(
                "Dropping hand-off from window {}: {}",
                command.source_window_id,
                reason
            );
            RelayEvent::HandoffDropped {
                source_window: command.source_window_id,
                target_region: command.target_region_id.clone(),
                reason,
            }
        };

        let Some(region) = command
            .target_region_id
            .as_deref()
            .filter(|id| self.router.state().topology().get(id).is_some())
        else {
            return Some(dropped("target region no longer exists".to_string()));
        };

        let Some(target) = command.target_window_id else {
            return Some(dropped(format!("no window in region '{}'", region)));
        };

        match self.scroll.set_position(target, command.target_scroll_position) {
            Ok(()) => {
                tracing::info!(
                    "Window {} continues in window {} ('{}') at {}",
                    command.source_window_id,
                    target,
                    region,
                    command.target_scroll_position
                );
                Some(RelayEvent::HandoffApplied {
                    source_window: command.source_window_id,
                    target_window: target,
                    target_region: region.to_string(),
                    position: command.target_scroll_position,
                })
            }
            Err(e) => Some(dropped(e.to_string())),
        }
    }

    /// Run until shut down or until the scroll source closes
    pub async fn run(&mut self) -> ServiceResult<()> {
        let mut control_rx = self.control_rx.take().ok_or(ServiceError::AlreadyRunning)?;
        let mut scroll_rx = self.source.start().await?;

        self.refresh();
        tracing::info!("Relay service running");

        loop {
            tokio::select! {
                raw = scroll_rx.recv() => {
                    let Some(raw) = raw else {
                        tracing::info!("Scroll source closed");
                        break;
                    };
                    self.process(&raw);
                }
                control = control_rx.recv() => {
                    match control {
                        Some(RelayControl::Shutdown) | None => {
                            tracing::info!("Relay service shutdown requested");
                            break;
                        }
                        Some(control) => self.handle_control(control),
                    }
                }
            }
        }

        if self.source.is_running() {
            self.source.stop().await?;
        }
        tracing::info!("Relay service stopped");
        Ok(())
    }

    fn handle_control(&self, control: RelayControl) {
        let state = self.router.state();
        let enabled = match control {
            RelayControl::Enable => true,
            RelayControl::Disable => false,
            RelayControl::Toggle => !state.is_enabled(),
            RelayControl::RefreshDisplays => {
                self.refresh();
                return;
            }
            RelayControl::Shutdown => return,
        };

        if state.set_enabled(enabled) != enabled {
            tracing::info!("Relay {}", if enabled { "enabled" } else { "disabled" });
        }
        self.publish(RelayEvent::RelayToggled { enabled });
    }

    fn refresh(&self) {
        match self.refresh_displays() {
            Ok(regions) => self.publish(RelayEvent::DisplaysRefreshed { regions }),
            Err(e) => {
                tracing::warn!("Display refresh failed: {}", e);
                self.publish(RelayEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    // Never waits on the consumer
    fn publish(&self, event: RelayEvent) {
        if let Err(mpsc::error::TrySendError::Full(event)) = self.event_tx.try_send(event) {
            tracing::debug!("Event channel full, dropping {:?}", event);
        }
    }
}
