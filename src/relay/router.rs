//! Scroll event routing
//!
//! Turns raw host notifications into scroll events, gathers what the engine
//! needs from the host and hands the decision back. Routing never fails:
//! anything that cannot be resolved becomes a skipped command.

use std::sync::Arc;

use crate::host::{
    line_codes, HostError, HostResult, RawScrollEvent, RawScrollKind, WindowId, WindowIdentity,
    WindowScrollAccessor,
};
use crate::screen::{RawDisplayDescriptor, Rect};

use super::{RelayEngine, RelayState, ScrollDirection, ScrollEvent, SkipReason, SyncCommand, WindowSnapshot};

/// Wheel delta of one notch
pub const WHEEL_DELTA: i32 = 120;

/// Scroll units for one wheel notch or one scrollbar line
pub const SCROLL_UNITS_PER_LINE: u32 = 15;

/// Map a raw notification to a direction and a magnitude in scroll units.
///
/// Returns `None` for notifications that are not line or wheel scrolls
/// (page jumps, thumb drags, zero deltas).
pub fn normalize(kind: &RawScrollKind) -> Option<(ScrollDirection, u32)> {
    match *kind {
        RawScrollKind::Wheel { delta } if delta != 0 => {
            let direction = if delta > 0 {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            // Partial notches from precision touchpads still move one unit
            let units = u64::from(delta.unsigned_abs()) * u64::from(SCROLL_UNITS_PER_LINE)
                / WHEEL_DELTA as u64;
            Some((direction, u32::try_from(units.max(1)).unwrap_or(u32::MAX)))
        }
        RawScrollKind::ScrollBar {
            code: line_codes::LINE_UP,
        } => Some((ScrollDirection::Up, SCROLL_UNITS_PER_LINE)),
        RawScrollKind::ScrollBar {
            code: line_codes::LINE_DOWN,
        } => Some((ScrollDirection::Down, SCROLL_UNITS_PER_LINE)),
        _ => None,
    }
}

/// Routes raw scroll notifications through the relay engine
pub struct ScrollEventRouter {
    engine: RelayEngine,
    state: RelayState,
    identity: Arc<dyn WindowIdentity>,
    scroll: Arc<dyn WindowScrollAccessor>,
}

impl ScrollEventRouter {
    pub fn new(
        state: RelayState,
        identity: Arc<dyn WindowIdentity>,
        scroll: Arc<dyn WindowScrollAccessor>,
    ) -> Self {
        Self {
            engine: RelayEngine::new(),
            state,
            identity,
            scroll,
        }
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Decide what to do about one raw scroll notification
    pub fn on_scroll(&self, raw: &RawScrollEvent) -> SyncCommand {
        let window_id = raw.window_id;

        let Some((direction, magnitude)) = normalize(&raw.kind) else {
            return SyncCommand::skipped(window_id, SkipReason::UnrecognizedInput);
        };

        // Checked before any host query so a disabled relay costs nothing
        if !self.state.is_enabled() {
            return SyncCommand::skipped(window_id, SkipReason::GloballyDisabled);
        }

        let (window, display, bounds) = match self.describe(window_id) {
            Ok(described) => described,
            Err(HostError::DisplayNotFound(display_id)) => {
                tracing::debug!("Window {} is on unknown display '{}'", window_id, display_id);
                return SyncCommand::skipped(window_id, SkipReason::UnknownRegion);
            }
            Err(e) => {
                tracing::debug!("Cannot describe window {}: {}", window_id, e);
                return SyncCommand::skipped(window_id, SkipReason::UnknownWindow);
            }
        };

        let topology = self.state.topology();
        let event = ScrollEvent {
            window_id,
            direction,
            magnitude,
            source_region_id: topology.region_of(bounds.as_ref(), &display.id),
        };

        let mut command = {
            let policies = self.state.policies();
            let config = self.state.config();
            self.engine
                .evaluate(&event, &window, &topology, &policies, &config)
        };

        if command.triggered {
            command.target_window_id = command
                .target_region_id
                .as_deref()
                .and_then(|id| topology.get(id))
                .and_then(|region| {
                    self.identity
                        .window_in_region(region, &window.app_key, window_id)
                });
        }

        command
    }

    fn describe(&self, window: WindowId) -> HostResult<(WindowSnapshot, RawDisplayDescriptor, Option<Rect>)> {
        let snapshot = WindowSnapshot {
            app_key: self.identity.owner_application_key(window)?,
            title: self.identity.title(window)?,
            metrics: self.scroll.metrics(window)?,
        };
        let display = self.identity.containing_display(window)?;
        let bounds = self.identity.window_bounds(window).ok();
        Ok((snapshot, display, bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::host::{SimulatedHost, SimulatedWindow};
    use crate::policy::ApplicationPolicyStore;
    use crate::screen::{split_display, DisplayTopology, SplitType};

    struct Fixture {
        host: Arc<SimulatedHost>,
        router: ScrollEventRouter,
        left: WindowId,
        right: WindowId,
    }

    /// One 2000x1000 display split into two panes with a reader in each
    fn fixture() -> Fixture {
        let display = RawDisplayDescriptor::new("DISPLAY1", Rect::new(0, 0, 2000, 1000));
        let host = Arc::new(SimulatedHost::with_displays(vec![display.clone()]));

        let mut topology = DisplayTopology::default();
        topology.rebuild(split_display(&display, SplitType::LeftRight, 0.5, &[]));

        let config = RelayConfig {
            scroll_trigger_threshold: 20,
            ..Default::default()
        };
        let state = RelayState::new(topology, ApplicationPolicyStore::new(), config);

        let reader = |x: i32, position: i32| SimulatedWindow {
            app_key: "Reader".to_string(),
            title: "book.pdf".to_string(),
            display_id: "DISPLAY1".to_string(),
            bounds: Rect::new(x, 0, 1000, 1000),
            position,
            client_height: 1000,
            content_extent: 2000,
        };
        let left = host.open_window(reader(0, 990));
        let right = host.open_window(reader(1000, 0));

        let router = ScrollEventRouter::new(state, host.clone(), host.clone());
        Fixture {
            host,
            router,
            left,
            right,
        }
    }

    #[test]
    fn test_normalize_wheel_and_lines() {
        assert_eq!(
            normalize(&RawScrollKind::Wheel { delta: -240 }),
            Some((ScrollDirection::Down, 30))
        );
        assert_eq!(
            normalize(&RawScrollKind::Wheel { delta: 120 }),
            Some((ScrollDirection::Up, 15))
        );
        assert_eq!(
            normalize(&RawScrollKind::Wheel { delta: -8 }),
            Some((ScrollDirection::Down, 1))
        );
        assert_eq!(normalize(&RawScrollKind::Wheel { delta: 0 }), None);
        assert_eq!(
            normalize(&RawScrollKind::ScrollBar {
                code: line_codes::LINE_DOWN
            }),
            Some((ScrollDirection::Down, SCROLL_UNITS_PER_LINE))
        );
        assert_eq!(
            normalize(&RawScrollKind::ScrollBar {
                code: line_codes::PAGE_DOWN
            }),
            None
        );
    }

    #[test]
    fn test_wheel_near_bottom_hands_off_to_right_pane() {
        let f = fixture();

        let command = f.router.on_scroll(&RawScrollEvent::wheel(f.left, -WHEEL_DELTA));

        assert!(command.triggered);
        assert_eq!(command.target_region_id.as_deref(), Some("DISPLAY1#1"));
        assert_eq!(command.target_window_id, Some(f.right));
        // 990 - 1000 + 50 (default overlap)
        assert_eq!(command.target_scroll_position, 40);
    }

    #[test]
    fn test_scrollbar_line_far_from_bottom() {
        let f = fixture();
        f.host.scroll_by(f.left, -500).unwrap();

        let command = f
            .router
            .on_scroll(&RawScrollEvent::scroll_bar(f.left, line_codes::LINE_DOWN));

        assert!(!command.triggered);
        assert_eq!(command.skipped, Some(SkipReason::NotNearBoundary));
    }

    #[test]
    fn test_unknown_window_and_input() {
        let f = fixture();

        let command = f.router.on_scroll(&RawScrollEvent::wheel(404, -WHEEL_DELTA));
        assert_eq!(command.skipped, Some(SkipReason::UnknownWindow));

        let command = f
            .router
            .on_scroll(&RawScrollEvent::scroll_bar(f.left, line_codes::THUMB_POSITION));
        assert_eq!(command.skipped, Some(SkipReason::UnrecognizedInput));
    }

    #[test]
    fn test_disable_halts_next_event() {
        let f = fixture();
        assert!(f.router.on_scroll(&RawScrollEvent::wheel(f.left, -WHEEL_DELTA)).triggered);

        f.router.state().set_enabled(false);

        let command = f.router.on_scroll(&RawScrollEvent::wheel(f.left, -WHEEL_DELTA));
        assert!(!command.triggered);
        assert_eq!(command.skipped, Some(SkipReason::GloballyDisabled));
    }

    #[test]
    fn test_stale_topology_is_not_an_error() {
        let f = fixture();
        f.router.state().topology_mut().rebuild(Vec::new());

        let command = f.router.on_scroll(&RawScrollEvent::wheel(f.left, -WHEEL_DELTA));
        assert_eq!(command.skipped, Some(SkipReason::UnknownRegion));

        f.host.set_displays(Vec::new());
        let command = f.router.on_scroll(&RawScrollEvent::wheel(f.left, -WHEEL_DELTA));
        assert_eq!(command.skipped, Some(SkipReason::UnknownRegion));
    }
}
