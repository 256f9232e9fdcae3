//! Relay decision engine
//!
//! Decides whether a scroll event should continue in a neighboring region
//! and at which offset. The engine holds no state: everything it needs is
//! passed in per call, so identical inputs always give identical decisions.

use crate::config::RelayConfig;
use crate::policy::{ApplicationPolicy, ApplicationPolicyStore};
use crate::screen::{DisplayRegion, DisplayTopology, Edge};

use super::{ScrollDirection, ScrollEvent, ScrollMetrics, SkipReason, SyncCommand, WindowSnapshot};

/// Stateless relay decision engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayEngine;

impl RelayEngine {
    pub fn new() -> Self {
        Self
    }

    /// Edge of `region` that content continues through in `direction`
    pub fn relay_edge(region: &DisplayRegion, direction: ScrollDirection) -> Edge {
        match direction {
            ScrollDirection::Down => region.next_edge(),
            ScrollDirection::Up => region.previous_edge(),
        }
    }

    /// Whether the viewport is within the trigger threshold of the content
    /// edge it is moving towards.
    pub fn within_trigger_zone(metrics: &ScrollMetrics, direction: ScrollDirection, threshold: u32) -> bool {
        let position = i64::from(metrics.position);
        let threshold = i64::from(threshold);

        match direction {
            ScrollDirection::Down => {
                let bottom = i64::from(metrics.content_extent) - i64::from(metrics.client_height);
                position >= bottom - threshold
            }
            ScrollDirection::Up => position <= threshold,
        }
    }

    /// Boundary test for a hand-off out of `region`.
    ///
    /// Never triggers when there is no neighbor in the relay direction,
    /// whatever the scroll position.
    pub fn should_trigger_handoff(
        &self,
        region: &DisplayRegion,
        topology: &DisplayTopology,
        metrics: &ScrollMetrics,
        direction: ScrollDirection,
        config: &RelayConfig,
    ) -> bool {
        self.trigger_check(region, topology, metrics, direction, config)
            .is_ok()
    }

    fn trigger_check(
        &self,
        region: &DisplayRegion,
        topology: &DisplayTopology,
        metrics: &ScrollMetrics,
        direction: ScrollDirection,
        config: &RelayConfig,
    ) -> Result<(), SkipReason> {
        if !metrics.is_valid() {
            return Err(SkipReason::InvalidMetrics);
        }
        if topology
            .neighbor(&region.id, Self::relay_edge(region, direction))
            .is_none()
        {
            return Err(SkipReason::NoNeighbor);
        }
        if !Self::within_trigger_zone(metrics, direction, config.scroll_trigger_threshold) {
            return Err(SkipReason::NotNearBoundary);
        }
        Ok(())
    }

    /// Scroll offset the target region should show after a hand-off.
    ///
    /// The target starts `overlap` units before the end of the viewport
    /// being left, so that margin is the only content shown twice. The
    /// result is clamped to `0..=i32::MAX`.
    pub fn compute_target_position(
        &self,
        direction: ScrollDirection,
        source_position: i32,
        source_client_height: i32,
        target_client_height: i32,
        overlap: u32,
    ) -> i32 {
        let viewport = match direction {
            ScrollDirection::Down => source_client_height,
            ScrollDirection::Up => target_client_height,
        };

        let target = i64::from(source_position) - i64::from(viewport) + i64::from(overlap);
        target.clamp(0, i64::from(i32::MAX)) as i32
    }

    /// Overlap margin for a hand-off out of `region`: the policy's custom
    /// pane first, then the region, then the global default.
    pub fn resolve_overlap(policy: &ApplicationPolicy, region: &DisplayRegion, config: &RelayConfig) -> u32 {
        policy
            .custom_overlap_for(&region.bounds)
            .or(region.overlap_height)
            .unwrap_or(config.default_overlap_height)
    }

    /// Full decision for one scroll event.
    ///
    /// Checks run in a fixed order and the first failure short-circuits:
    /// global switch, eligibility and policy, source region, source relay
    /// flag, boundary test, target region, then the offset.
    pub fn evaluate(
        &self,
        event: &ScrollEvent,
        window: &WindowSnapshot,
        topology: &DisplayTopology,
        policies: &ApplicationPolicyStore,
        config: &RelayConfig,
    ) -> SyncCommand {
        let skip = |reason: SkipReason| {
            tracing::trace!("Window {}: no hand-off ({})", event.window_id, reason);
            SyncCommand::skipped(event.window_id, reason)
        };

        if !config.globally_enabled {
            return skip(SkipReason::GloballyDisabled);
        }

        if !policies.is_eligible(&window.app_key, config) {
            return skip(SkipReason::NotEligible);
        }
        let policy = policies.policy_for(&window.app_key, &window.title);
        if !policy.relay_enabled {
            return skip(SkipReason::PolicyDisabled);
        }

        let Some(source) = event
            .source_region_id
            .as_deref()
            .and_then(|id| topology.get(id))
        else {
            return skip(SkipReason::UnknownRegion);
        };

        if !source.relay_enabled {
            return skip(SkipReason::RegionDisabled);
        }

        if let Err(reason) =
            self.trigger_check(source, topology, &window.metrics, event.direction, config)
        {
            return skip(reason);
        }

        let edge = Self::relay_edge(source, event.direction);
        let Some(target) = topology
            .neighbor(&source.id, edge)
            .and_then(|id| topology.get(id))
        else {
            return skip(SkipReason::NoNeighbor);
        };
        if !target.relay_enabled {
            return skip(SkipReason::TargetDisabled);
        }

        let overlap = Self::resolve_overlap(&policy, source, config);
        let position = self.compute_target_position(
            event.direction,
            window.metrics.position,
            window.metrics.client_height,
            target.bounds.height,
            overlap,
        );

        tracing::debug!(
            "Hand-off {:?} ({} units) from '{}' to '{}' via {} edge at {} (overlap {})",
            event.direction,
            event.magnitude,
            source.id,
            target.id,
            edge,
            position,
            overlap
        );

        SyncCommand::handoff(event.window_id, target.id.clone(), position)
    }
}
