//! Display topology management
//!
//! Holds the set of display regions and derives which region lies on each
//! side of another. The whole set is replaced on every display change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{opposite_edge, Edge, Orientation, Rect, SplitType};

/// Region identifiers are opaque strings supplied by the host (or derived
/// from them for split panes).
pub type RegionId = String;

/// A display (or display pane) as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDisplayDescriptor {
    /// Unique region identifier
    pub id: RegionId,
    /// Full bounds in virtual desktop coordinates
    pub bounds: Rect,
    /// Usable area excluding taskbars/docks (defaults to `bounds`)
    #[serde(default)]
    pub working_area: Option<Rect>,
    /// Physical display this region belongs to, when it is a split pane
    #[serde(default)]
    pub display_id: Option<String>,
}

impl RawDisplayDescriptor {
    pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            working_area: None,
            display_id: None,
        }
    }

    pub fn working_area(&self) -> Rect {
        self.working_area.unwrap_or(self.bounds)
    }

    /// Identifier of the physical display (the region's own id when unsplit)
    pub fn display_id(&self) -> &str {
        self.display_id.as_deref().unwrap_or(&self.id)
    }
}

/// Per-region (or per-display) overrides that survive topology rebuilds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    pub split_type: Option<SplitType>,
    pub split_ratio: Option<f64>,
    pub overlap_height: Option<u32>,
    pub relay_enabled: Option<bool>,
    /// Explicit pane rectangles for a `Custom` split of a display
    pub custom_regions: Vec<Rect>,
}

impl RegionSettings {
    /// Field-wise merge: values set on `self` win over `fallback`
    fn or(&self, fallback: &RegionSettings) -> RegionSettings {
        RegionSettings {
            split_type: self.split_type.or(fallback.split_type),
            split_ratio: self.split_ratio.or(fallback.split_ratio),
            overlap_height: self.overlap_height.or(fallback.overlap_height),
            relay_enabled: self.relay_enabled.or(fallback.relay_enabled),
            custom_regions: if self.custom_regions.is_empty() {
                fallback.custom_regions.clone()
            } else {
                self.custom_regions.clone()
            },
        }
    }
}

/// A rectangular viewing area taking part in relay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRegion {
    pub id: RegionId,
    /// Physical display the region lives on
    pub display_id: String,
    pub bounds: Rect,
    pub working_area: Rect,
    pub orientation: Orientation,
    pub split_type: SplitType,
    pub split_ratio: f64,
    /// Overlap margin in scroll units; `None` inherits the global default
    pub overlap_height: Option<u32>,
    pub relay_enabled: bool,
    /// Neighboring regions by edge (derived, never hand-authored)
    pub neighbors: HashMap<Edge, RegionId>,
}

impl DisplayRegion {
    pub fn get_neighbor(&self, edge: Edge) -> Option<&RegionId> {
        self.neighbors.get(&edge)
    }

    /// Edge through which content continues when scrolling down.
    ///
    /// Side-by-side splits read left to right, stacked splits top to bottom.
    /// Custom panes follow the axis their neighbors are on, and their own
    /// orientation when neighbors sit on both axes or on neither.
    pub fn next_edge(&self) -> Edge {
        if self.relays_horizontally() {
            Edge::Right
        } else {
            Edge::Bottom
        }
    }

    /// Edge through which content continues when scrolling up
    pub fn previous_edge(&self) -> Edge {
        opposite_edge(self.next_edge())
    }

    fn relays_horizontally(&self) -> bool {
        match self.split_type {
            SplitType::LeftRight | SplitType::LeftCenterRight => true,
            SplitType::TopBottom | SplitType::TopCenterBottom => false,
            SplitType::Custom => {
                let has = |edge: Edge| self.neighbors.contains_key(&edge);
                let across = has(Edge::Left) || has(Edge::Right);
                let down = has(Edge::Top) || has(Edge::Bottom);
                match (across, down) {
                    (true, false) => true,
                    (false, true) => false,
                    _ => self.orientation == Orientation::Horizontal,
                }
            }
        }
    }
}

/// Manages the set of display regions and their adjacency
#[derive(Debug, Clone)]
pub struct DisplayTopology {
    /// All regions, keyed by id
    regions: HashMap<RegionId, DisplayRegion>,
    /// Region ids in the order the host reported them
    order: Vec<RegionId>,
    /// Overrides keyed by region id or physical display id
    settings: HashMap<String, RegionSettings>,
    default_split_type: SplitType,
    default_split_ratio: f64,
}

impl Default for DisplayTopology {
    fn default() -> Self {
        Self::new(SplitType::default(), 0.5)
    }
}

impl DisplayTopology {
    pub fn new(default_split_type: SplitType, default_split_ratio: f64) -> Self {
        Self {
            regions: HashMap::new(),
            order: Vec::new(),
            settings: HashMap::new(),
            default_split_type,
            default_split_ratio: sanitize_ratio(default_split_ratio).unwrap_or(0.5),
        }
    }

    /// Change the split defaults used for regions without overrides.
    ///
    /// Takes effect at the next rebuild.
    pub fn set_defaults(&mut self, split_type: SplitType, split_ratio: f64) {
        self.default_split_type = split_type;
        if let Some(ratio) = sanitize_ratio(split_ratio) {
            self.default_split_ratio = ratio;
        }
    }

    /// Replace the entire region set and recompute adjacency.
    ///
    /// Malformed descriptors are skipped; the rest of the batch is kept.
    /// Returns the number of regions now in the topology.
    pub fn rebuild<I>(&mut self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = RawDisplayDescriptor>,
    {
        self.regions.clear();
        self.order.clear();

        for descriptor in descriptors {
            if descriptor.id.trim().is_empty() {
                tracing::warn!("Ignoring display descriptor with empty id");
                continue;
            }
            if descriptor.bounds.is_empty() || descriptor.bounds.overflows() {
                tracing::warn!(
                    "Ignoring display '{}' with empty bounds {:?}",
                    descriptor.id,
                    descriptor.bounds
                );
                continue;
            }
            if self.regions.contains_key(&descriptor.id) {
                tracing::warn!("Ignoring duplicate display id '{}'", descriptor.id);
                continue;
            }

            let region = self.build_region(descriptor);
            self.order.push(region.id.clone());
            self.regions.insert(region.id.clone(), region);
        }

        self.compute_adjacency();

        tracing::debug!("Display topology rebuilt with {} region(s)", self.regions.len());
        self.regions.len()
    }

    fn build_region(&self, descriptor: RawDisplayDescriptor) -> DisplayRegion {
        let display_id = descriptor.display_id().to_string();
        let settings = self.settings_for(&descriptor.id, &display_id);

        DisplayRegion {
            orientation: descriptor.bounds.orientation(),
            working_area: descriptor.working_area(),
            bounds: descriptor.bounds,
            split_type: settings.split_type.unwrap_or(self.default_split_type),
            split_ratio: settings
                .split_ratio
                .and_then(sanitize_ratio)
                .unwrap_or(self.default_split_ratio),
            overlap_height: settings.overlap_height,
            relay_enabled: settings.relay_enabled.unwrap_or(true),
            neighbors: HashMap::new(),
            display_id,
            id: descriptor.id,
        }
    }

    /// Effective overrides for a region: its own settings first, then the
    /// settings of the display it belongs to.
    pub fn settings_for(&self, region_id: &str, display_id: &str) -> RegionSettings {
        let own = self.settings.get(region_id).cloned().unwrap_or_default();
        match self.settings.get(display_id) {
            Some(display) if display_id != region_id => own.or(display),
            _ => own,
        }
    }

    /// Store overrides for a region or a physical display.
    ///
    /// Applied immediately to matching live regions and again on every rebuild.
    pub fn configure(&mut self, id: &str, mut settings: RegionSettings) {
        if let Some(ratio) = settings.split_ratio {
            if sanitize_ratio(ratio).is_none() {
                tracing::warn!("Ignoring invalid split ratio {} for '{}'", ratio, id);
                settings.split_ratio = None;
            }
        }

        self.settings.insert(id.to_string(), settings);

        let affected: Vec<RawDisplayDescriptor> = self
            .order
            .iter()
            .filter_map(|rid| self.regions.get(rid))
            .map(|r| RawDisplayDescriptor {
                id: r.id.clone(),
                bounds: r.bounds,
                working_area: Some(r.working_area),
                display_id: Some(r.display_id.clone()),
            })
            .filter(|d| d.id == id || d.display_id() == id)
            .collect();

        for descriptor in affected {
            let rebuilt = self.build_region(descriptor);
            if let Some(region) = self.regions.get_mut(&rebuilt.id) {
                let neighbors = std::mem::take(&mut region.neighbors);
                *region = DisplayRegion { neighbors, ..rebuilt };
            }
        }
    }

    /// Recompute neighbors for every pair by exact boundary matching.
    ///
    /// Each edge holds at most one neighbor. Longer shared spans are paired
    /// first and a pair is only recorded when both opposing slots are free,
    /// which keeps adjacency symmetric.
    fn compute_adjacency(&mut self) {
        let mut candidates: Vec<(i32, usize, usize, Edge)> = Vec::new();

        for (i, a_id) in self.order.iter().enumerate() {
            for (j, b_id) in self.order.iter().enumerate().skip(i + 1) {
                let (Some(a), Some(b)) = (self.regions.get(a_id), self.regions.get(b_id)) else {
                    continue;
                };
                for edge in Edge::ALL {
                    if let Some(span) = a.bounds.shared_edge(&b.bounds, edge) {
                        candidates.push((span, i, j, edge));
                    }
                }
            }
        }

        // Longest span first, then stable by id
        candidates.sort_by(|x, y| {
            y.0.cmp(&x.0)
                .then_with(|| self.order[x.1].cmp(&self.order[y.1]))
                .then_with(|| self.order[x.2].cmp(&self.order[y.2]))
                .then_with(|| x.3.cmp(&y.3))
        });

        for region in self.regions.values_mut() {
            region.neighbors.clear();
        }

        for (_, i, j, edge) in candidates {
            let a_id = self.order[i].clone();
            let b_id = self.order[j].clone();
            let back = opposite_edge(edge);

            let a_free = self
                .regions
                .get(&a_id)
                .is_some_and(|a| a.get_neighbor(edge).is_none());
            let b_free = self
                .regions
                .get(&b_id)
                .is_some_and(|b| b.get_neighbor(back).is_none());
            if !(a_free && b_free) {
                continue;
            }

            if let Some(a) = self.regions.get_mut(&a_id) {
                a.neighbors.insert(edge, b_id.clone());
            }
            if let Some(b) = self.regions.get_mut(&b_id) {
                b.neighbors.insert(back, a_id);
            }
        }
    }

    /// Resolve the region a window is in.
    ///
    /// `host_region_id` is what the host reports as the window's containing
    /// display. When that display was split into panes the pane is chosen from
    /// the window bounds. Returns `None` for ids that no longer exist.
    pub fn region_of(&self, window_bounds: Option<&Rect>, host_region_id: &str) -> Option<RegionId> {
        if self.regions.contains_key(host_region_id) {
            return Some(host_region_id.to_string());
        }

        let panes: Vec<&DisplayRegion> = self
            .order
            .iter()
            .filter_map(|id| self.regions.get(id))
            .filter(|r| r.display_id == host_region_id)
            .collect();

        match (panes.as_slice(), window_bounds) {
            ([], _) => None,
            ([only], None) => Some(only.id.clone()),
            (_, None) => None,
            (panes, Some(bounds)) => {
                let (cx, cy) = bounds.center();
                panes
                    .iter()
                    .find(|r| r.bounds.contains_point(cx, cy))
                    .or_else(|| {
                        panes
                            .iter()
                            .filter(|r| r.bounds.intersection_area(bounds) > 0)
                            .max_by_key(|r| r.bounds.intersection_area(bounds))
                    })
                    .map(|r| r.id.clone())
            }
        }
    }

    /// Get the id of the neighbor of a region at a specific edge
    pub fn neighbor(&self, region_id: &str, edge: Edge) -> Option<&RegionId> {
        self.regions
            .get(region_id)
            .and_then(|r| r.get_neighbor(edge))
            .filter(|id| self.regions.contains_key(id.as_str()))
    }

    /// Get a region by id
    pub fn get(&self, region_id: &str) -> Option<&DisplayRegion> {
        self.regions.get(region_id)
    }

    /// All regions in host order
    pub fn regions(&self) -> impl Iterator<Item = &DisplayRegion> {
        self.order.iter().filter_map(|id| self.regions.get(id))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Split ratios must be finite and within 0.0..=1.0
pub(crate) fn sanitize_ratio(ratio: f64) -> Option<f64> {
    (ratio.is_finite() && (0.0..=1.0).contains(&ratio)).then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, x: i32, y: i32, w: i32, h: i32) -> RawDisplayDescriptor {
        RawDisplayDescriptor::new(id, Rect::new(x, y, w, h))
    }

    fn assert_symmetric(topology: &DisplayTopology) {
        for region in topology.regions() {
            for (edge, other) in &region.neighbors {
                assert_ne!(other, &region.id, "region is its own neighbor");
                assert_eq!(
                    topology.neighbor(other, opposite_edge(*edge)),
                    Some(&region.id),
                    "{} -> {} on {} is not mirrored",
                    region.id,
                    other,
                    edge
                );
            }
        }
    }

    #[test]
    fn test_side_by_side_adjacency() {
        let mut topology = DisplayTopology::default();
        let count = topology.rebuild(vec![
            descriptor("left", 0, 0, 1000, 1000),
            descriptor("right", 1000, 0, 1000, 1000),
        ]);

        assert_eq!(count, 2);
        assert_eq!(topology.neighbor("left", Edge::Right), Some(&"right".to_string()));
        assert_eq!(topology.neighbor("right", Edge::Left), Some(&"left".to_string()));
        assert_eq!(topology.neighbor("left", Edge::Left), None);
        assert_eq!(topology.neighbor("left", Edge::Bottom), None);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_grid_adjacency_is_symmetric() {
        let mut topology = DisplayTopology::default();
        topology.rebuild(vec![
            descriptor("a", 0, 0, 100, 100),
            descriptor("b", 100, 0, 100, 100),
            descriptor("c", 0, 100, 100, 100),
            descriptor("d", 100, 100, 100, 100),
            // Two stacked regions right of b/d, competing for b's right edge
            descriptor("e", 200, 0, 50, 60),
            descriptor("f", 200, 60, 50, 140),
        ]);

        assert_eq!(topology.neighbor("a", Edge::Bottom), Some(&"c".to_string()));
        assert_eq!(topology.neighbor("b", Edge::Left), Some(&"a".to_string()));
        assert_eq!(topology.neighbor("d", Edge::Top), Some(&"b".to_string()));
        // f shares 40 units with b and 100 with d; e shares 60 with b
        assert_eq!(topology.neighbor("b", Edge::Right), Some(&"e".to_string()));
        assert_eq!(topology.neighbor("d", Edge::Right), Some(&"f".to_string()));
        assert_symmetric(&topology);
    }

    #[test]
    fn test_near_miss_is_not_adjacent() {
        let mut topology = DisplayTopology::default();
        topology.rebuild(vec![
            descriptor("left", 0, 0, 1920, 1080),
            descriptor("right", 1921, 0, 1920, 1080),
        ]);

        assert_eq!(topology.neighbor("left", Edge::Right), None);
        assert_eq!(topology.neighbor("right", Edge::Left), None);
    }

    #[test]
    fn test_empty_rebuild_clears_everything() {
        let mut topology = DisplayTopology::default();
        topology.rebuild(vec![
            descriptor("left", 0, 0, 1000, 1000),
            descriptor("right", 1000, 0, 1000, 1000),
        ]);

        let count = topology.rebuild(Vec::new());

        assert_eq!(count, 0);
        assert!(topology.is_empty());
        assert_eq!(topology.region_of(None, "left"), None);
        assert_eq!(topology.neighbor("left", Edge::Right), None);
        assert!(topology.get("right").is_none());
    }

    #[test]
    fn test_malformed_descriptors_are_skipped() {
        let mut topology = DisplayTopology::default();
        let count = topology.rebuild(vec![
            descriptor("ok", 0, 0, 100, 100),
            descriptor("", 100, 0, 100, 100),
            descriptor("flat", 100, 0, 100, 0),
            descriptor("huge", i32::MAX - 10, 0, 100, 100),
            descriptor("ok", 200, 0, 100, 100),
        ]);

        assert_eq!(count, 1);
        assert_eq!(topology.get("ok").map(|r| r.bounds.x), Some(0));
    }

    #[test]
    fn test_region_of_resolves_split_panes() {
        let mut topology = DisplayTopology::default();
        let mut left = descriptor("DISPLAY1#0", 0, 0, 960, 1080);
        left.display_id = Some("DISPLAY1".to_string());
        let mut right = descriptor("DISPLAY1#1", 960, 0, 960, 1080);
        right.display_id = Some("DISPLAY1".to_string());
        topology.rebuild(vec![left, right]);

        let window = Rect::new(1000, 100, 800, 900);
        assert_eq!(
            topology.region_of(Some(&window), "DISPLAY1"),
            Some("DISPLAY1#1".to_string())
        );
        assert_eq!(
            topology.region_of(None, "DISPLAY1#0"),
            Some("DISPLAY1#0".to_string())
        );
        assert_eq!(topology.region_of(None, "DISPLAY1"), None);
        assert_eq!(topology.region_of(Some(&window), "DISPLAY2"), None);
    }

    #[test]
    fn test_settings_survive_rebuild() {
        let mut topology = DisplayTopology::default();
        topology.configure(
            "DISPLAY1",
            RegionSettings {
                split_type: Some(SplitType::TopBottom),
                overlap_height: Some(30),
                ..Default::default()
            },
        );
        topology.configure(
            "DISPLAY1#1",
            RegionSettings {
                relay_enabled: Some(false),
                overlap_height: Some(10),
                ..Default::default()
            },
        );

        let mut top = descriptor("DISPLAY1#0", 0, 0, 1920, 540);
        top.display_id = Some("DISPLAY1".to_string());
        let mut bottom = descriptor("DISPLAY1#1", 0, 540, 1920, 540);
        bottom.display_id = Some("DISPLAY1".to_string());
        topology.rebuild(vec![top, bottom]);

        let top = topology.get("DISPLAY1#0").unwrap();
        assert_eq!(top.split_type, SplitType::TopBottom);
        assert_eq!(top.overlap_height, Some(30));
        assert!(top.relay_enabled);
        assert_eq!(top.next_edge(), Edge::Bottom);

        let bottom = topology.get("DISPLAY1#1").unwrap();
        assert_eq!(bottom.overlap_height, Some(10));
        assert!(!bottom.relay_enabled);
        assert_eq!(bottom.previous_edge(), Edge::Top);
    }

    #[test]
    fn test_configure_updates_live_region_without_losing_neighbors() {
        let mut topology = DisplayTopology::default();
        topology.rebuild(vec![
            descriptor("left", 0, 0, 1000, 1000),
            descriptor("right", 1000, 0, 1000, 1000),
        ]);

        topology.configure(
            "left",
            RegionSettings {
                relay_enabled: Some(false),
                ..Default::default()
            },
        );

        let left = topology.get("left").unwrap();
        assert!(!left.relay_enabled);
        assert_eq!(left.get_neighbor(Edge::Right), Some(&"right".to_string()));
    }
}
