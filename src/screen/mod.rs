//! Screen management module
//!
//! Handles:
//! - Display region geometry and edges
//! - Splitting a display into pane regions
//! - Region adjacency (the display topology)

mod split;
mod topology;

pub use split::{pane_id, split_display, split_rects};
pub use topology::{DisplayRegion, DisplayTopology, RawDisplayDescriptor, RegionId, RegionSettings};

use serde::{Deserialize, Serialize};

/// Region edge identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Edge {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Get the opposite edge (for adjacency)
pub fn opposite_edge(edge: Edge) -> Edge {
    match edge {
        Edge::Left => Edge::Right,
        Edge::Right => Edge::Left,
        Edge::Top => Edge::Bottom,
        Edge::Bottom => Edge::Top,
    }
}

/// Whether a region is wider than it is tall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// How a display is divided into panes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    #[default]
    LeftRight,
    TopBottom,
    LeftCenterRight,
    TopCenterBottom,
    Custom,
}

/// An axis-aligned rectangle in virtual desktop coordinates.
///
/// `x`/`y` is the top-left corner and may be negative (displays left of or
/// above the primary one). Right and bottom are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// A rectangle with no area can never host a region
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the far edges fall outside the `i32` coordinate space
    pub fn overflows(&self) -> bool {
        self.x.checked_add(self.width).is_none() || self.y.checked_add(self.height).is_none()
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Area of the intersection with `other` (0 when disjoint)
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let w = i64::from(self.right().min(other.right())) - i64::from(self.left().max(other.left()));
        let h = i64::from(self.bottom().min(other.bottom())) - i64::from(self.top().max(other.top()));
        if w <= 0 || h <= 0 {
            0
        } else {
            w * h
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Length of the span `self` shares with `other` along `edge`, if the two
    /// rectangles touch exactly on that edge of `self`.
    ///
    /// A gap or an overlap of even one unit is not contact.
    pub fn shared_edge(&self, other: &Rect, edge: Edge) -> Option<i32> {
        let touches = match edge {
            Edge::Left => self.left() == other.right(),
            Edge::Right => self.right() == other.left(),
            Edge::Top => self.top() == other.bottom(),
            Edge::Bottom => self.bottom() == other.top(),
        };
        if !touches {
            return None;
        }

        let span = match edge {
            Edge::Left | Edge::Right => {
                self.bottom().min(other.bottom()).saturating_sub(self.top().max(other.top()))
            }
            Edge::Top | Edge::Bottom => {
                self.right().min(other.right()).saturating_sub(self.left().max(other.left()))
            }
        };

        (span > 0).then_some(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_edge_exact_contact() {
        let left = Rect::new(0, 0, 1000, 1000);
        let right = Rect::new(1000, 0, 1000, 1000);

        assert_eq!(left.shared_edge(&right, Edge::Right), Some(1000));
        assert_eq!(right.shared_edge(&left, Edge::Left), Some(1000));
        assert_eq!(left.shared_edge(&right, Edge::Left), None);
    }

    #[test]
    fn test_shared_edge_rejects_gap_and_overlap() {
        let left = Rect::new(0, 0, 1000, 1000);
        let gap = Rect::new(1001, 0, 1000, 1000);
        let overlap = Rect::new(999, 0, 1000, 1000);

        assert_eq!(left.shared_edge(&gap, Edge::Right), None);
        assert_eq!(left.shared_edge(&overlap, Edge::Right), None);
    }

    #[test]
    fn test_corner_contact_is_not_adjacency() {
        let a = Rect::new(0, 0, 100, 100);
        let diagonal = Rect::new(100, 100, 100, 100);

        assert_eq!(a.shared_edge(&diagonal, Edge::Right), None);
        assert_eq!(a.shared_edge(&diagonal, Edge::Bottom), None);
    }

    #[test]
    fn test_far_edge_overflow() {
        let wide = Rect::new(i32::MAX - 100, 0, 1000, 1000);

        assert!(wide.overflows());
        assert!(!Rect::new(-1920, 0, 1920, 1080).overflows());
        assert_eq!(wide.center(), (i32::MAX, 500));
    }

    #[test]
    fn test_orientation_and_opposites() {
        assert_eq!(Rect::new(0, 0, 1920, 1080).orientation(), Orientation::Horizontal);
        assert_eq!(Rect::new(0, 0, 960, 1080).orientation(), Orientation::Vertical);

        for edge in Edge::ALL {
            assert_eq!(opposite_edge(opposite_edge(edge)), edge);
            assert_ne!(opposite_edge(edge), edge);
        }
    }
}
