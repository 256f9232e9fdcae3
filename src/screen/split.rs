//! Split-screen geometry
//!
//! Divides a display into pane regions. Panes produced here abut exactly, so
//! the topology's exact-contact adjacency always links them.

use super::{RawDisplayDescriptor, Rect, SplitType};

/// Id given to the `index`-th pane of a split display
pub fn pane_id(display_id: &str, index: usize) -> String {
    format!("{}#{}", display_id, index)
}

/// Compute pane rectangles for a display.
///
/// `ratio` is the share of the first pane for two-way splits; three-way
/// splits use equal thirds. `custom` rectangles are clipped to the display
/// and only used for `SplitType::Custom`. Always returns at least one pane.
pub fn split_rects(bounds: Rect, split_type: SplitType, ratio: f64, custom: &[Rect]) -> Vec<Rect> {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.5 };

    let panes = match split_type {
        SplitType::LeftRight => {
            let first = (f64::from(bounds.width) * ratio).round() as i32;
            vec![
                Rect::new(bounds.x, bounds.y, first, bounds.height),
                Rect::new(bounds.x.saturating_add(first), bounds.y, bounds.width - first, bounds.height),
            ]
        }
        SplitType::TopBottom => {
            let first = (f64::from(bounds.height) * ratio).round() as i32;
            vec![
                Rect::new(bounds.x, bounds.y, bounds.width, first),
                Rect::new(bounds.x, bounds.y.saturating_add(first), bounds.width, bounds.height - first),
            ]
        }
        SplitType::LeftCenterRight => {
            let third = bounds.width / 3;
            vec![
                Rect::new(bounds.x, bounds.y, third, bounds.height),
                Rect::new(bounds.x.saturating_add(third), bounds.y, third, bounds.height),
                Rect::new(bounds.x.saturating_add(2 * third), bounds.y, bounds.width - 2 * third, bounds.height),
            ]
        }
        SplitType::TopCenterBottom => {
            let third = bounds.height / 3;
            vec![
                Rect::new(bounds.x, bounds.y, bounds.width, third),
                Rect::new(bounds.x, bounds.y.saturating_add(third), bounds.width, third),
                Rect::new(bounds.x, bounds.y.saturating_add(2 * third), bounds.width, bounds.height - 2 * third),
            ]
        }
        SplitType::Custom => custom.iter().filter_map(|r| clip(r, &bounds)).collect(),
    };

    let panes: Vec<Rect> = panes.into_iter().filter(|r| !r.is_empty()).collect();
    if panes.is_empty() {
        vec![bounds]
    } else {
        panes
    }
}

/// Split a host display into pane descriptors.
///
/// A split that yields a single pane returns the display unchanged so its
/// id keeps matching what the host reports.
pub fn split_display(
    display: &RawDisplayDescriptor,
    split_type: SplitType,
    ratio: f64,
    custom: &[Rect],
) -> Vec<RawDisplayDescriptor> {
    let rects = split_rects(display.bounds, split_type, ratio, custom);
    if rects.len() == 1 && rects[0] == display.bounds {
        return vec![display.clone()];
    }

    let display_id = display.display_id().to_string();
    let working_area = display.working_area();

    rects
        .into_iter()
        .enumerate()
        .map(|(index, bounds)| RawDisplayDescriptor {
            id: pane_id(&display_id, index),
            bounds,
            working_area: clip(&working_area, &bounds).or(Some(bounds)),
            display_id: Some(display_id.clone()),
        })
        .collect()
}

fn clip(rect: &Rect, within: &Rect) -> Option<Rect> {
    let left = rect.left().max(within.left());
    let top = rect.top().max(within.top());
    let right = rect.right().min(within.right());
    let bottom = rect.bottom().min(within.bottom());
    let clipped = Rect::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top));
    (!clipped.is_empty()).then_some(clipped)
}
