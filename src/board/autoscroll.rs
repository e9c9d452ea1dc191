use std::time::Duration;

use egui::{Pos2, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutoScrollOptions {
    pub enabled: bool,

    /// Distance from a container edge (in points) where scrolling kicks in.
    pub edge_band: f32,

    /// Scroll speed (points/s) with the pointer at or past the edge.
    pub max_speed: f32,
}

impl Default for AutoScrollOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            edge_band: 48.0,
            max_speed: 1200.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    /// The board, scrolling between columns.
    Horizontal,

    /// A column, scrolling its items.
    Vertical,
}

/// Scrolls a container while the pointer hovers near one of its edges, faster the deeper the
/// pointer is into the edge band.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoScroller {
    options: AutoScrollOptions,
}

impl AutoScroller {
    pub fn new(options: AutoScrollOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AutoScrollOptions {
        &self.options
    }

    /// Content scroll delta for this frame. Negative scrolls toward the start.
    ///
    /// Zero unless the pointer is within the container's extent on the other axis.
    pub fn delta(&self, container: Rect, touch: Pos2, axis: ScrollAxis, dt: Duration) -> Vec2 {
        let band = self.options.edge_band;
        if !self.options.enabled || band <= 0.0 || dt.is_zero() {
            return Vec2::ZERO;
        }
        let (along, start, end, across, across_range) = match axis {
            ScrollAxis::Horizontal => (
                touch.x,
                container.min.x,
                container.max.x,
                touch.y,
                container.y_range(),
            ),
            ScrollAxis::Vertical => (
                touch.y,
                container.min.y,
                container.max.y,
                touch.x,
                container.x_range(),
            ),
        };
        if !across_range.contains(across) {
            return Vec2::ZERO;
        }

        let depth = |distance: f32| (1.0 - distance / band).clamp(0.0, 1.0);
        let from_start = depth(along - start);
        let from_end = depth(end - along);
        let direction = if from_start > 0.0 && from_start >= from_end {
            -from_start
        } else {
            from_end
        };
        if direction == 0.0 {
            return Vec2::ZERO;
        }

        let amount = direction * self.options.max_speed * dt.as_secs_f32();
        match axis {
            ScrollAxis::Horizontal => Vec2::new(amount, 0.0),
            ScrollAxis::Vertical => Vec2::new(0.0, amount),
        }
    }
}
