//! Bounded bounce at the ends of a scrolling list.
//!
//! A decorator the list views consume on their own: the drag engine never reads it.

use std::time::Duration;

use crate::spring::{Spring, SpringParams};

/// Turns a fling or a pull past a scroll boundary into a bounce offset that stays within
/// `±max_offset`, then springs back to zero.
#[derive(Clone, Copy, Debug)]
pub struct Overscroll {
    max_offset: f32,
    velocity_scale: f32,
    params: SpringParams,
    spring: Spring,

    /// Unbounded pull distance while the user is dragging past the edge.
    pulled: Option<f32>,
}

impl Default for Overscroll {
    fn default() -> Self {
        Self::new(64.0, 4000.0)
    }
}

impl Overscroll {
    /// `max_offset` in points. `velocity_scale` in points/s: a fling this fast reaches ~76% of
    /// `max_offset`.
    pub fn new(max_offset: f32, velocity_scale: f32) -> Self {
        let params = SpringParams {
            damping_ratio: 1.0,
            ..SpringParams::default()
        };
        Self {
            max_offset: max_offset.abs().max(f32::EPSILON),
            velocity_scale: velocity_scale.abs().max(f32::EPSILON),
            params,
            spring: Spring::new(0.0, 0.0, params),
            pulled: None,
        }
    }

    pub fn with_spring(mut self, params: SpringParams) -> Self {
        self.params = params;
        self.spring = Spring::new(self.spring.position(), 0.0, params);
        self
    }

    pub fn max_offset(&self) -> f32 {
        self.max_offset
    }

    /// Current bounce offset, always within `±max_offset`.
    pub fn offset(&self) -> f32 {
        let offset = match self.pulled {
            Some(pulled) => self.rubber_band(pulled),
            None => self.spring.position(),
        };
        offset.clamp(-self.max_offset, self.max_offset)
    }

    pub fn is_settled(&self) -> bool {
        self.pulled.is_none() && self.spring.is_at_rest() && self.spring.position() == 0.0
    }

    /// A fling hit the boundary at `velocity` points/s.
    pub fn absorb(&mut self, velocity: f32) {
        let peak = self.max_offset * (velocity / self.velocity_scale).tanh();
        self.pulled = None;
        self.spring = Spring::new(peak, 0.0, self.params);
        log::trace!("overscroll: absorbed {velocity:.0} pt/s as {peak:.1} pt");
    }

    /// The user dragged `delta` points past the boundary.
    pub fn pull(&mut self, delta: f32) {
        let pulled = self.pulled.unwrap_or_else(|| self.spring.position()) + delta;
        self.pulled = Some(pulled);
    }

    /// The user let go: spring back from wherever the pull left the content.
    pub fn release(&mut self) {
        if self.pulled.take().is_some() {
            let from = self.offset();
            self.spring = Spring::new(from, 0.0, self.params);
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        if self.pulled.is_none() {
            self.spring.advance(dt);
        }
    }

    fn rubber_band(&self, raw: f32) -> f32 {
        self.max_offset * (raw / self.max_offset).tanh()
    }
}
