//! Damped spring (unit mass) used for the drag settle and the overscroll bounce.
//!
//! Integrated with semi-implicit Euler, subdividing large frame deltas so high stiffness stays
//! stable.

use std::time::Duration;

/// Max integration step.
const MAX_STEP_SECS: f32 = 0.004;

/// Spring tuning, expressed the way designers talk about it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SpringParams {
    /// 1.0 is critical damping, below that the spring overshoots.
    pub damping_ratio: f32,

    /// Restoring force per point of displacement.
    pub stiffness: f32,
}

impl Default for SpringParams {
    /// A quick settle: ratio 0.6, stiffness 1000.
    fn default() -> Self {
        Self {
            damping_ratio: 0.6,
            stiffness: 1000.0,
        }
    }
}

impl SpringParams {
    /// Damping coefficient `c = 2ζ√k`.
    pub fn damping(&self) -> f32 {
        2.0 * self.damping_ratio.max(0.0) * self.stiffness.max(0.1).sqrt()
    }
}

/// A one-dimensional spring.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    position: f32,
    velocity: f32,
    target: f32,
    params: SpringParams,
    rest_distance: f32,
    rest_speed: f32,
    at_rest: bool,
}

impl Spring {
    pub fn new(position: f32, target: f32, params: SpringParams) -> Self {
        Self {
            position,
            velocity: 0.0,
            target,
            params,
            rest_distance: 0.5,
            rest_speed: 5.0,
            at_rest: false,
        }
    }

    /// Position delta (points) and speed (points/s) below which the spring stops.
    pub fn with_rest_thresholds(mut self, distance: f32, speed: f32) -> Self {
        self.rest_distance = distance.abs();
        self.rest_speed = speed.abs();
        self
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    pub fn set_target(&mut self, target: f32) {
        if self.target != target {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Displace the spring without touching its velocity.
    pub fn nudge(&mut self, delta: f32) {
        self.position += delta;
        self.at_rest = false;
    }

    pub fn impulse(&mut self, velocity_delta: f32) {
        self.velocity += velocity_delta;
        self.at_rest = false;
    }

    pub fn snap_to_target(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    fn step(&mut self, dt: f32) {
        let displacement = self.position - self.target;
        let acceleration =
            -self.params.stiffness * displacement - self.params.damping() * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f32();
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP_SECS);
            self.step(step);
            remaining -= step;
        }
        if (self.position - self.target).abs() < self.rest_distance
            && self.velocity.abs() < self.rest_speed
        {
            self.snap_to_target();
        }
    }
}
