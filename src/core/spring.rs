//! # Return Springs
//!
//! Damped spring used to return a bubble's swipe offset (or reveal
//! progress) to neutral after release. It owns no clock: the caller steps
//! it with the frame delta, so tests can drive it with fixed timesteps.

use std::time::Duration;

/// Largest integration step. Longer frames are split to keep the
/// semi-implicit Euler integration stable at high stiffness.
const MAX_STEP_SECS: f32 = 1.0 / 240.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    pub stiffness: f32,
    /// < 1.0 bounces past the target, 1.0 is critically damped.
    pub damping_ratio: f32,
    /// Distance and speed under which the spring snaps to rest.
    pub visibility_threshold: f32,
}

impl SpringSpec {
    pub const fn new(stiffness: f32, damping_ratio: f32, visibility_threshold: f32) -> Self {
        Self {
            stiffness,
            damping_ratio,
            visibility_threshold,
        }
    }
}

pub const DEFAULT_STIFFNESS: f32 = 400.0;
pub const DEFAULT_REPLY_DAMPING_RATIO: f32 = 0.5;
pub const DEFAULT_REVEAL_DAMPING_RATIO: f32 = 1.0;

/// Springs for the two swipe values. The reply offset is in pixels and
/// bounces; reveal progress is a 0..1 fraction and must not overshoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub reply: SpringSpec,
    pub reveal: SpringSpec,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_STIFFNESS,
            DEFAULT_REPLY_DAMPING_RATIO,
            DEFAULT_REVEAL_DAMPING_RATIO,
        )
    }
}

impl SpringConfig {
    pub fn new(stiffness: f32, reply_damping_ratio: f32, reveal_damping_ratio: f32) -> Self {
        Self {
            reply: SpringSpec::new(stiffness, reply_damping_ratio, 0.5),
            reveal: SpringSpec::new(stiffness, reveal_damping_ratio, 0.001),
        }
    }
}

/// A value that either follows direct input or springs back to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    spec: SpringSpec,
    value: f32,
    velocity: f32,
    running: bool,
}

impl Spring {
    pub fn new(spec: SpringSpec) -> Self {
        Self {
            spec,
            value: 0.0,
            velocity: 0.0,
            running: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Direct manipulation. Stops any animation in flight.
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.velocity = 0.0;
        self.running = false;
    }

    /// Starts animating from the current value towards zero.
    pub fn release(&mut self) {
        if self.value == 0.0 {
            self.snap_to(0.0);
            return;
        }
        self.running = true;
    }

    /// Advances the animation by `dt`. Returns `true` while still moving.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }

        let mut remaining = dt.as_secs_f32();
        let omega = self.spec.stiffness.max(0.0).sqrt();
        let damping = 2.0 * self.spec.damping_ratio * omega;

        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP_SECS);
            let accel = -self.spec.stiffness * self.value - damping * self.velocity;
            self.velocity += accel * step;
            self.value += self.velocity * step;
            remaining -= step;

            if self.at_rest() {
                self.snap_to(0.0);
                return false;
            }
        }
        true
    }

    fn at_rest(&self) -> bool {
        let threshold = self.spec.visibility_threshold;
        self.value.abs() < threshold && self.velocity.abs() < threshold * 10.0
    }
}
