//! Easing curves and the opacity tween behind the fade wrappers.

use keyframe::{ease, functions};

/// Named easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseType {
    /// CSS `ease-in-out`, used by the fade wrappers
    EaseInOut,
    /// Cubic slow-in slow-out; drives the shape compression cycle
    CubicInOut,
}

impl EaseType {
    /// Map `t` (clamped to 0..=1) through the curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = (t as f64).clamp(0.0, 1.0);
        let eased = match self {
            EaseType::EaseInOut => ease(functions::EaseInOut, 0.0, 1.0, t),
            EaseType::CubicInOut => ease(functions::EaseInOutCubic, 0.0, 1.0, t),
        };
        eased as f32
    }
}

/// A scalar easing from one value to another over a fixed duration.
#[derive(Debug, Clone)]
pub struct AnimatedValue {
    from: f32,
    to: f32,
    current: f32,
    /// Seconds into the running transition
    clock: f32,
    /// Seconds the transition lasts; 0 means settled
    duration: f32,
    easing: EaseType,
}

impl AnimatedValue {
    pub fn new(initial: f32) -> Self {
        Self {
            from: initial,
            to: initial,
            current: initial,
            clock: 0.0,
            duration: 0.0,
            easing: EaseType::EaseInOut,
        }
    }

    /// Begin a transition from wherever the value is now.
    pub fn animate_to(&mut self, to: f32, duration: f32, easing: EaseType) {
        self.from = self.current;
        self.to = to;
        self.clock = 0.0;
        self.duration = duration.max(0.0);
        self.easing = easing;
    }

    /// Jump to `value`, cancelling any transition.
    pub fn set_immediate(&mut self, value: f32) {
        self.from = value;
        self.to = value;
        self.current = value;
        self.clock = 0.0;
        self.duration = 0.0;
    }

    /// Advance by `dt` seconds; `false` once the value has settled.
    pub fn update(&mut self, dt: f32) -> bool {
        self.clock += dt;
        if self.duration <= 0.0 || self.clock >= self.duration {
            self.current = self.to;
            self.clock = self.duration;
            return false;
        }

        let eased = self.easing.apply(self.clock / self.duration);
        self.current = self.from + (self.to - self.from) * eased;
        true
    }

    pub fn value(&self) -> f32 {
        self.current
    }
}
