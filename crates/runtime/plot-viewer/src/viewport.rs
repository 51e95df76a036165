//! Zoom controller

use serde::Serialize;
use std::fmt;

/// Uniform map scale, always within `[MIN, MAX]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Zoom(f64);

impl Zoom {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 3.0;
    pub const STEP: f64 = 0.25;
    pub const RESET: f64 = 1.0;

    pub fn new(level: f64) -> Self {
        if level.is_nan() {
            return Self(Self::RESET);
        }
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn level(&self) -> f64 {
        self.0
    }

    pub fn zoom_in(&mut self) {
        *self = Self::new(self.0 + Self::STEP);
    }

    pub fn zoom_out(&mut self) {
        *self = Self::new(self.0 - Self::STEP);
    }

    pub fn reset(&mut self) {
        self.0 = Self::RESET;
    }

    pub fn can_zoom_in(&self) -> bool {
        self.0 < Self::MAX
    }

    pub fn can_zoom_out(&self) -> bool {
        self.0 > Self::MIN
    }

    /// Inline style shared by the normal and fullscreen containers.
    /// Each container scrolls on its own; only the scale is shared.
    pub fn css(&self) -> String {
        format!("transform: scale({}); transform-origin: top left;", self.0)
    }

    pub fn percent(&self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(Self::RESET)
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
