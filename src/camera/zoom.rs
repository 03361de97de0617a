use serde::{Deserialize, Serialize};

/// Zoom range a camera reports; levels run from 0 to `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoomCapability {
    pub supported: bool,
    pub max: u32,
}

impl ZoomCapability {
    pub fn new(max: u32) -> Self {
        Self {
            supported: true,
            max,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            max: 0,
        }
    }

    /// Hardware level for a normalized slider value, truncated toward zero.
    /// `None` when the camera cannot zoom.
    pub fn level_for(&self, value: f64) -> Option<u32> {
        if !self.supported {
            return None;
        }
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        Some((value * self.max as f64) as u32)
    }
}
