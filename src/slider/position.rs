use super::geometry::Rect;
use super::render::{compute_layout, Canvas, Drawable, SliderLayout, SliderStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Amount `increment` and `decrement` move the slider
pub const STEP: f64 = 0.1;

/// Axis the slider runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Callback invoked with every new slider position
pub type PositionListener = Box<dyn FnMut(f64) + Send>;

/// Touch-driven slider reporting a position in `[0.0, 1.0]`.
///
/// Vertical sliders grow upwards: a touch at the bottom edge is 0.0 and a
/// touch at the top edge is 1.0. Horizontal sliders grow to the right.
pub struct PositionSlider {
    orientation: Orientation,
    bounds: Rect,
    style: SliderStyle,
    position: f64,
    listener: Option<PositionListener>,
    redraw_pending: bool,
    redraw_requests: u64,
}

impl PositionSlider {
    /// Create a slider at position 0.0 with the default drawable style
    pub fn new(orientation: Orientation, bounds: Rect) -> Self {
        Self {
            orientation,
            bounds,
            style: SliderStyle::default(),
            position: 0.0,
            listener: None,
            redraw_pending: false,
            redraw_requests: 0,
        }
    }

    pub fn with_style(mut self, style: SliderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn style(&self) -> SliderStyle {
        self.style
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Replace the drawable bounds after a layout pass
    pub fn set_bounds(&mut self, bounds: Rect) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.invalidate();
        }
    }

    /// Register the single listener notified on position changes
    pub fn set_position_listener<F>(&mut self, listener: F)
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Move the slider, returning whether the position changed.
    ///
    /// The value is clamped to `[0.0, 1.0]`. A value equal to the current
    /// position (exact comparison) neither redraws nor notifies.
    pub fn set_position(&mut self, value: f64) -> bool {
        if value.is_nan() {
            debug!("Ignoring NaN slider position");
            return false;
        }

        let clamped = value.clamp(0.0, 1.0);
        if clamped == self.position {
            trace!("Slider already at {}", clamped);
            return false;
        }

        self.invalidate();
        self.position = clamped;

        if let Some(listener) = self.listener.as_mut() {
            listener(clamped);
        }

        true
    }

    pub fn increment(&mut self) -> bool {
        self.set_position(self.position + STEP)
    }

    pub fn decrement(&mut self) -> bool {
        self.set_position(self.position - STEP)
    }

    /// Project a touch point onto the slider axis and move there
    pub fn handle_touch(&mut self, x: f64, y: f64) -> bool {
        match self.fraction_at(x, y) {
            Some(fraction) => self.set_position(fraction),
            None => {
                debug!("Ignoring touch on slider with empty bounds {:?}", self.bounds);
                false
            }
        }
    }

    /// Fraction along the axis for a touch point, or `None` for zero-extent bounds
    pub fn fraction_at(&self, x: f64, y: f64) -> Option<f64> {
        let r = self.bounds;
        let raw = match self.orientation {
            Orientation::Vertical => {
                if r.height() <= 0 {
                    return None;
                }
                (r.bottom as f64 - y) / r.height() as f64
            }
            Orientation::Horizontal => {
                if r.width() <= 0 {
                    return None;
                }
                (x - r.left as f64) / r.width() as f64
            }
        };

        Some(raw.max(0.0).min(1.0))
    }

    /// Consume the pending redraw request, if any
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// Total redraws requested since construction
    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    /// Track and indicator placement for the current state
    pub fn layout(&self) -> SliderLayout {
        compute_layout(self.orientation, self.bounds, self.style, self.position)
    }

    /// Draw the track and indicator onto `canvas`
    pub fn render(&self, canvas: &mut dyn Canvas) -> SliderLayout {
        let layout = self.layout();
        canvas.draw(Drawable::Track, layout.track);
        canvas.draw(Drawable::Indicator, layout.indicator);
        layout
    }

    /// Preferred size: the indicator's thickness across the axis, everything available along it
    pub fn measure(&self, available: (u32, u32)) -> (u32, u32) {
        let (indicator_width, indicator_height) = self.style.indicator_size;
        match self.orientation {
            Orientation::Vertical => (indicator_width.max(0) as u32, available.1),
            Orientation::Horizontal => (available.0, indicator_height.max(0) as u32),
        }
    }

    fn invalidate(&mut self) {
        self.redraw_pending = true;
        self.redraw_requests += 1;
    }
}

impl std::fmt::Debug for PositionSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionSlider")
            .field("orientation", &self.orientation)
            .field("bounds", &self.bounds)
            .field("position", &self.position)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
