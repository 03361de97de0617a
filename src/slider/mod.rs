mod geometry;
mod position;
mod render;
#[cfg(test)]
mod tests;

pub use geometry::Rect;
pub use position::{Orientation, PositionListener, PositionSlider, STEP};
pub use render::{
    compute_layout, Canvas, Drawable, RecordingCanvas, SliderLayout, SliderStyle, TextCanvas,
    INDICATOR_MARGIN, TRACK_INSET,
};
