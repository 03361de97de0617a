use super::geometry::Rect;
use super::position::Orientation;
use crate::config::SliderConfig;

/// Gap between each end of the widget and the end of the track
pub const TRACK_INSET: i32 = 10;

/// Length of the axis the indicator center never enters, split between both ends
pub const INDICATOR_MARGIN: i32 = 48;

/// Half-thickness used when the track drawable reports no intrinsic size
const DEFAULT_TRACK_HALF_THICKNESS: i32 = 5;

/// Intrinsic sizes of the slider's drawables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderStyle {
    pub indicator_size: (i32, i32),
    pub track_thickness: i32,
}

impl Default for SliderStyle {
    fn default() -> Self {
        Self {
            indicator_size: (48, 48),
            track_thickness: 10,
        }
    }
}

impl SliderStyle {
    pub fn from_config(config: &SliderConfig) -> Self {
        Self {
            indicator_size: (
                config.indicator_size.0 as i32,
                config.indicator_size.1 as i32,
            ),
            track_thickness: config.track_thickness as i32,
        }
    }

    fn track_half_thickness(&self) -> i32 {
        match self.track_thickness / 2 {
            0 => DEFAULT_TRACK_HALF_THICKNESS,
            half => half,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawable {
    Track,
    Indicator,
}

/// Drawing surface supplied by the host toolkit
pub trait Canvas {
    fn draw(&mut self, drawable: Drawable, bounds: Rect);
}

/// Where the track and indicator land for a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderLayout {
    pub track: Rect,
    pub indicator: Rect,
}

pub fn compute_layout(
    orientation: Orientation,
    bounds: Rect,
    style: SliderStyle,
    position: f64,
) -> SliderLayout {
    let (indicator_width, indicator_height) = style.indicator_size;
    let half = style.track_half_thickness();

    match orientation {
        Orientation::Vertical => {
            let line_x = bounds.center_x();
            let track = Rect::new(
                line_x - half,
                bounds.top + TRACK_INSET,
                line_x + half,
                bounds.bottom - TRACK_INSET,
            );
            let travel = (bounds.height() - INDICATOR_MARGIN) as f64;
            let indicator_y =
                (bounds.bottom as f64 - travel * position) as i32 - INDICATOR_MARGIN / 2;
            SliderLayout {
                track,
                indicator: Rect::centered_at(line_x, indicator_y, indicator_width, indicator_height),
            }
        }
        Orientation::Horizontal => {
            let line_y = bounds.center_y();
            let track = Rect::new(
                bounds.left + TRACK_INSET,
                line_y - half,
                bounds.right - TRACK_INSET,
                line_y + half,
            );
            let travel = (bounds.width() - INDICATOR_MARGIN) as f64;
            let indicator_x = (travel * position) as i32 + bounds.left + INDICATOR_MARGIN / 2;
            SliderLayout {
                track,
                indicator: Rect::centered_at(indicator_x, line_y, indicator_width, indicator_height),
            }
        }
    }
}

/// Canvas that records draw calls in order
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<(Drawable, Rect)>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for RecordingCanvas {
    fn draw(&mut self, drawable: Drawable, bounds: Rect) {
        self.calls.push((drawable, bounds));
    }
}

/// Character-cell canvas for terminals; each cell covers `cell_size` pixels square
#[derive(Debug, Clone)]
pub struct TextCanvas {
    columns: usize,
    rows: usize,
    cell_size: i32,
    cells: Vec<char>,
}

impl TextCanvas {
    pub fn new(columns: usize, rows: usize, cell_size: i32) -> Self {
        Self {
            columns,
            rows,
            cell_size: cell_size.max(1),
            cells: vec![' '; columns * rows],
        }
    }

    /// Canvas just large enough to hold `bounds`
    pub fn for_bounds(bounds: Rect, cell_size: i32) -> Self {
        let cell_size = cell_size.max(1);
        let columns = (bounds.right.max(0) + cell_size - 1) / cell_size;
        let rows = (bounds.bottom.max(0) + cell_size - 1) / cell_size;
        Self::new(columns as usize, rows as usize, cell_size)
    }

    pub fn lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.columns.max(1))
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }

    fn glyph(drawable: Drawable) -> char {
        match drawable {
            Drawable::Track => ':',
            Drawable::Indicator => '#',
        }
    }
}

impl Canvas for TextCanvas {
    fn draw(&mut self, drawable: Drawable, bounds: Rect) {
        if self.columns == 0 || self.rows == 0 {
            return;
        }

        let first_col = (bounds.left / self.cell_size).max(0) as usize;
        let first_row = (bounds.top / self.cell_size).max(0) as usize;
        let last_col = ((bounds.right - 1) / self.cell_size).min(self.columns as i32 - 1);
        let last_row = ((bounds.bottom - 1) / self.cell_size).min(self.rows as i32 - 1);
        if last_col < 0 || last_row < 0 {
            return;
        }

        let glyph = Self::glyph(drawable);
        for row in first_row..=last_row as usize {
            for col in first_col..=last_col as usize {
                self.cells[row * self.columns + col] = glyph;
            }
        }
    }
}
