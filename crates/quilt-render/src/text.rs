use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

pub mod wrap;

pub use wrap::{wrap_text, wrap_text_measurer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Pixel measurement of rendered text. Layout never touches fonts directly.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    fn measure_width(&self, text: &str, style: &TextStyle) -> f64 {
        self.measure(text, style).width
    }
}

/// Font-free measurer: every display column is `font_size * char_width_factor` wide.
///
/// Display columns come from `unicode-width`, so wide CJK glyphs count twice.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let mut max_columns = 0usize;
        let mut line_count = 0usize;
        for line in text.split('\n') {
            max_columns = max_columns.max(UnicodeWidthStr::width(line));
            line_count += 1;
        }

        TextMetrics {
            width: max_columns as f64 * font_size * char_width_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}
