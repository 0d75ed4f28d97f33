use crate::model::{LegendItemLayout, LegendLayout};
use serde::{Deserialize, Serialize};

/// Legend grid placement, in chart (margin-translated) coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendOptions {
    pub x: f64,
    pub y: f64,
    pub columns: usize,
    pub column_width: f64,
    pub row_height: f64,
    pub row_gap: f64,
    pub swatch_size: f64,
    pub label_dx: f64,
    pub label_dy: f64,
    pub font_size: f64,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            x: 60.0,
            y: 625.0,
            columns: 9,
            column_width: 70.0,
            row_height: 18.0,
            row_gap: 5.0,
            swatch_size: 12.0,
            label_dx: 15.0,
            label_dy: 10.0,
            font_size: 12.0,
        }
    }
}

/// Lays `categories` out row-major, `columns` per row.
pub fn layout_legend<I, S>(categories: I, options: &LegendOptions) -> LegendLayout
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns = options.columns.max(1);
    let items = categories
        .into_iter()
        .enumerate()
        .map(|(i, category)| {
            let col = i % columns;
            let row = i / columns;
            LegendItemLayout {
                category: category.into(),
                x: col as f64 * options.column_width,
                y: row as f64 * (options.row_height + options.row_gap),
                swatch_size: options.swatch_size,
                label_x: options.label_dx,
                label_y: options.label_dy,
            }
        })
        .collect();

    LegendLayout {
        x: options.x,
        y: options.y,
        font_size: options.font_size,
        items,
    }
}
