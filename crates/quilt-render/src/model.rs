use quilt_core::{LayoutRect, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 30.0,
            bottom: 80.0,
            left: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleLayout {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Wrapped tile caption. `y` is the first baseline; line `i` sits `i * line_height_em` below it.
#[derive(Debug, Clone, Serialize)]
pub struct LabelLayout {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub line_height_em: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileLayout {
    pub node: NodeId,
    pub name: String,
    /// Parent name; drives the fill color and the tooltip console.
    pub category: String,
    pub value: f64,
    pub rect: LayoutRect,
    pub label: LabelLayout,
}

/// Internal node rectangle (the console groups and the root).
#[derive(Debug, Clone, Serialize)]
pub struct SectionLayout {
    pub node: NodeId,
    pub name: String,
    pub depth: usize,
    pub value: f64,
    pub rect: LayoutRect,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendItemLayout {
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub swatch_size: f64,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendLayout {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub items: Vec<LegendItemLayout>,
}

/// Everything needed to draw one chart. Tile and section coordinates are relative to the
/// margin-translated plot area.
#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub plot_width: f64,
    pub plot_height: f64,
    pub title: TitleLayout,
    pub sections: Vec<SectionLayout>,
    pub tiles: Vec<TileLayout>,
    pub legend: LegendLayout,
}

impl ChartLayout {
    /// Topmost tile under a plot-space point. Tiles drawn later win; empty tiles never match.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&TileLayout> {
        self.tiles
            .iter()
            .rev()
            .find(|t| !t.rect.is_empty() && t.rect.contains(x, y))
    }

    pub fn tile(&self, node: NodeId) -> Option<&TileLayout> {
        self.tiles.iter().find(|t| t.node == node)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.legend.items.iter().map(|i| i.category.as_str())
    }
}
