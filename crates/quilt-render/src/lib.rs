#![forbid(unsafe_code)]

//! Headless treemap layout and SVG rendering for quilt.
//!
//! [`layout_chart`] turns a [`Hierarchy`] into a [`model::ChartLayout`]; [`svg::render_chart_svg`]
//! draws it with a [`RenderState`].

pub mod hover;
pub mod legend;
pub mod model;
pub mod number;
pub mod scale;
pub mod state;
pub mod svg;
pub mod text;
pub mod treemap;

pub use state::RenderState;

use crate::legend::{LegendOptions, layout_legend};
use crate::model::{
    ChartLayout, LabelLayout, Margin, SectionLayout, TileLayout, TitleLayout,
};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle, wrap_text_measurer};
use crate::treemap::{ChildOrder, Treemap};
use quilt_core::Hierarchy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid chart geometry: {message}")]
    InvalidGeometry { message: String },
    #[error(transparent)]
    Core(#[from] quilt_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fixed chart geometry and typography.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub title_x: f64,
    pub title_y: f64,
    pub title_font_size: f64,
    pub label_dx: f64,
    pub label_dy: f64,
    pub label_font_size: f64,
    pub label_max_width: f64,
    pub label_line_height_em: f64,
    pub order: ChildOrder,
    pub legend: LegendOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 720.0,
            margin: Margin::default(),
            title_x: 150.0,
            title_y: -15.0,
            title_font_size: 25.0,
            label_dx: 3.0,
            label_dy: 10.0,
            label_font_size: 8.0,
            label_max_width: 50.0,
            label_line_height_em: 1.1,
            order: ChildOrder::default(),
            legend: LegendOptions::default(),
        }
    }
}

impl ChartOptions {
    pub fn plot_size(&self) -> (f64, f64) {
        (
            self.width - self.margin.left - self.margin.right,
            self.height - self.margin.top - self.margin.bottom,
        )
    }
}

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub chart: ChartOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            chart: ChartOptions::default(),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("chart", &self.chart)
            .finish_non_exhaustive()
    }
}

/// Lays out the treemap, wraps tile labels and places the title and legend.
#[tracing::instrument(level = "debug", skip_all, fields(title = hierarchy.title()))]
pub fn layout_chart(hierarchy: &mut Hierarchy, options: &LayoutOptions) -> Result<ChartLayout> {
    let chart = &options.chart;
    let (plot_width, plot_height) = chart.plot_size();
    if !(plot_width.is_finite() && plot_height.is_finite() && plot_width >= 0.0 && plot_height >= 0.0)
    {
        return Err(Error::InvalidGeometry {
            message: format!(
                "margins leave no plot area in a {}x{} chart",
                chart.width, chart.height
            ),
        });
    }

    Treemap::new(plot_width, plot_height)
        .order(chart.order)
        .layout(hierarchy)?;

    let label_style = TextStyle::sized(chart.label_font_size);
    let measurer = options.text_measurer.as_ref();

    let mut sections = Vec::new();
    let mut tiles = Vec::new();
    for id in hierarchy.each_before() {
        let node = hierarchy.node(id);
        let rect = node.rect.unwrap_or_default();
        if !node.is_leaf() {
            sections.push(SectionLayout {
                node: id,
                name: node.name.clone(),
                depth: node.depth,
                value: node.value,
                rect,
            });
            continue;
        }
        let lines = wrap_text_measurer(&node.name, chart.label_max_width, measurer, &label_style);
        tiles.push(TileLayout {
            node: id,
            name: node.name.clone(),
            category: hierarchy.category_of(id).unwrap_or_default().to_string(),
            value: node.value,
            rect,
            label: LabelLayout {
                x: rect.x0 + chart.label_dx,
                y: rect.y0 + chart.label_dy,
                font_size: chart.label_font_size,
                line_height_em: chart.label_line_height_em,
                lines,
            },
        });
    }

    // Legend entries follow the console groups; parents deeper in the tree are appended.
    let mut categories = hierarchy
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    for tile in &tiles {
        if !tile.category.is_empty() && !categories.contains(&tile.category) {
            categories.push(tile.category.clone());
        }
    }
    if hierarchy.root().is_leaf() {
        categories.clear();
    }
    let legend = layout_legend(categories, &chart.legend);

    tracing::debug!(
        tiles = tiles.len(),
        sections = sections.len(),
        legend_items = legend.items.len(),
        "chart laid out"
    );

    Ok(ChartLayout {
        width: chart.width,
        height: chart.height,
        margin: chart.margin,
        plot_width,
        plot_height,
        title: TitleLayout {
            text: hierarchy.title().to_string(),
            x: chart.title_x,
            y: chart.title_y,
            font_size: chart.title_font_size,
        },
        sections,
        tiles,
        legend,
    })
}
