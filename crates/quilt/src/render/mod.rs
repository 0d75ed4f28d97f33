pub use quilt_render::model::ChartLayout;
pub use quilt_render::svg::{SvgRenderOptions, render_error_svg};
pub use quilt_render::text::{DeterministicTextMeasurer, TextMeasurer};
pub use quilt_render::treemap;
pub use quilt_render::{ChartOptions, LayoutOptions, RenderState, layout_chart};

#[cfg(feature = "raster")]
pub mod raster;

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Dataset(#[from] quilt_core::Error),
    #[error(transparent)]
    Render(#[from] quilt_render::Error),
}

pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Builds the hierarchy and lays the chart out (executor-free).
pub fn layout_dataset_sync(
    raw: &quilt_core::RawNode,
    layout_options: &LayoutOptions,
) -> Result<ChartLayout> {
    let mut hierarchy = quilt_core::build_hierarchy(raw);
    Ok(quilt_render::layout_chart(&mut hierarchy, layout_options)?)
}

pub async fn layout_dataset(
    raw: &quilt_core::RawNode,
    layout_options: &LayoutOptions,
) -> Result<ChartLayout> {
    layout_dataset_sync(raw, layout_options)
}

/// Draws a laid-out chart in its idle (nothing hovered) state.
pub fn render_layout_svg(
    layout: &ChartLayout,
    measurer: &dyn TextMeasurer,
    svg_options: &SvgRenderOptions,
) -> String {
    let mut state = RenderState::new(layout);
    quilt_render::svg::render_chart_svg(layout, &mut state, measurer, svg_options)
}

/// Synchronous SVG render helper (executor-free).
#[tracing::instrument(level = "debug", skip_all, fields(title = %raw.name))]
pub fn render_chart_svg_sync(
    raw: &quilt_core::RawNode,
    layout_options: &LayoutOptions,
    svg_options: &SvgRenderOptions,
) -> Result<String> {
    let layout = layout_dataset_sync(raw, layout_options)?;
    Ok(render_layout_svg(
        &layout,
        layout_options.text_measurer.as_ref(),
        svg_options,
    ))
}

pub async fn render_chart_svg(
    raw: &quilt_core::RawNode,
    layout_options: &LayoutOptions,
    svg_options: &SvgRenderOptions,
) -> Result<String> {
    render_chart_svg_sync(raw, layout_options, svg_options)
}

/// Renders the chart when the dataset loaded, or the load-error placeholder otherwise.
pub fn render_outcome_svg<E: std::fmt::Display>(
    dataset: std::result::Result<&quilt_core::RawNode, E>,
    layout_options: &LayoutOptions,
    svg_options: &SvgRenderOptions,
) -> Result<String> {
    match dataset {
        Ok(raw) => render_chart_svg_sync(raw, layout_options, svg_options),
        Err(err) => {
            tracing::warn!(error = %err, "dataset unavailable, rendering load-error chart");
            Ok(render_error_svg(
                &err.to_string(),
                &layout_options.chart,
                svg_options,
            ))
        }
    }
}

/// Convenience wrapper that bundles the layout and SVG options for headless rendering.
#[derive(Clone, Default)]
pub struct ChartRenderer {
    pub layout: LayoutOptions,
    pub svg: SvgRenderOptions,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chart_id(mut self, chart_id: impl Into<String>) -> Self {
        self.svg.chart_id = chart_id.into();
        self
    }

    pub fn layout_sync(&self, raw: &quilt_core::RawNode) -> Result<ChartLayout> {
        layout_dataset_sync(raw, &self.layout)
    }

    pub fn render_svg_sync(&self, raw: &quilt_core::RawNode) -> Result<String> {
        render_chart_svg_sync(raw, &self.layout, &self.svg)
    }

    pub fn render_error_svg(&self, message: &str) -> String {
        render_error_svg(message, &self.layout.chart, &self.svg)
    }

    #[cfg(feature = "raster")]
    pub fn render_png_sync(
        &self,
        raw: &quilt_core::RawNode,
        raster: &raster::RasterOptions,
    ) -> raster::Result<Vec<u8>> {
        raster::render_png_sync(raw, &self.layout, &self.svg, raster)
    }
}
