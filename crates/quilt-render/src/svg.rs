use crate::ChartOptions;
use crate::model::ChartLayout;
use crate::number::fmt;
use crate::state::{HOVER_OPACITY, RenderState};
use crate::text::{TextMeasurer, TextStyle};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root `<svg id>`; also scopes the embedded stylesheet.
    pub chart_id: String,
    pub font_family: String,
    /// Adds a native `<title>` tooltip to every tile.
    pub include_native_titles: bool,
    /// Emits the `#tooltip` group (hidden unless a tile is hovered).
    pub include_tooltip: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            chart_id: "quilt-treemap".to_string(),
            font_family: "verdana, arial, sans-serif".to_string(),
            include_native_titles: true,
            include_tooltip: true,
        }
    }
}

const TOOLTIP_FONT_SIZE: f64 = 12.0;
const TOOLTIP_PADDING: f64 = 6.0;

pub fn render_chart_svg(
    layout: &ChartLayout,
    state: &mut RenderState,
    measurer: &dyn TextMeasurer,
    options: &SvgRenderOptions,
) -> String {
    let id = escape_attr(&options.chart_id);
    let mut out = String::new();

    let _ = write!(
        &mut out,
        r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt(layout.width),
        h = fmt(layout.height),
    );
    let _ = write!(
        &mut out,
        r#"<style>#{id}{{font-family:{font};}}#{id} .tile{{stroke:black;}}#{id} .tile:hover{{opacity:{hover};}}#{id} .tile-label{{pointer-events:none;}}#{id} #tooltip rect{{fill:#fffbe6;stroke:#333;}}</style>"#,
        font = escape_xml(&options.font_family),
        hover = fmt(HOVER_OPACITY),
    );
    let _ = write!(
        &mut out,
        r#"<g transform="translate({}, {})">"#,
        fmt(layout.margin.left),
        fmt(layout.margin.top)
    );

    let title = &layout.title;
    let _ = write!(
        &mut out,
        r#"<text id="title" x="{}" y="{}" style="font-size: {}px">{}</text>"#,
        fmt(title.x),
        fmt(title.y),
        fmt(title.font_size),
        escape_xml(&title.text)
    );

    out.push_str(r#"<g class="tiles">"#);
    for tile in &layout.tiles {
        let fill = state.fill(&tile.category);
        let opacity = state.tile_opacity(tile.node, tile.value);
        let r = &tile.rect;
        let _ = write!(
            &mut out,
            r#"<g class="group" data-node="{node}"><rect class="tile" x="{x}" y="{y}" width="{w}" height="{h}" data-name="{name}" data-category="{category}" data-value="{value}" fill="{fill}" opacity="{opacity}" style="stroke: black">"#,
            node = tile.node.index(),
            x = fmt(r.x0),
            y = fmt(r.y0),
            w = fmt(r.width()),
            h = fmt(r.height()),
            name = escape_attr(&tile.name),
            category = escape_attr(&tile.category),
            value = fmt(tile.value),
            fill = escape_attr(&fill),
            opacity = fmt(opacity),
        );
        if options.include_native_titles {
            let text = crate::hover::format_tooltip(&tile.name, &tile.category, tile.value);
            let _ = write!(&mut out, "<title>{}</title>", escape_xml(&text.join("\n")));
        }
        out.push_str("</rect>");

        let label = &tile.label;
        if !label.lines.is_empty() {
            let _ = write!(
                &mut out,
                r#"<text class="tile-label" x="{x}" y="{y}" font-size="{fs}" fill="white">"#,
                x = fmt(label.x),
                y = fmt(label.y),
                fs = fmt(label.font_size),
            );
            for (i, line) in label.lines.iter().enumerate() {
                let _ = write!(
                    &mut out,
                    r#"<tspan x="{x}" y="{y}" dy="{dy}em">{text}</tspan>"#,
                    x = fmt(label.x),
                    y = fmt(label.y),
                    dy = fmt(i as f64 * label.line_height_em),
                    text = escape_xml(line),
                );
            }
            out.push_str("</text>");
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");

    let legend = &layout.legend;
    let _ = write!(
        &mut out,
        r#"<g id="legend" transform="translate({}, {})">"#,
        fmt(legend.x),
        fmt(legend.y)
    );
    for item in &legend.items {
        let fill = state.fill(&item.category);
        let _ = write!(
            &mut out,
            r#"<g class="legend-entry" transform="translate({x}, {y})"><rect class="legend-item" width="{s}" height="{s}" fill="{fill}"/><text x="{lx}" y="{ly}" style="font: bold {fs}px verdana">{text}</text></g>"#,
            x = fmt(item.x),
            y = fmt(item.y),
            s = fmt(item.swatch_size),
            fill = escape_attr(&fill),
            lx = fmt(item.label_x),
            ly = fmt(item.label_y),
            fs = fmt(legend.font_size),
            text = escape_xml(&item.category),
        );
    }
    out.push_str("</g>");

    if options.include_tooltip {
        render_tooltip(&mut out, state, measurer);
    }

    out.push_str("</g></svg>");
    out
}

fn render_tooltip(out: &mut String, state: &RenderState, measurer: &dyn TextMeasurer) {
    let Some(tooltip) = state.tooltip() else {
        out.push_str(r#"<g id="tooltip" visibility="hidden"/>"#);
        return;
    };

    let lines = tooltip.lines();
    let style = TextStyle::sized(TOOLTIP_FONT_SIZE);
    let text_width = lines
        .iter()
        .map(|l| measurer.measure_width(l, &style))
        .fold(0.0, f64::max);
    let line_height = TOOLTIP_FONT_SIZE * 1.2;
    let box_w = text_width + 2.0 * TOOLTIP_PADDING;
    let box_h = line_height * lines.len() as f64 + 2.0 * TOOLTIP_PADDING;

    let _ = write!(
        out,
        r#"<g id="tooltip" visibility="visible" data-name="{name}" data-console="{console}" data-value="{value}" transform="translate({x}, {y})"><rect width="{w}" height="{h}" rx="3"/><text font-size="{fs}">"#,
        name = escape_attr(&tooltip.name),
        console = escape_attr(&tooltip.category),
        value = fmt(tooltip.value),
        x = fmt(tooltip.x),
        y = fmt(tooltip.y),
        w = fmt(box_w),
        h = fmt(box_h),
        fs = fmt(TOOLTIP_FONT_SIZE),
    );
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<tspan x="{x}" y="{y}">{text}</tspan>"#,
            x = fmt(TOOLTIP_PADDING),
            y = fmt(TOOLTIP_PADDING + line_height * (i as f64 + 1.0) - 3.0),
            text = escape_xml(line),
        );
    }
    out.push_str("</text></g>");
}

/// Chart-sized placeholder shown when the dataset could not be loaded.
pub fn render_error_svg(message: &str, chart: &ChartOptions, options: &SvgRenderOptions) -> String {
    let mut out = String::new();
    let _ = write!(
        &mut out,
        r##"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="#fff4f4" stroke="#f50808"/><text id="load-error" x="{cx}" y="{cy}" text-anchor="middle" font-family="{font}" font-size="16" fill="#7c4747"><tspan x="{cx}" dy="0">Could not load dataset</tspan><tspan x="{cx}" dy="1.4em">{message}</tspan></text></svg>"##,
        id = escape_attr(&options.chart_id),
        w = fmt(chart.width),
        h = fmt(chart.height),
        cx = fmt(chart.width / 2.0),
        cy = fmt(chart.height / 2.0),
        font = escape_attr(&options.font_family),
        message = escape_xml(message),
    );
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
}
