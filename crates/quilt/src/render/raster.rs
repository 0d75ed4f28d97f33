#![forbid(unsafe_code)]

use crate::render::{HeadlessError, LayoutOptions, SvgRenderOptions};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    /// Fill painted under the chart; `None` keeps the pixmap transparent.
    pub background: Option<String>,
    /// Family usvg falls back to when the chart's font stack is not installed.
    pub font_family: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: Some("white".to_string()),
            font_family: "Verdana".to_string(),
        }
    }
}

pub fn render_png_sync(
    raw: &quilt_core::RawNode,
    layout_options: &LayoutOptions,
    svg_options: &SvgRenderOptions,
    raster: &RasterOptions,
) -> Result<Vec<u8>> {
    let svg = super::render_chart_svg_sync(raw, layout_options, svg_options)?;
    svg_to_png(&svg, raster)
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options)?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = options.font_family.clone();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    let scale = options.scale;
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc)?;

    if let Some(color) = options.background.as_deref().and_then(parse_background) {
        pixmap.fill(color);
    }
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Accepts `transparent`, `white`, `black`, `#rgb`, `#rrggbb` and `#rrggbbaa`.
fn parse_background(text: &str) -> Option<tiny_skia::Color> {
    let text = text.trim().to_ascii_lowercase();
    let [r, g, b, a] = match text.as_str() {
        "transparent" => [0, 0, 0, 0],
        "white" => [255, 255, 255, 255],
        "black" => [0, 0, 0, 255],
        other => {
            let hex = other.strip_prefix('#')?;
            if !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize, width: usize| {
                let v = u8::from_str_radix(hex.get(i * width..(i + 1) * width)?, 16).ok()?;
                Some(if width == 1 { v * 17 } else { v })
            };
            match hex.len() {
                3 => [channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 255],
                6 => [channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, 255],
                8 => [channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, channel(3, 2)?],
                _ => return None,
            }
        }
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_to_png_produces_png_signature() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;
        let bytes = svg_to_png(svg, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn background_colors_parse() {
        let rgba = |text| parse_background(text).map(|c| c.to_color_u8());
        let red = tiny_skia::ColorU8::from_rgba(0xf5, 0x08, 0x08, 255);
        assert_eq!(rgba("#f50808"), Some(red));
        assert_eq!(rgba(" White "), Some(tiny_skia::ColorU8::from_rgba(255, 255, 255, 255)));
        assert_eq!(rgba("#fff"), Some(tiny_skia::ColorU8::from_rgba(255, 255, 255, 255)));
        assert_eq!(rgba("#00000080"), Some(tiny_skia::ColorU8::from_rgba(0, 0, 0, 0x80)));
        assert!(rgba("#abcd").is_none());
        assert!(rgba("#zzzzzz").is_none());
        assert!(rgba("tomato").is_none());
    }

    #[test]
    fn scale_multiplies_the_pixmap_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="6" viewBox="0 0 10 6"/>"#;
        let options = RasterOptions {
            scale: 2.0,
            background: None,
            ..RasterOptions::default()
        };
        let pixmap = svg_to_pixmap(svg, &options).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (20, 12));
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }
}
