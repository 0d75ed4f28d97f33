use futures::executor::block_on;
use quilt::render::{
    ChartRenderer, LayoutOptions, SvgRenderOptions, layout_dataset_sync, render_chart_svg,
    render_outcome_svg,
};
use quilt::{RawNode, build_hierarchy};
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn sample() -> RawNode {
    let path = repo_root()
        .join("fixtures")
        .join("video-game-sales-sample.json");
    let text = std::fs::read_to_string(&path).expect("read fixture");
    RawNode::from_json_str(&text).expect("decode fixture")
}

#[test]
fn fixture_values_are_coerced_and_summed() {
    let h = build_hierarchy(&sample());
    assert_eq!(h.categories(), vec!["Wii", "DS", "X360", "GB", "PS2", "NES"]);
    assert_eq!(h.leaves().len(), 17);
    let total: f64 = h.leaves().iter().map(|&id| h.node(id).value).sum();
    assert!((total - h.root().value).abs() < 1e-9);
    assert!(h.root().value > 500.0);
}

#[test]
fn layout_keeps_every_tile_inside_the_plot() {
    let layout = layout_dataset_sync(&sample(), &LayoutOptions::default()).unwrap();
    assert_eq!(layout.tiles.len(), 17);
    assert_eq!(layout.legend.items.len(), 6);
    for tile in &layout.tiles {
        let r = tile.rect;
        assert!(r.x1 >= r.x0 && r.y1 >= r.y0, "{} inverted", tile.name);
        assert!(r.area() > 0.0, "{} is empty", tile.name);
        assert!(r.x0 >= 0.0 && r.y0 >= 0.0);
        assert!(r.x1 <= layout.plot_width + 1e-9 && r.y1 <= layout.plot_height + 1e-9);
        assert!(!tile.label.lines.is_empty());
    }

    // Larger sales, larger tiles.
    let area = |name: &str| {
        layout
            .tiles
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.rect.area())
            .unwrap()
    };
    assert!(area("Wii Sports") > area("Duck Hunt"));
}

#[test]
fn async_render_matches_sync_render() {
    let renderer = ChartRenderer::new();
    let raw = sample();
    let sync_svg = renderer.render_svg_sync(&raw).unwrap();
    let async_svg = block_on(render_chart_svg(
        &raw,
        &LayoutOptions::default(),
        &SvgRenderOptions::default(),
    ))
    .unwrap();
    assert_eq!(sync_svg, async_svg);
    assert_eq!(sync_svg.matches(r#"class="tile""#).count(), 17);
    assert_eq!(sync_svg.matches(r#"class="legend-item""#).count(), 6);
}

#[test]
fn render_is_deterministic() {
    let renderer = ChartRenderer::new().with_chart_id("sales");
    let raw = sample();
    let a = renderer.render_svg_sync(&raw).unwrap();
    let b = renderer.render_svg_sync(&raw).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with(r#"<svg id="sales""#));
}

#[test]
fn failed_load_renders_visible_error() {
    let failure: Result<&RawNode, String> = Err("connection refused".to_string());
    let svg = render_outcome_svg(
        failure,
        &LayoutOptions::default(),
        &SvgRenderOptions::default(),
    )
    .unwrap();
    assert!(svg.contains(r#"id="load-error""#));
    assert!(svg.contains("connection refused"));
    assert!(!svg.contains(r#"class="tile""#));
}

#[test]
fn end_to_end_single_leaf_in_a_small_box() {
    let raw = RawNode::from_json_str(
        r#"{"name":"Consoles","children":[{"name":"Wii","children":[{"name":"Wii Sports","value":82.74}]}]}"#,
    )
    .unwrap();
    let mut h = build_hierarchy(&raw);
    quilt::render::treemap::layout(&mut h, 100.0, 100.0);
    let rect = h.node(h.leaves()[0]).rect.unwrap();
    assert!((rect.x0 - 0.0).abs() < 1e-9);
    assert!((rect.y0 - 2.0).abs() < 1e-9);
    assert!((rect.x1 - 92.0).abs() < 1e-9);
    assert!((rect.y1 - 100.0).abs() < 1e-9);

    let layout = layout_dataset_sync(&raw, &LayoutOptions::default()).unwrap();
    let mut state = quilt::render::RenderState::new(&layout);
    let first = state.fill("Wii");
    assert_eq!(first, state.fill("Wii"));
}
