//! Squarified treemap layout with a per-depth padding stack.

use crate::{Error, Result};
use quilt_core::{Hierarchy, LayoutRect, NodeId};
use serde::{Deserialize, Serialize};

pub const PADDING_TOP: f64 = 1.0;
pub const PADDING_INNER: f64 = 3.0;
pub const PADDING_RIGHT: f64 = 4.0;

/// Golden ratio, the target aspect ratio for squarified rows.
pub const PHI: f64 = (1.0 + 2.23606797749979) / 2.0;

/// Order in which siblings are fed to the row builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildOrder {
    /// Dataset order.
    #[default]
    Input,
    /// Largest first, ties keep dataset order.
    ValueDescending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treemap {
    pub width: f64,
    pub height: f64,
    pub padding_top: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
    pub padding_inner: f64,
    pub ratio: f64,
    pub round: bool,
    pub order: ChildOrder,
}

impl Default for Treemap {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            padding_top: PADDING_TOP,
            padding_right: PADDING_RIGHT,
            padding_bottom: 0.0,
            padding_left: 0.0,
            padding_inner: PADDING_INNER,
            ratio: PHI,
            round: false,
            order: ChildOrder::default(),
        }
    }
}

/// Lays `hierarchy` out in a `width` x `height` box with the fixed chart paddings and attaches a
/// [`LayoutRect`] to every node.
///
/// Non-finite or negative extents are treated as `0`, which yields zero-size rectangles.
pub fn layout(hierarchy: &mut Hierarchy, width: f64, height: f64) {
    let extent = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
    Treemap::new(extent(width), extent(height)).apply(hierarchy);
}

impl Treemap {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding;
        self
    }

    /// Sets top, right, bottom and left outer padding at once.
    pub fn padding_outer(mut self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        self.padding_top = top;
        self.padding_right = right;
        self.padding_bottom = bottom;
        self.padding_left = left;
        self
    }

    pub fn ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn order(mut self, order: ChildOrder) -> Self {
        self.order = order;
        self
    }

    /// Validates the configuration, then lays `hierarchy` out.
    pub fn layout(&self, hierarchy: &mut Hierarchy) -> Result<()> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidGeometry {
                    message: format!("treemap {name} must be finite and non-negative, got {v}"),
                });
            }
        }
        let paddings = [
            self.padding_top,
            self.padding_right,
            self.padding_bottom,
            self.padding_left,
            self.padding_inner,
        ];
        if paddings.iter().any(|p| !p.is_finite()) {
            return Err(Error::InvalidGeometry {
                message: "treemap paddings must be finite".to_string(),
            });
        }
        if !(self.ratio.is_finite() && self.ratio >= 1.0) {
            return Err(Error::InvalidGeometry {
                message: format!("treemap ratio must be >= 1, got {}", self.ratio),
            });
        }
        self.apply(hierarchy);
        Ok(())
    }

    fn apply(&self, hierarchy: &mut Hierarchy) {
        let mut rects = vec![LayoutRect::default(); hierarchy.len()];
        rects[0] = LayoutRect::from_size(self.width, self.height);

        let mut padding_stack = vec![0.0];
        for id in hierarchy.each_before() {
            self.position_node(hierarchy, id, &mut rects, &mut padding_stack);
        }

        for id in hierarchy.ids().collect::<Vec<_>>() {
            let mut rect = rects[id.index()];
            if self.round {
                rect = LayoutRect::new(
                    rect.x0.round(),
                    rect.y0.round(),
                    rect.x1.round(),
                    rect.y1.round(),
                );
            }
            hierarchy.set_rect(id, rect);
        }
        tracing::debug!(
            nodes = hierarchy.len(),
            width = self.width,
            height = self.height,
            "treemap laid out"
        );
    }

    fn position_node(
        &self,
        hierarchy: &Hierarchy,
        id: NodeId,
        rects: &mut [LayoutRect],
        padding_stack: &mut Vec<f64>,
    ) {
        let depth = hierarchy.node(id).depth;
        if padding_stack.len() <= depth {
            padding_stack.resize(depth + 1, 0.0);
        }
        let mut p = padding_stack[depth];
        let r = rects[id.index()];
        let inset = collapse(r.x0 + p, r.y0 + p, r.x1 - p, r.y1 - p);
        rects[id.index()] = inset;

        if hierarchy.node(id).is_leaf() {
            return;
        }

        p = self.padding_inner / 2.0;
        if padding_stack.len() <= depth + 1 {
            padding_stack.resize(depth + 2, 0.0);
        }
        padding_stack[depth + 1] = p;

        let area = collapse(
            inset.x0 + self.padding_left - p,
            inset.y0 + self.padding_top - p,
            inset.x1 - (self.padding_right - p),
            inset.y1 - (self.padding_bottom - p),
        );

        let children = self.ordered_children(hierarchy, id);
        squarify(
            hierarchy,
            &children,
            hierarchy.node(id).value,
            area,
            self.ratio,
            rects,
        );
    }

    fn ordered_children(&self, hierarchy: &Hierarchy, id: NodeId) -> Vec<NodeId> {
        let mut children = hierarchy.children(id).to_vec();
        if self.order == ChildOrder::ValueDescending {
            // `sort_by` is stable, so equal values keep dataset order.
            children.sort_by(|a, b| {
                let av = hierarchy.node(*a).value;
                let bv = hierarchy.node(*b).value;
                bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        children
    }
}

/// Collapses an inverted rectangle to its midpoint on the offending axis.
fn collapse(x0: f64, y0: f64, x1: f64, y1: f64) -> LayoutRect {
    let (x0, x1) = collapse_axis(x0, x1);
    let (y0, y1) = collapse_axis(y0, y1);
    LayoutRect::new(x0, y0, x1, y1)
}

/// Non-finite edges collapse onto the finite one, or onto `0` when neither is.
fn collapse_axis(lo: f64, hi: f64) -> (f64, f64) {
    match (lo.is_finite(), hi.is_finite()) {
        (true, true) if hi >= lo => (lo, hi),
        (true, true) => {
            let mid = (lo + hi) / 2.0;
            (mid, mid)
        }
        (true, false) => (lo, lo),
        (false, true) => (hi, hi),
        (false, false) => (0.0, 0.0),
    }
}

/// Row spanning the full width; children split it horizontally.
fn dice(
    hierarchy: &Hierarchy,
    row: &[NodeId],
    row_value: f64,
    bounds: LayoutRect,
    rects: &mut [LayoutRect],
) {
    let k = if row_value != 0.0 {
        bounds.width() / row_value
    } else {
        0.0
    };
    let mut x = bounds.x0;
    for &child in row {
        let x0 = x;
        x += hierarchy.node(child).value * k;
        rects[child.index()] = LayoutRect::new(x0, bounds.y0, x, bounds.y1);
    }
}

/// Column spanning the full height; children split it vertically.
fn slice(
    hierarchy: &Hierarchy,
    row: &[NodeId],
    row_value: f64,
    bounds: LayoutRect,
    rects: &mut [LayoutRect],
) {
    let k = if row_value != 0.0 {
        bounds.height() / row_value
    } else {
        0.0
    };
    let mut y = bounds.y0;
    for &child in row {
        let y0 = y;
        y += hierarchy.node(child).value * k;
        rects[child.index()] = LayoutRect::new(bounds.x0, y0, bounds.x1, y);
    }
}

fn squarify(
    hierarchy: &Hierarchy,
    children: &[NodeId],
    parent_value: f64,
    area: LayoutRect,
    ratio: f64,
    rects: &mut [LayoutRect],
) {
    let n = children.len();
    let LayoutRect {
        mut x0,
        mut y0,
        x1,
        y1,
    } = area;
    let mut i0 = 0usize;
    let mut i1 = 0usize;
    let mut value = parent_value;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Seed the row, absorbing leading zero-valued children.
        let mut sum_value;
        loop {
            sum_value = hierarchy.node(children[i1]).value;
            i1 += 1;
            if sum_value != 0.0 || i1 >= n {
                break;
            }
        }

        let mut min_value = sum_value;
        let mut max_value = sum_value;
        let alpha = (dy / dx).max(dx / dy) / (value * ratio);
        let mut beta = sum_value * sum_value * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        while i1 < n {
            let node_value = hierarchy.node(children[i1]).value;
            sum_value += node_value;
            min_value = min_value.min(node_value);
            max_value = max_value.max(node_value);
            beta = sum_value * sum_value * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum_value -= node_value;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &children[i0..i1];
        if dx < dy {
            let y2 = if value != 0.0 {
                y0 + dy * (sum_value / value)
            } else {
                y1
            };
            dice(hierarchy, row, sum_value, LayoutRect::new(x0, y0, x1, y2), rects);
            y0 = y2;
        } else {
            let x2 = if value != 0.0 {
                x0 + dx * (sum_value / value)
            } else {
                x1
            };
            slice(hierarchy, row, sum_value, LayoutRect::new(x0, y0, x2, y1), rects);
            x0 = x2;
        }

        value -= sum_value;
        i0 = i1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quilt_core::{RawNode, build_hierarchy};

    const EPS: f64 = 1e-9;

    fn assert_rect(actual: LayoutRect, expected: (f64, f64, f64, f64)) {
        let (x0, y0, x1, y1) = expected;
        assert!(
            (actual.x0 - x0).abs() < EPS
                && (actual.y0 - y0).abs() < EPS
                && (actual.x1 - x1).abs() < EPS
                && (actual.y1 - y1).abs() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn consoles() -> RawNode {
        RawNode::branch(
            "Consoles",
            vec![RawNode::branch(
                "Wii",
                vec![RawNode::leaf("Wii Sports", 82.74)],
            )],
        )
    }

    #[test]
    fn single_leaf_fills_the_padded_box() {
        let mut h = build_hierarchy(&consoles());
        layout(&mut h, 100.0, 100.0);

        assert_rect(h.root().rect.unwrap(), (0.0, 0.0, 100.0, 100.0));
        let wii = h.children(NodeId::ROOT)[0];
        assert_rect(h.node(wii).rect.unwrap(), (0.0, 1.0, 96.0, 100.0));
        let leaf = h.leaves()[0];
        assert_rect(h.node(leaf).rect.unwrap(), (0.0, 2.0, 92.0, 100.0));
    }

    #[test]
    fn zero_value_leaf_gets_zero_area() {
        let raw = RawNode::branch(
            "root",
            vec![
                RawNode::leaf("big", 10.0),
                RawNode::leaf("nothing", 0.0),
                RawNode::leaf("small", 5.0),
            ],
        );
        let mut h = build_hierarchy(&raw);
        layout(&mut h, 200.0, 100.0);
        for id in h.leaves() {
            let node = h.node(id);
            let rect = node.rect.unwrap();
            assert!(rect.x1 >= rect.x0 && rect.y1 >= rect.y0);
            if node.value == 0.0 {
                assert_eq!(rect.area(), 0.0);
            } else {
                assert!(rect.area() > 0.0);
            }
        }
    }

    #[test]
    fn zero_total_parent_yields_zero_size_children() {
        let raw = RawNode::branch(
            "root",
            vec![
                RawNode::branch("empty", vec![RawNode::leaf("a", 0.0), RawNode::leaf("b", 0.0)]),
                RawNode::leaf("full", 3.0),
            ],
        );
        let mut h = build_hierarchy(&raw);
        layout(&mut h, 120.0, 80.0);
        for id in h.ids() {
            let rect = h.node(id).rect.unwrap();
            assert!(rect.x0.is_finite() && rect.y0.is_finite());
            assert!(rect.x1.is_finite() && rect.y1.is_finite());
            assert!(rect.x1 >= rect.x0 && rect.y1 >= rect.y0);
        }
        let empty = h.children(NodeId::ROOT)[0];
        for &c in h.children(empty) {
            assert_eq!(h.node(c).rect.unwrap().area(), 0.0);
        }
    }

    #[test]
    fn all_zero_dataset_is_not_an_error() {
        let raw = RawNode::branch("root", vec![RawNode::leaf("a", 0.0)]);
        let mut h = build_hierarchy(&raw);
        Treemap::new(50.0, 50.0).layout(&mut h).unwrap();
        assert_eq!(h.node(h.leaves()[0]).rect.unwrap().area(), 0.0);
    }

    #[test]
    fn squarify_matches_known_split_without_padding() {
        let raw = RawNode::branch(
            "root",
            vec![
                RawNode::leaf("a", 6.0),
                RawNode::leaf("b", 6.0),
                RawNode::leaf("c", 4.0),
                RawNode::leaf("d", 3.0),
                RawNode::leaf("e", 2.0),
                RawNode::leaf("f", 2.0),
                RawNode::leaf("g", 1.0),
            ],
        );
        let mut h = build_hierarchy(&raw);
        Treemap::new(6.0, 4.0)
            .padding_outer(0.0, 0.0, 0.0, 0.0)
            .padding_inner(0.0)
            .layout(&mut h)
            .unwrap();
        let leaves = h.leaves();
        // First row: the two sixes stacked in a 3-wide column.
        assert_rect(h.node(leaves[0]).rect.unwrap(), (0.0, 0.0, 3.0, 2.0));
        assert_rect(h.node(leaves[1]).rect.unwrap(), (0.0, 2.0, 3.0, 4.0));
        let total: f64 = leaves.iter().map(|&l| h.node(l).rect.unwrap().area()).sum();
        assert!((total - 24.0).abs() < 1e-9);
    }

    #[test]
    fn default_order_follows_the_dataset() {
        let raw = RawNode::branch(
            "root",
            vec![RawNode::leaf("small", 1.0), RawNode::leaf("large", 3.0)],
        );
        let mut h = build_hierarchy(&raw);
        let leaves = h.leaves();
        layout(&mut h, 40.0, 10.0);
        assert!(h.node(leaves[0]).rect.unwrap().x0 < h.node(leaves[1]).rect.unwrap().x0);

        Treemap::new(40.0, 10.0)
            .padding_outer(0.0, 0.0, 0.0, 0.0)
            .padding_inner(0.0)
            .layout(&mut h)
            .unwrap();
        assert_rect(h.node(leaves[0]).rect.unwrap(), (0.0, 0.0, 10.0, 10.0));
        assert_rect(h.node(leaves[1]).rect.unwrap(), (10.0, 0.0, 40.0, 10.0));

        Treemap::new(40.0, 10.0)
            .padding_outer(0.0, 0.0, 0.0, 0.0)
            .padding_inner(0.0)
            .order(ChildOrder::ValueDescending)
            .layout(&mut h)
            .unwrap();
        assert_rect(h.node(leaves[1]).rect.unwrap(), (0.0, 0.0, 30.0, 10.0));
        assert_rect(h.node(leaves[0]).rect.unwrap(), (30.0, 0.0, 40.0, 10.0));
    }

    #[test]
    fn overflowing_values_yield_zero_size_rects() {
        let raw = RawNode::branch(
            "root",
            vec![RawNode::leaf("a", 1e308), RawNode::leaf("b", 1e308)],
        );
        let mut h = build_hierarchy(&raw);
        layout(&mut h, 100.0, 100.0);
        for id in h.ids() {
            let r = h.node(id).rect.unwrap();
            assert!(r.x0.is_finite() && r.y0.is_finite());
            assert!(r.x1.is_finite() && r.y1.is_finite());
            assert!(r.x1 >= r.x0 && r.y1 >= r.y0, "{r:?}");
        }
        for id in h.leaves() {
            assert_eq!(h.node(id).rect.unwrap().area(), 0.0);
        }
    }

    #[test]
    fn huge_finite_values_keep_their_proportions() {
        let raw = RawNode::branch(
            "root",
            vec![RawNode::leaf("a", 1e308), RawNode::leaf("b", 5e307)],
        );
        let mut h = build_hierarchy(&raw);
        assert!(h.root().value.is_finite());
        Treemap::new(100.0, 100.0)
            .padding_outer(0.0, 0.0, 0.0, 0.0)
            .padding_inner(0.0)
            .layout(&mut h)
            .unwrap();
        let leaves = h.leaves();
        assert_rect(h.node(leaves[0]).rect.unwrap(), (0.0, 0.0, 100.0, 200.0 / 3.0));
        assert_rect(h.node(leaves[1]).rect.unwrap(), (0.0, 200.0 / 3.0, 100.0, 100.0));
    }

    #[test]
    fn collapse_handles_non_finite_edges() {
        assert_eq!(collapse(1.0, 2.0, f64::NAN, 5.0), LayoutRect::new(1.0, 2.0, 1.0, 5.0));
        assert_eq!(
            collapse(f64::NAN, f64::INFINITY, f64::NAN, 4.0),
            LayoutRect::new(0.0, 4.0, 0.0, 4.0)
        );
        assert_eq!(collapse(4.0, 0.0, 2.0, 1.0), LayoutRect::new(3.0, 0.0, 3.0, 1.0));
    }

    #[test]
    fn padded_leaf_areas_match_closed_form() {
        let mut h = build_hierarchy(&consoles());
        layout(&mut h, 100.0, 100.0);
        assert!((h.node(h.leaves()[0]).rect.unwrap().area() - 92.0 * 98.0).abs() < EPS);

        // Two equal games share the 92-wide band minus one inner gap.
        let raw = RawNode::branch(
            "Consoles",
            vec![RawNode::branch(
                "Wii",
                vec![RawNode::leaf("Wii Sports", 5.0), RawNode::leaf("Wii Fit", 5.0)],
            )],
        );
        let mut h = build_hierarchy(&raw);
        layout(&mut h, 100.0, 100.0);
        let leaves = h.leaves();
        assert_rect(h.node(leaves[0]).rect.unwrap(), (0.0, 2.0, 44.5, 100.0));
        assert_rect(h.node(leaves[1]).rect.unwrap(), (47.5, 2.0, 92.0, 100.0));
        let total: f64 = leaves.iter().map(|&l| h.node(l).rect.unwrap().area()).sum();
        assert!((total - (92.0 - PADDING_INNER) * 98.0).abs() < 1e-6);
    }

    #[test]
    fn layout_rejects_invalid_geometry() {
        let mut h = build_hierarchy(&consoles());
        assert!(matches!(
            Treemap::new(f64::NAN, 10.0).layout(&mut h),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(matches!(
            Treemap::new(10.0, -1.0).layout(&mut h),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(h.root().rect.is_none());

        layout(&mut h, f64::INFINITY, -3.0);
        assert_eq!(h.root().rect.unwrap().area(), 0.0);
    }

    #[test]
    fn round_snaps_every_edge() {
        let mut h = build_hierarchy(&consoles());
        Treemap::new(99.5, 99.5).round(true).layout(&mut h).unwrap();
        for id in h.ids() {
            let r = h.node(id).rect.unwrap();
            for v in [r.x0, r.y0, r.x1, r.y1] {
                assert_eq!(v, v.round());
            }
        }
    }

    fn arb_tree() -> impl Strategy<Value = RawNode> {
        let leaf = (0u32..500).prop_map(|v| RawNode::leaf("leaf", f64::from(v)));
        leaf.prop_recursive(3, 48, 6, |inner| {
            prop::collection::vec(inner, 1..6).prop_map(|c| RawNode::branch("group", c))
        })
    }

    proptest! {
        #[test]
        fn prop_leaves_are_never_inverted(
            raw in arb_tree(),
            width in 0.0f64..1200.0,
            height in 0.0f64..900.0,
        ) {
            let mut h = build_hierarchy(&raw);
            layout(&mut h, width, height);
            for id in h.leaves() {
                let r = h.node(id).rect.unwrap();
                prop_assert!(r.x1 >= r.x0 && r.y1 >= r.y0);
                prop_assert!(r.x0.is_finite() && r.y1.is_finite());
                // Collapsed rectangles may sit on the padding band; visible ones stay inside.
                if r.area() > 0.0 {
                    prop_assert!(r.x0 >= -1e-6 && r.y0 >= -1e-6);
                    prop_assert!(r.x1 <= width + 1e-6 && r.y1 <= height + 1e-6);
                }
            }
        }

        #[test]
        fn prop_unpadded_leaf_area_fills_the_box(
            raw in arb_tree(),
            width in 1.0f64..1200.0,
            height in 1.0f64..900.0,
        ) {
            let mut h = build_hierarchy(&raw);
            prop_assume!(h.root().value > 0.0);
            Treemap::new(width, height)
                .padding_outer(0.0, 0.0, 0.0, 0.0)
                .padding_inner(0.0)
                .layout(&mut h)
                .unwrap();
            let total: f64 = h.leaves().iter().map(|&id| h.node(id).rect.unwrap().area()).sum();
            prop_assert!((total - width * height).abs() <= 1e-6 * width * height);
        }

        #[test]
        fn prop_padded_leaf_area_never_exceeds_the_box(
            raw in arb_tree(),
            width in 1.0f64..1200.0,
            height in 1.0f64..900.0,
        ) {
            let mut h = build_hierarchy(&raw);
            layout(&mut h, width, height);
            let total: f64 = h.leaves().iter().map(|&id| h.node(id).rect.unwrap().area()).sum();
            prop_assert!(total <= width * height + 1e-6);
        }
    }
}
