use crate::hover::{HoverEvent, HoverState, Tooltip};
use crate::model::ChartLayout;
use crate::scale::{LinearScale, OrdinalScale};
use quilt_core::NodeId;

/// Opacity applied to the tile under the pointer.
pub const HOVER_OPACITY: f64 = 0.5;

/// Mutable presentation state threaded through rendering: scales, hover and tooltip.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub color: OrdinalScale,
    pub opacity: LinearScale,
    pub tooltip_offset: (f64, f64),
    hover: HoverState,
    tooltip: Option<Tooltip>,
}

impl RenderState {
    /// Seeds the color domain with the legend categories (dataset order) and fits the opacity
    /// scale to the tile values.
    pub fn new(layout: &ChartLayout) -> Self {
        Self {
            color: OrdinalScale::category_palette().with_domain(layout.categories()),
            opacity: LinearScale::opacity_for_values(layout.tiles.iter().map(|t| t.value)),
            tooltip_offset: (12.0, 12.0),
            hover: HoverState::new(),
            tooltip: None,
        }
    }

    pub fn fill(&mut self, category: &str) -> String {
        self.color.get(category).to_string()
    }

    /// Tile opacity: value-scaled, or [`HOVER_OPACITY`] while hovered.
    pub fn tile_opacity(&self, node: NodeId, value: f64) -> f64 {
        if self.hover.current() == Some(node) {
            HOVER_OPACITY
        } else {
            self.opacity.scale(value)
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.current()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Pointer moved to plot-space `(x, y)`.
    pub fn pointer_move(&mut self, layout: &ChartLayout, x: f64, y: f64) -> Vec<HoverEvent> {
        let hit = layout.hit_test(x, y).map(|t| t.node);
        let events = self.hover.update(hit, x, y);
        for event in &events {
            self.apply(layout, *event);
        }
        events
    }

    pub fn pointer_leave(&mut self) -> Vec<HoverEvent> {
        let events = self.hover.clear();
        if !events.is_empty() {
            self.tooltip = None;
        }
        events
    }

    fn apply(&mut self, layout: &ChartLayout, event: HoverEvent) {
        match event {
            HoverEvent::Enter(node) => {
                self.tooltip = layout.tile(node).map(|tile| Tooltip {
                    node,
                    name: tile.name.clone(),
                    category: tile.category.clone(),
                    value: tile.value,
                    x: 0.0,
                    y: 0.0,
                });
            }
            HoverEvent::Move { node, x, y } => {
                if let Some(tooltip) = self.tooltip.as_mut() {
                    if tooltip.node == node {
                        tooltip.x = x + self.tooltip_offset.0;
                        tooltip.y = y + self.tooltip_offset.1;
                    }
                }
            }
            HoverEvent::Leave(_) => {
                self.tooltip = None;
            }
        }
    }
}
