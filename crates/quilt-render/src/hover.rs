//! Pointer hover tracking and tooltip content.

use crate::number::js_number;
use quilt_core::NodeId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HoverPhase {
    #[default]
    Idle,
    Hovering(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HoverEvent {
    Enter(NodeId),
    Move { node: NodeId, x: f64, y: f64 },
    Leave(NodeId),
}

/// Two-state hover machine fed with hit-test results.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    phase: HoverPhase,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    pub fn current(&self) -> Option<NodeId> {
        match self.phase {
            HoverPhase::Idle => None,
            HoverPhase::Hovering(node) => Some(node),
        }
    }

    /// Feeds the tile under the pointer (if any) and returns the resulting transitions.
    ///
    /// Entering a tile also reports a `Move` so listeners can position content immediately.
    pub fn update(&mut self, hit: Option<NodeId>, x: f64, y: f64) -> Vec<HoverEvent> {
        let mut events = Vec::new();
        match (self.phase, hit) {
            (HoverPhase::Idle, None) => {}
            (HoverPhase::Hovering(cur), Some(node)) if cur == node => {
                events.push(HoverEvent::Move { node, x, y });
            }
            (phase, hit) => {
                if let HoverPhase::Hovering(cur) = phase {
                    events.push(HoverEvent::Leave(cur));
                }
                self.phase = match hit {
                    Some(node) => {
                        events.push(HoverEvent::Enter(node));
                        events.push(HoverEvent::Move { node, x, y });
                        HoverPhase::Hovering(node)
                    }
                    None => HoverPhase::Idle,
                };
            }
        }
        events
    }

    /// Pointer left the chart.
    pub fn clear(&mut self) -> Vec<HoverEvent> {
        match std::mem::take(&mut self.phase) {
            HoverPhase::Idle => Vec::new(),
            HoverPhase::Hovering(node) => vec![HoverEvent::Leave(node)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub node: NodeId,
    pub name: String,
    pub category: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    pub fn lines(&self) -> [String; 3] {
        format_tooltip(&self.name, &self.category, self.value)
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

pub fn format_tooltip(name: &str, category: &str, value: f64) -> [String; 3] {
    [
        format!("Name: {name}"),
        format!("Console: {category}"),
        format!("Value: {}", js_number(value)),
    ]
}
