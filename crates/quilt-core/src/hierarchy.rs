use crate::geom::LayoutRect;
use crate::model::RawNode;
use crate::Result;
use serde::Serialize;

/// Index into a [`Hierarchy`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub category: Option<String>,
    /// Declared value after coercion. Only meaningful for leaves.
    pub own_value: f64,
    /// Computed weight: `own_value` for leaves, sum of children otherwise.
    pub value: f64,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub rect: Option<LayoutRect>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Weighted tree built from a [`RawNode`] dataset.
///
/// Nodes live in a flat arena in pre-order, so `NodeId::ROOT` is always index 0 and every parent
/// precedes its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

/// Builds the weighted tree and sums values bottom-up.
pub fn build_hierarchy(raw: &RawNode) -> Hierarchy {
    let mut nodes = Vec::new();
    push_node(&mut nodes, raw, None, 0);
    let mut hierarchy = Hierarchy { nodes };
    hierarchy.sum();
    tracing::debug!(
        nodes = hierarchy.len(),
        total = hierarchy.root().value,
        "built hierarchy"
    );
    hierarchy
}

/// Recursive weight of a raw node: its declared value for a leaf, the sum of its children's
/// weights otherwise.
pub fn sum_value(raw: &RawNode) -> f64 {
    let total = match raw.children.as_deref() {
        Some(children) if !children.is_empty() => children.iter().map(sum_value).sum(),
        _ => raw.declared_value(),
    };
    if total.is_finite() { total } else { 0.0 }
}

fn push_node(nodes: &mut Vec<Node>, raw: &RawNode, parent: Option<NodeId>, depth: usize) {
    let id = NodeId(nodes.len() as u32);
    nodes.push(Node {
        name: raw.name.clone(),
        category: raw.category.clone(),
        own_value: raw.declared_value(),
        value: 0.0,
        depth,
        parent,
        children: Vec::new(),
        rect: None,
    });

    if let Some(parent) = parent {
        nodes[parent.index()].children.push(id);
    }

    if let Some(children) = raw.children.as_ref() {
        for child in children {
            push_node(nodes, child, Some(id), depth + 1);
        }
    }
}

impl Hierarchy {
    pub fn from_raw(raw: &RawNode) -> Self {
        build_hierarchy(raw)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(build_hierarchy(&RawNode::from_json_str(text)?))
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(build_hierarchy(&RawNode::from_json_slice(bytes)?))
    }

    /// Recomputes every `value` bottom-up.
    ///
    /// Children always follow their parent in the arena, so a reverse scan visits every child
    /// before its parent.
    pub fn sum(&mut self) {
        for idx in (0..self.nodes.len()).rev() {
            let value = if self.nodes[idx].children.is_empty() {
                self.nodes[idx].own_value
            } else {
                self.nodes[idx]
                    .children
                    .iter()
                    .map(|c| self.nodes[c.index()].value)
                    .sum()
            };
            let value = if value.is_finite() {
                value
            } else {
                tracing::debug!(
                    node = %self.nodes[idx].name,
                    "subtree total overflows f64, treated as 0"
                );
                0.0
            };
            self.nodes[idx].value = value;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn set_rect(&mut self, id: NodeId, rect: LayoutRect) {
        self.nodes[id.index()].rect = Some(rect);
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Pre-order traversal (parent before children, children in order).
    pub fn each_before(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &c in self.children(id).iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Post-order traversal (children before parent).
    pub fn each_after(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(NodeId::ROOT, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for &c in self.children(id).iter().rev() {
                stack.push((c, false));
            }
        }
        out
    }

    pub fn descendants_bfs(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut queue = std::collections::VecDeque::from([NodeId::ROOT]);
        while let Some(id) = queue.pop_front() {
            out.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        out
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.each_before()
            .into_iter()
            .filter(|&id| self.node(id).is_leaf())
            .collect()
    }

    /// The node itself followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            out.push(p);
            cur = p;
        }
        out
    }

    /// Root name, used as the chart title.
    pub fn title(&self) -> &str {
        &self.root().name
    }

    /// Names of the root's children in dataset order.
    pub fn categories(&self) -> Vec<&str> {
        self.children(NodeId::ROOT)
            .iter()
            .map(|&c| self.node(c).name.as_str())
            .collect()
    }

    /// Name of the node's direct parent; the console a game belongs to. `None` for the root.
    pub fn category_of(&self, id: NodeId) -> Option<&str> {
        self.parent(id).map(|p| self.node(p).name.as_str())
    }
}
