#![forbid(unsafe_code)]

//! Headless dataset model for quilt treemaps.
//!
//! Decode a dataset into [`RawNode`], then [`build_hierarchy`] to get a weighted [`Hierarchy`]
//! ready for layout.

pub mod error;
pub mod geom;
pub mod hierarchy;
pub mod model;

pub use error::{Error, Result};
pub use geom::LayoutRect;
pub use hierarchy::{Hierarchy, Node, NodeId, build_hierarchy, sum_value};
pub use model::{RawNode, coerce_value};
