#![forbid(unsafe_code)]

//! `quilt` is a headless treemap of video-game sales data.
//!
//! The pipeline has two phases: obtain the dataset ([`fetch::fetch_dataset`]), then lay it out
//! and draw it synchronously ([`render::render_chart_svg_sync`]).
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`quilt::render`)
//! - `fetch`: load datasets from URLs or files (`quilt::fetch`)
//! - `raster`: enable PNG output via pure-Rust SVG rasterization

pub use quilt_core::*;

#[cfg(feature = "fetch")]
pub mod fetch;

#[cfg(feature = "render")]
pub mod render;
