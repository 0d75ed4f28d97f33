//! Command line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use quilt::fetch::DEFAULT_DATASET_URL;
use quilt_render::treemap::ChildOrder;
use std::path::PathBuf;

/// Fetch, lay out and render video-game sales treemaps (headless)
#[derive(Parser, Debug)]
#[command(name = "quilt-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace (RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode the dataset and print the weighted hierarchy as JSON
    Parse {
        #[command(flatten)]
        source: SourceArgs,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the computed chart layout as JSON
    Layout {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Render the chart to SVG or PNG
    Render {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = RenderFormat::Svg)]
        format: RenderFormat,
        /// Output file (stdout for SVG when omitted)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        /// Root `<svg id>`
        #[arg(long, default_value = "quilt-treemap")]
        id: String,
        /// PNG scale factor
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// PNG background color (`white`, `transparent`, `#rrggbb`)
        #[arg(long, default_value = "white")]
        background: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Dataset file, `-` for stdin, or an http(s) URL; defaults to --url
    #[arg(value_hint = ValueHint::AnyPath)]
    pub input: Option<String>,
    /// Dataset URL used when no input is given
    #[arg(long, env = "QUILT_DATASET_URL", default_value = DEFAULT_DATASET_URL)]
    pub url: String,
    /// HTTP timeout in seconds
    #[arg(long, env = "QUILT_FETCH_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Sibling order fed to the squarified layout
    #[arg(long, value_enum, default_value_t = OrderArg::Input)]
    pub order: OrderArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// Dataset order
    Input,
    /// Largest first
    Value,
}

impl From<OrderArg> for ChildOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Value => ChildOrder::ValueDescending,
            OrderArg::Input => ChildOrder::Input,
        }
    }
}
