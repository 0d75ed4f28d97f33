use clap::Parser;
use quilt::fetch::{DatasetSource, FetchError, FetchOptions, fetch_dataset};
use quilt::render::raster::{RasterError, RasterOptions, svg_to_png};
use quilt::render::{ChartRenderer, HeadlessError};
use quilt::{RawNode, build_hierarchy};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

mod args;

use args::{Cli, Command, LayoutArgs, RenderFormat, SourceArgs};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] HeadlessError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    tracing::debug!(?level, "logging initialised");
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Parse { source, pretty } => {
            let raw = load(&source)?;
            let hierarchy = build_hierarchy(&raw);
            write_json(&hierarchy, pretty)
        }
        Command::Layout {
            source,
            layout,
            pretty,
        } => {
            let raw = load(&source)?;
            let renderer = renderer(&layout, None);
            let chart = renderer.layout_sync(&raw)?;
            write_json(&chart, pretty)
        }
        Command::Render {
            source,
            layout,
            format,
            out,
            id,
            scale,
            background,
        } => {
            let renderer = renderer(&layout, Some(id));
            let raster = RasterOptions {
                scale,
                background: Some(background),
                ..RasterOptions::default()
            };
            let out = output_path(&source, format, out)?;

            match load(&source) {
                Ok(raw) => {
                    let svg = renderer.render_svg_sync(&raw)?;
                    emit(&svg, format, &raster, out.as_deref())
                }
                Err(err) => {
                    // Leave a visible error chart behind, then report the failure.
                    tracing::error!(error = %err, "could not load dataset");
                    let svg = renderer.render_error_svg(&err.to_string());
                    emit(&svg, format, &raster, out.as_deref())?;
                    Err(err)
                }
            }
        }
    }
}

fn renderer(layout: &LayoutArgs, chart_id: Option<String>) -> ChartRenderer {
    let mut renderer = ChartRenderer::new();
    renderer.layout.chart.order = layout.order.into();
    if let Some(id) = chart_id {
        renderer = renderer.with_chart_id(id);
    }
    renderer
}

fn dataset_source(args: &SourceArgs) -> Result<DatasetSource, FetchError> {
    match args.input.as_deref() {
        Some(input) => DatasetSource::parse(input),
        None => DatasetSource::url(&args.url),
    }
}

fn load(args: &SourceArgs) -> Result<RawNode, CliError> {
    let source = dataset_source(args)?;
    let options = FetchOptions {
        timeout: Duration::from_secs(args.timeout_secs),
        ..FetchOptions::default()
    };
    tracing::info!(%source, "loading dataset");
    Ok(fetch_dataset(&source, &options)?)
}

/// PNG output next to a file input (`sales.json` -> `sales.png`) unless `--out` is given.
fn output_path(
    source: &SourceArgs,
    format: RenderFormat,
    out: Option<PathBuf>,
) -> Result<Option<PathBuf>, CliError> {
    if out.is_some() || format == RenderFormat::Svg {
        return Ok(out);
    }
    match dataset_source(source) {
        Ok(DatasetSource::File(path)) => Ok(Some(path.with_extension("png"))),
        _ => Err(CliError::Usage(
            "PNG output needs --out unless the input is a file".to_string(),
        )),
    }
}

fn emit(
    svg: &str,
    format: RenderFormat,
    raster: &RasterOptions,
    out: Option<&Path>,
) -> Result<(), CliError> {
    match format {
        RenderFormat::Svg => write_bytes(svg.as_bytes(), out),
        RenderFormat::Png => write_bytes(&svg_to_png(svg, raster)?, out),
    }
}

fn write_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    write_bytes(text.as_bytes(), None)
}

fn write_bytes(bytes: &[u8], out: Option<&Path>) -> Result<(), CliError> {
    match out {
        Some(path) => {
            std::fs::write(path, bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
