//! Dataset loading: the one suspension point of the pipeline.

use quilt_core::RawNode;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATASET_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/video-game-sales-data.json";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid dataset URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme { scheme: String },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Dataset(#[from] quilt_core::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Url(url::Url),
    File(PathBuf),
    Stdin,
}

impl DatasetSource {
    /// `-` is stdin, `http(s)://...` is a URL, anything else is a file path.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input == "-" {
            return Ok(Self::Stdin);
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            return Self::url(input);
        }
        Ok(Self::File(PathBuf::from(input)))
    }

    pub fn url(input: &str) -> Result<Self> {
        let url = url::Url::parse(input).map_err(|source| FetchError::InvalidUrl {
            url: input.to_string(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Url(url)),
            other => Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    pub fn default_url() -> Self {
        match url::Url::parse(DEFAULT_DATASET_URL) {
            Ok(url) => Self::Url(url),
            Err(_) => Self::Stdin,
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: format!("quilt/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Loads and decodes the dataset. Blocks until the response arrives, the timeout elapses or the
/// read fails; no retries.
#[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
pub fn fetch_dataset(source: &DatasetSource, options: &FetchOptions) -> Result<RawNode> {
    let bytes = match source {
        DatasetSource::Url(url) => fetch_bytes(url, options)?,
        DatasetSource::File(path) => std::fs::read(path).map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?,
        DatasetSource::Stdin => {
            use std::io::Read;
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|source| FetchError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            buf
        }
    };
    tracing::debug!(bytes = bytes.len(), "dataset loaded");
    decode_dataset(&bytes)
}

/// Decodes dataset JSON, rejecting non-object documents.
pub fn decode_dataset(bytes: &[u8]) -> Result<RawNode> {
    Ok(RawNode::from_json_slice(bytes)?)
}

fn fetch_bytes(url: &url::Url, options: &FetchOptions) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(options.user_agent.as_str())
        .timeout(options.timeout)
        .build()?;

    let response = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .send()?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, status = status.as_u16(), "dataset request failed");
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes()?.to_vec())
}
