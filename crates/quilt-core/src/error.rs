/// Errors surfaced while decoding a dataset into a hierarchy.
///
/// Malformed `value` fields never end up here: they are coerced to `0` while building.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dataset JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dataset: {message}")]
    InvalidDataset { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
