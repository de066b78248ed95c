use std::path::PathBuf;

/// Errors raised while loading the two startup datasets.
///
/// Every variant is fatal for the session; nothing past startup returns one.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed case table {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("malformed GeoJSON in {}: {source}", path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("malformed TopoJSON in {}: {source}", path.display())]
    TopoJson {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("topology {} has no object named `{object}` (available: {available})", path.display())]
    MissingObject {
        path: PathBuf,
        object: String,
        available: String,
    },

    #[error("arc index {index} out of bounds in {}", path.display())]
    BadArc { path: PathBuf, index: i64 },

    #[error("{} contained no usable {what}", path.display())]
    Empty { path: PathBuf, what: &'static str },
}

/// A month name that is neither a full English month nor a three-letter abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown month `{0}`")]
pub struct MonthParseError(pub String);
