use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Please provide at least one of: query, category or seller id")]
    InvalidCriteria,

    #[error("Items per request must be at least 1, got {0}")]
    InvalidPageSize(usize),

    #[error("No results found. Please try other search parameters")]
    NoResultsFound { probe_url: Option<String> },

    #[error("Pagination stalled at offset {offset}: fetched {fetched} of {target} rows")]
    ShortPagination {
        fetched: usize,
        target: usize,
        offset: usize,
    },

    #[error("Listing {id} is missing field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("Listing {id} has malformed timestamp {value:?}")]
    MalformedTimestamp { id: String, value: String },

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("No items selected for the visits lookup")]
    EmptyColumnSet,

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Two rows share an id after deduplication. Never caused by caller input.
    #[error("Duplicate listing id after deduplication: {0}")]
    DuplicateKey(String),
}

pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// `NoResultsFound` is an expected outcome rather than a failure.
    pub fn is_no_results(&self) -> bool {
        matches!(self, ScoutError::NoResultsFound { .. })
    }

    /// Errors scoped to a single listing, which the skip policy may absorb.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            ScoutError::MissingField { .. } | ScoutError::MalformedTimestamp { .. }
        )
    }
}
