use formats::LandParseError;

/// Why a dataset could not be produced. Only network and payload problems
/// surface here; durable cache failures are logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Http { url: String, message: String },
    HttpStatus { url: String, status: u16 },
    InvalidData { context: &'static str, detail: String },
    Aborted,
}

impl LoadError {
    pub fn invalid_payload(err: LandParseError) -> Self {
        LoadError::InvalidData {
            context: "land collection",
            detail: err.to_string(),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Http { url, message } => write!(f, "request to {url} failed: {message}"),
            LoadError::HttpStatus { url, status } => write!(f, "HTTP {status} from {url}"),
            LoadError::InvalidData { context, detail } => write!(f, "invalid {context}: {detail}"),
            LoadError::Aborted => write!(f, "load aborted"),
        }
    }
}

impl std::error::Error for LoadError {}
