use thiserror::Error;

pub(crate) const EXCHANGE_FALLBACK_MESSAGE: &str = "Failed to exchange code for tokens";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input was missing or the request was refused locally. No
    /// network call was made.
    Validation,
    /// The token endpoint answered with a non-2xx status.
    Rejected,
    /// Anything else: transport failures, malformed bodies, local io.
    Unexpected,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Client ID is required")]
    MissingClientId,

    #[error("{} required", join_fields(.0))]
    MissingFields(Vec<&'static str>),

    #[error("A token exchange is already in progress")]
    ExchangeInFlight,

    #[error("No authorization code has been received yet")]
    NoAuthorizationCode,

    #[error("state mismatch (expected={expected}, received={received})")]
    StateMismatch { expected: String, received: String },
}

#[derive(Debug, Error)]
pub enum HelperError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The provider redirected back with `?error=...` instead of a code.
    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Unexpected error while contacting the token endpoint")]
    Network(#[from] reqwest::Error),

    #[error("invalid token response: {message}")]
    InvalidResponse { message: String, body: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("navigation failed: {0}")]
    Navigation(String),
}

impl HelperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Rejected { .. } | Self::Denied(_) => ErrorKind::Rejected,
            _ => ErrorKind::Unexpected,
        }
    }
}

fn join_fields(fields: &[&'static str]) -> String {
    let subject = match fields {
        [] => "Nothing".to_string(),
        [only] => capitalize(only),
        [first, second] => format!("{} and {second}", capitalize(first)),
        [first, middle @ .., last] => {
            let mut joined = capitalize(first);
            for field in middle {
                joined.push_str(", ");
                joined.push_str(field);
            }
            format!("{joined}, and {last}")
        }
    };
    let verb = if fields.len() > 1 { "are" } else { "is" };
    format!("{subject} {verb}")
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
