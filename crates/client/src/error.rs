use std::fmt;

/// Error type for remote reads.
#[derive(Debug)]
pub enum FetchError {
    /// Required setting (the secret key) is missing. Not transient.
    Configuration(String),
    /// Non-2xx response. `body` is the raw response text.
    Remote {
        status: u16,
        message: String,
        body: String,
    },
    /// Transport failure (DNS, connect, timeout, body read).
    Network(String),
    /// Response was not the JSON shape we expected.
    Parse(String),
    /// Pagination hit its page ceiling or wall-clock budget.
    PaginationBound(String),
    /// Upstream handed back the same cursor twice.
    PaginationStalled { cursor: String },
}

impl FetchError {
    /// HTTP status for `Remote` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Remote {
                status, message, ..
            } => write!(f, "Stripe error ({status}): {message}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::PaginationBound(msg) => write!(f, "pagination aborted: {msg}"),
            Self::PaginationStalled { cursor } => {
                write!(f, "Stripe pagination stuck: starting_after={cursor} repeated")
            }
        }
    }
}

impl std::error::Error for FetchError {}
