use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no definition found for `{term}`")]
    NotFound { term: String },
    #[error("upstream transport failure: {0}")]
    Transport(String),
    #[error("upstream response could not be parsed: {0}")]
    Parse(String),
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),
    #[error("no random word above {threshold} approvals after {attempts} attempts")]
    RetriesExhausted { attempts: u32, threshold: i64 },
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}
