/// Error-distribution tags emitted by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    PrimaryDecline,
    PrimaryException,
    PrimaryDeclineNoFailover,
    SecondaryDecline,
    SecondaryException,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::PrimaryDecline => "primary-decline",
            ErrorTag::PrimaryException => "primary-exception",
            ErrorTag::PrimaryDeclineNoFailover => "primary-decline-no-failover",
            ErrorTag::SecondaryDecline => "secondary-decline",
            ErrorTag::SecondaryException => "secondary-exception",
        }
    }
}

impl std::fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
