use thiserror::Error;

/// Error type shared by every stage of the annotation pipeline.
///
/// `Parse`, `Projection` and `ConsolidationAmbiguity` are record-local: callers log them
/// and keep going. Everything else aborts the run.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Malformed {context} record at line {line}: {message}")]
    Parse {
        context: String,
        line: usize,
        message: String,
    },

    #[error("Unrecognized breakend grammar for variant {id}: {alt}")]
    Projection { id: String, alt: String },

    #[error("Variant {id} from {origin} is not present in the input VCF")]
    Join { id: String, origin: String },

    #[error("External tool {tool} failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error("Variant {id} has {count} hits sharing rank {rank}; ordering them by start and repeat name")]
    ConsolidationAmbiguity { id: String, rank: u64, count: usize },

    #[error("Invalid variant identity at line {line}: {message}")]
    VariantIdentity { line: usize, message: String },

    #[error("Output file already exists: {0}")]
    OutputExists(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Regex compilation error: {0}")]
    Regex(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraceError {
    pub fn parse(context: &str, line: usize, message: impl Into<String>) -> Self {
        TraceError::Parse {
            context: context.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Whether the error only concerns one record and processing may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TraceError::Parse { .. }
                | TraceError::Projection { .. }
                | TraceError::ConsolidationAmbiguity { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
