use std::fmt;

#[derive(Debug)]
pub enum SoniGraphError {
    Config(ConfigError),
    Expression(ExpressionError),
}

/// Configuration rejected before any evaluation starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidSampleCount { count: usize },
    InvalidDomain { min: f64, max: f64 },
    InvalidDuration { duration: f64 },
    InvalidSampleRate { sample_rate: u32 },
}

/// Failure compiling or evaluating one expression.
#[derive(Debug, Clone)]
pub enum ExpressionError {
    Parse { message: String },
    UnknownVariable { name: String },
    Eval { message: String },
}

impl fmt::Display for SoniGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoniGraphError::Config(e) => write!(f, "Config error: {e}"),
            SoniGraphError::Expression(e) => write!(f, "Expression error: {e}"),
        }
    }
}

impl std::error::Error for SoniGraphError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleCount { count } => {
                write!(f, "Sample count must be positive, got {count}")
            }
            ConfigError::InvalidDomain { min, max } => {
                write!(f, "Domain must satisfy min < max, got [{min}, {max}]")
            }
            ConfigError::InvalidDuration { duration } => {
                write!(f, "Duration must be positive and finite, got {duration}")
            }
            ConfigError::InvalidSampleRate { sample_rate } => {
                write!(f, "Sample rate must be positive, got {sample_rate}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::Parse { message } => write!(f, "Parse failed: {message}"),
            ExpressionError::UnknownVariable { name } => {
                write!(f, "Unknown variable '{name}', only 'x' is bound")
            }
            ExpressionError::Eval { message } => write!(f, "Evaluation failed: {message}"),
        }
    }
}

impl std::error::Error for ExpressionError {}

impl From<ConfigError> for SoniGraphError {
    fn from(e: ConfigError) -> Self {
        SoniGraphError::Config(e)
    }
}

impl From<ExpressionError> for SoniGraphError {
    fn from(e: ExpressionError) -> Self {
        SoniGraphError::Expression(e)
    }
}
