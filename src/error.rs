use thiserror::Error;

/// Why a single pattern token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// A cell value other than 0 or 1.
    #[error("cell value {0} is not 0 or 1")]
    ValueOutOfRange(String),
    /// A `*` with no digits after it.
    #[error("run is missing its count")]
    MissingCount,
    /// A run count too large to represent.
    #[error("run count {0} is too large")]
    CountOutOfRange(String),
    /// A character that cannot start a token.
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
}

#[derive(Debug, Error)]
pub enum LifeError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },
    #[error("malformed pattern at line {line}, column {column}: {reason}")]
    MalformedPattern {
        /// 0-based line index in the document.
        line: usize,
        /// 0-based character offset within the line.
        column: usize,
        reason: MalformedReason,
    },
    #[error("pattern partially loaded: {} malformed line(s), {applied_cells} live cell(s) applied", .errors.len())]
    PartialLoad {
        applied_cells: usize,
        errors: Vec<LifeError>,
    },
    #[error("playback rate must be at least 1 generation per second, got {0}")]
    InvalidRate(i64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read pattern file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LifeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_pattern_message_names_position_and_reason() {
        let err = LifeError::MalformedPattern {
            line: 2,
            column: 4,
            reason: MalformedReason::UnexpectedChar('x'),
        };
        assert_eq!(
            err.to_string(),
            "malformed pattern at line 2, column 4: unexpected character 'x'"
        );
        assert_eq!(
            MalformedReason::ValueOutOfRange("7".into()).to_string(),
            "cell value 7 is not 0 or 1"
        );
    }
}
