//! Errors raised while building a model or decoding a sequence.
use std::fmt;

/// Everything that can go wrong, either at model construction or
/// at the start of a decoding call. None of these are retriable:
/// the same input fails the same way every time.
#[derive(Debug, Clone, PartialEq)]
pub enum HmmError {
    /// Weights of a distribution do not sum to one (within tolerance).
    InvalidDistribution { sum: f64 },
    /// A weight is negative. Reported with the offending label.
    NegativeWeight { label: String, weight: f64 },
    /// Rows of a matrix disagree on their target-label set.
    InconsistentColumns { row: String },
    /// A state label absent from the canonical label set.
    UnknownLabel(String),
    /// An observation symbol absent from the emission columns.
    UnknownSymbol { position: usize, symbol: String },
    /// Decoding requested on a zero-length observation sequence.
    EmptySequence,
}

impl fmt::Display for HmmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HmmError::InvalidDistribution { sum } => {
                write!(f, "weights sum to {sum}, not 1")
            }
            HmmError::NegativeWeight { label, weight } => {
                write!(f, "negative weight {weight} for label {label:?}")
            }
            HmmError::InconsistentColumns { row } => {
                write!(f, "row {row:?} disagrees on the target-label set")
            }
            HmmError::UnknownLabel(label) => write!(f, "unknown label {label:?}"),
            HmmError::UnknownSymbol { position, symbol } => {
                write!(f, "unknown symbol {symbol:?} at position {position}")
            }
            HmmError::EmptySequence => write!(f, "empty observation sequence"),
        }
    }
}

impl std::error::Error for HmmError {}
