use thiserror::Error;

/// Fast-fail validation errors surfaced to callers as client errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A coordinate is non-finite or outside its valid domain.
    #[error("invalid {field}: {value} is not a finite in-domain coordinate")]
    Coordinate { field: &'static str, value: f64 },

    /// Criterion weights must sum to exactly 1.0 (within epsilon).
    #[error("criterion weights sum to {sum}, expected 1.0")]
    WeightSum { sum: f64 },

    /// A query parameter failed validation.
    #[error("invalid query parameter {param}: {reason}")]
    QueryParam { param: &'static str, reason: String },
}
