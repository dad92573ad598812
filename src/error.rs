use thiserror::Error;

/// Top-level error type for picforge.
#[derive(Debug, Error)]
pub enum PicError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    PortMismatch(#[from] PortMismatchError),
}

/// Invalid or missing template / component parameters.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("parameter {parameter} = {value} is out of range ({reason})")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown template option `{0}`")]
    UnknownOption(String),

    #[error("invalid template options: {0}")]
    Invalid(String),
}

/// A parameter combination yields a degenerate, self-intersecting or
/// radius-violating shape.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("segment {index} is too short ({available:.4}) to host the required bends ({required:.4})")]
    SegmentTooShort {
        index: usize,
        available: f64,
        required: f64,
    },

    #[error("radius of curvature {radius:.4} is below the bend radius {bend_radius:.4}")]
    RadiusViolation { radius: f64, bend_radius: f64 },

    #[error("sub-features overlap: {0}")]
    Overlap(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("polygon on layer {layer}/{datatype} is self-intersecting")]
    SelfIntersecting { layer: u16, datatype: u16 },
}

/// A supplied port is incompatible with the consuming component.
#[derive(Debug, Error)]
pub enum PortMismatchError {
    #[error("port width {found:.4} does not match the expected cross-section width {expected:.4}")]
    Width { expected: f64, found: f64 },

    #[error("no port with role `{0}`")]
    UnknownRole(String),
}

/// Convenience type alias for results using [`PicError`].
pub type Result<T> = std::result::Result<T, PicError>;

impl ConfigurationError {
    /// Shorthand for an out-of-range parameter error.
    #[must_use]
    pub fn out_of_range(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        Self::OutOfRange {
            parameter,
            value,
            reason,
        }
    }
}

/// Fails with [`ConfigurationError::OutOfRange`] unless `value > 0` and finite.
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::out_of_range(parameter, value, "must be > 0").into())
    }
}

/// Fails with [`ConfigurationError::OutOfRange`] unless `value >= 0` and finite.
pub(crate) fn require_non_negative(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::out_of_range(parameter, value, "must be >= 0").into())
    }
}
