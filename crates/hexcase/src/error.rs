//! Error types for case generation.

use thiserror::Error;

/// Errors that can occur while configuring or assembling a case half.
#[derive(Error, Debug)]
pub enum CaseError {
    /// A length, radius or height is non-positive, non-finite, or does not
    /// fit inside the case footprint.
    #[error("invalid dimension `{field}` = {value}: {reason}")]
    InvalidDimension {
        /// Configuration field at fault.
        field: &'static str,
        /// Offending value.
        value: f64,
        /// Why the value was rejected.
        reason: String,
    },

    /// Honeycomb pitches derived from the hex cell are not positive.
    #[error("degenerate honeycomb tiling: pitches {horizontal} x {vertical}")]
    DegenerateTiling {
        /// Horizontal (X) pitch.
        horizontal: f64,
        /// Vertical (Y) pitch.
        vertical: f64,
    },

    /// Tessellation resolution too low to approximate a curved surface.
    #[error("tessellation resolution must be at least 3 segments, got {0}")]
    InvalidResolution(u32),

    /// The top/bottom flags do not select exactly one case half.
    #[error("is_top = {is_top} and is_bottom = {is_bottom} do not select exactly one case half")]
    AmbiguousVariant {
        /// Value of the `is_top` flag.
        is_top: bool,
        /// Value of the `is_bottom` flag.
        is_bottom: bool,
    },

    /// Reading a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid TOML for [`crate::CaseConfig`].
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration could not be rendered as TOML.
    #[error("config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl CaseError {
    /// Configuration field responsible for the error, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CaseError::InvalidDimension { field, .. } => Some(field),
            CaseError::DegenerateTiling { .. } => Some("hex_inner_width"),
            CaseError::InvalidResolution(_) => Some("tessellation_resolution"),
            CaseError::AmbiguousVariant { .. } => Some("is_top"),
            CaseError::Io(_) | CaseError::Toml(_) | CaseError::TomlSer(_) => None,
        }
    }
}

/// Result type for case generation.
pub type Result<T> = std::result::Result<T, CaseError>;
