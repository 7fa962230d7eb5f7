#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
    #[error("invalid cell key '{0}', expected row-col")]
    InvalidCell(String),
    #[error("invalid stitch name '{0}'")]
    InvalidStitch(String),
    #[error("parameter '{param}' must be finite")]
    NonFinite { param: &'static str },
    #[error("parameter '{param}' out of range [{min}, {max}]: {got}")]
    OutOfRange {
        param: &'static str,
        min: f32,
        max: f32,
        got: f32,
    },
    #[error("invalid chart config: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Stable short code used by host bindings.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidColor(_) => "invalid_color",
            Error::InvalidCell(_) => "invalid_cell",
            Error::InvalidStitch(_) => "invalid_stitch",
            Error::NonFinite { .. } => "non_finite",
            Error::OutOfRange { .. } => "out_of_range",
            Error::Config(_) => "invalid_config",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
