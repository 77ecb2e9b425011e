use thiserror::Error;

/// Errors raised while loading fonts.
///
/// Drawing and cache maintenance never fail; only font loading does.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("no font face matches families [{families}]")]
    NotFound { families: String },

    #[error("font face {face} has no readable data")]
    FaceUnavailable { face: String },

    #[error("failed to parse font face {face}: {reason}")]
    Parse { face: String, reason: String },

    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
}
