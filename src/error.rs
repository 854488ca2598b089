//! Errors raised while mounting the backdrop.
//!
//! Nothing past mount can fail: missing zones or a hidden window degrade to
//! no-ops instead of surfacing an error.

use thiserror::Error;

/// Reasons the backdrop cannot be mounted. Only the backdrop is skipped, the
/// host app keeps running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackdropError {
    /// There is no primary window to draw into
    #[error("no primary window to host the particle backdrop")]
    NoPrimaryWindow,

    /// The drawing surface has no usable area
    #[error("canvas of {width}x{height} has no drawable area")]
    InvalidCanvas { width: f32, height: f32 },
}

pub type Result<T> = std::result::Result<T, BackdropError>;
