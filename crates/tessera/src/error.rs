//! Unified error type for Tessera.

use tessera_packer::PackerError;
use tessera_session::SessionError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tessera` meta-crate you deal with this single error
/// type. The `#[from]` attributes let `?` convert sub-crate errors
/// automatically.
///
/// The three request-facing variants map onto HTTP status codes without
/// leaking detail:
///
/// | variant          | status |
/// |------------------|--------|
/// | `Unauthorized`   | 401    |
/// | `NotFound`       | 404    |
/// | `InvalidRenewal` | 400    |
#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    /// A packer-level error (length mismatch, decode, truncated).
    #[error(transparent)]
    Packer(#[from] PackerError),

    /// A session-level error (token issuance, storage).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid configuration. Fatal at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request carries no usable token, or its token names a
    /// different session than the one addressed.
    #[error("unauthorized")]
    Unauthorized,

    /// The session does not exist or has expired. The two are
    /// deliberately indistinguishable.
    #[error("session not found")]
    NotFound,

    /// The requested renewal falls outside the session policy.
    #[error("invalid renewal: {0}")]
    InvalidRenewal(String),
}
