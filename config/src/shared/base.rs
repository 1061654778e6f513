use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("Invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,

    /// A polling or rendering interval is set to zero.
    #[error("Invalid interval config: `{0}` must be greater than zero")]
    ZeroInterval(&'static str),

    /// The retry policy cannot make a single attempt.
    #[error("Invalid retry config: `max_attempts` must be greater than zero")]
    NoRetryAttempts,
}
