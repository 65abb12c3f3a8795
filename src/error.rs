use thiserror::Error;

/// Failures surfaced by the sampling and cleanup engines.
///
/// Per-path problems during a scan or an execution are not errors; they are
/// recorded in the corresponding report so every enumerated path stays
/// accounted for. Nothing here terminates the process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// One tick's counter read failed. Previous values are held and the next
    /// tick retries; never fatal.
    #[error("counter sampling failed: {0}")]
    TransientSample(String),

    /// The executor was handed a plan without the explicit confirmation gate.
    /// Fatal to that call, not to the process. No filesystem mutation occurs.
    #[error("cleanup plan was not confirmed")]
    ConfirmationMissing,

    /// A second scan or execution was requested while one of the same kind
    /// was still running.
    #[error("another {0} operation is already running")]
    Busy(&'static str),
}
