use thiserror::Error;

/// Failures the engine surfaces to its caller.
///
/// A search that finds nothing feasible is not in this taxonomy on purpose:
/// the optimizer returns its baseline-only option list and the chip planner
/// an empty ranking, so "no recommendation" stays distinct from a failure.
/// Numeric degeneracies (zero maxima, unparseable text metrics) are likewise
/// substituted with neutral values at the point of use, never raised.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A fetch failed or returned empty where non-empty data was required.
    /// The engine does not retry; freshness is the provider's problem.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// The input roster breaks a quota/budget invariant the caller is
    /// supposed to maintain. Signals a caller bug, fatal to the call.
    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    /// Underlying provider failure (network, decode), passed through.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}
