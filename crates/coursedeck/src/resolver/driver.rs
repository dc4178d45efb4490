//! Drives an [`ImageResolver`] against an [`AssetLoader`].

use serde::Serialize;
use tracing::{debug, instrument};

use super::image::{ImageResolver, ResolverState};
use super::loader::{AssetLoader, ImageFormat};

/// Outcome of a single load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The candidate loaded.
    Loaded {
        /// Detected image format.
        format: ImageFormat,
        /// Payload size.
        byte_len: usize,
    },
    /// The candidate failed.
    Failed {
        /// Loader's description of the failure.
        reason: String,
    },
}

/// One candidate handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    /// Index in the candidate list.
    pub index: usize,
    /// The source that was attempted.
    pub source: String,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Summary of a finished resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Terminal state the resolver settled in.
    pub state: ResolverState,
    /// The effective source after resolution.
    pub source: String,
    /// Attempts in the order they were made.
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    /// Whether a candidate loaded.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ResolverState::Resolved(_))
    }
}

/// Feed load outcomes into `resolver` until it reaches a terminal state.
///
/// Each candidate is handed to the loader at most once. There is no timeout:
/// a load that never completes leaves the future pending, and dropping the
/// future abandons the attempt.
#[instrument(level = "debug", skip_all, fields(loader = loader.name(), candidates = resolver.candidates().len()))]
pub async fn resolve(resolver: &mut ImageResolver, loader: &dyn AssetLoader) -> Resolution {
    let mut attempts = Vec::new();

    while let ResolverState::Attempting(index) = resolver.state() {
        let source = resolver.current_source().to_string();
        let outcome = match loader.load(&source).await {
            Ok(asset) => {
                resolver.on_load_at(index);
                AttemptOutcome::Loaded {
                    format: asset.format,
                    byte_len: asset.byte_len,
                }
            }
            Err(err) => {
                debug!(index = index, error = %err, "candidate failed to load");
                resolver.on_error_at(index);
                AttemptOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        attempts.push(Attempt {
            index,
            source,
            outcome,
        });
    }

    Resolution {
        state: resolver.state(),
        source: resolver.current_source().to_string(),
        attempts,
    }
}
