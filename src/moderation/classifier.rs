use crate::errors::GatewayError;
use super::verdict::ModerationVerdict;
use tracing::warn;

/// Pluggable text classifier.
///
/// Implementors only provide [`try_classify`](Self::try_classify). Callers use
/// [`classify`](Self::classify), which never fails: an internal error becomes a
/// fail-open verdict (`is_safe = true`) with the cause recorded in `reason`.
pub trait ModerationClassifier: Send + Sync {
    /// Classifier name recorded in verdict evidence and logs.
    fn name(&self) -> &str;

    fn try_classify(&self, text: &str) -> Result<ModerationVerdict, GatewayError>;

    fn classify(&self, text: &str) -> ModerationVerdict {
        match self.try_classify(text) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(classifier = self.name(), error = %e, "Moderation failed, treating as safe");
                ModerationVerdict::fail_open(self.name(), e.to_string())
            }
        }
    }
}
