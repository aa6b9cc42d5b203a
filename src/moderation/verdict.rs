use serde::{Deserialize, Serialize};
use super::category::Category;

/// Output of a moderation classifier.
///
/// `is_safe == true` always comes with `category == Category::None` and no
/// flagged categories. Build verdicts through the constructors below to keep
/// that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    pub is_safe: bool,
    /// Primary category. For multi-category verdicts this is the flagged
    /// category with the highest precedence.
    pub category: Category,
    /// Every flagged category, in detection order.
    pub categories: Vec<Category>,
    pub reason: String,
    pub raw_evidence: Evidence,
}

/// Diagnostic payload describing why a verdict was reached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub classifier: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<RuleHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// A single trigger rule that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHit {
    pub category: Category,
    pub pattern: String,
    pub matched: String,
}

impl ModerationVerdict {
    pub fn safe(classifier: &str, reason: impl Into<String>) -> Self {
        Self {
            is_safe: true,
            category: Category::None,
            categories: Vec::new(),
            reason: reason.into(),
            raw_evidence: Evidence {
                classifier: classifier.to_string(),
                ..Default::default()
            },
        }
    }

    /// Unsafe verdict built from the rules that fired. An empty hit list
    /// yields a safe verdict.
    pub fn flagged(classifier: &str, hits: Vec<RuleHit>) -> Self {
        let mut categories: Vec<Category> = Vec::new();
        for hit in &hits {
            if !categories.contains(&hit.category) {
                categories.push(hit.category);
            }
        }

        let Some(primary) = categories.iter().copied().min_by_key(Category::precedence) else {
            return Self::safe(classifier, "no trigger rules matched");
        };

        let names: Vec<&str> = categories.iter().map(Category::as_str).collect();
        Self {
            is_safe: false,
            category: primary,
            categories,
            reason: format!("flagged as {}", names.join(", ")),
            raw_evidence: Evidence {
                classifier: classifier.to_string(),
                hits,
                failure: None,
            },
        }
    }

    /// Indeterminate verdict: treated as safe, with the failure recorded.
    pub fn fail_open(classifier: &str, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        Self {
            is_safe: true,
            category: Category::None,
            categories: Vec::new(),
            reason: format!("classifier failed, passing through: {}", cause),
            raw_evidence: Evidence {
                classifier: classifier.to_string(),
                hits: Vec::new(),
                failure: Some(cause),
            },
        }
    }

    pub fn is_fail_open(&self) -> bool {
        self.raw_evidence.failure.is_some()
    }
}
