use super::classification::{Category, ClassificationResult, SeverityLevel};
use serde::{Deserialize, Serialize};

/// The only externally visible shape: four fields, nulls kept in the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicResult {
    pub category: Category,
    pub severity: Option<u8>,
    pub severity_level: Option<SeverityLevel>,
    pub scale: Option<String>,
}

impl PublicResult {
    /// The canonical fallback when no trustworthy decision exists.
    pub fn safe_reject() -> Self {
        Self {
            category: Category::Reject,
            severity: None,
            severity_level: None,
            scale: None,
        }
    }

    pub fn is_reject(&self) -> bool {
        self.category.is_reject()
    }

    /// `reject` exactly when all three severity fields are null.
    pub fn is_consistent(&self) -> bool {
        let all_null =
            self.severity.is_none() && self.severity_level.is_none() && self.scale.is_none();
        let all_set =
            self.severity.is_some() && self.severity_level.is_some() && self.scale.is_some();
        if self.is_reject() { all_null } else { all_set }
    }
}

impl From<&ClassificationResult> for PublicResult {
    fn from(classification: &ClassificationResult) -> Self {
        Self {
            category: classification.category,
            severity: classification.severity,
            severity_level: classification.severity_level,
            scale: classification.scale.clone(),
        }
    }
}
