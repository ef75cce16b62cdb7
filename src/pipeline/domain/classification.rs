use crate::model::StructuredOutput;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

pub const MAX_SEVERITY: u8 = 100;
pub const INDOOR_HOUSEHOLD_CONFIDENCE: f64 = 0.95;
pub const INDOOR_HOUSEHOLD_REASONING: &str = "Image identified as household/indoor garbage which is not appropriate for environmental monitoring.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Garbage,
    Potholes,
    Deforestation,
    Reject,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Garbage,
        Category::Potholes,
        Category::Deforestation,
        Category::Reject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Garbage => "garbage",
            Category::Potholes => "potholes",
            Category::Deforestation => "deforestation",
            Category::Reject => "reject",
        }
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Category::Reject)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityLevel {
    Low,
    LowHigh,
    Moderate,
    ModerateHigh,
    High,
    Extreme,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 6] = [
        SeverityLevel::Low,
        SeverityLevel::LowHigh,
        SeverityLevel::Moderate,
        SeverityLevel::ModerateHigh,
        SeverityLevel::High,
        SeverityLevel::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::LowHigh => "low-high",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::ModerateHigh => "moderate-high",
            SeverityLevel::High => "high",
            SeverityLevel::Extreme => "extreme",
        }
    }

    /// Canonical level for a severity score. The 0-30 band admits both
    /// `low` and `low-high`; it is split at 15 here.
    pub fn from_severity(severity: u8) -> Self {
        match severity {
            0..=15 => SeverityLevel::Low,
            16..=30 => SeverityLevel::LowHigh,
            31..=55 => SeverityLevel::Moderate,
            56..=75 => SeverityLevel::ModerateHigh,
            76..=90 => SeverityLevel::High,
            _ => SeverityLevel::Extreme,
        }
    }

    /// Whether this level falls in the band that `severity` belongs to.
    pub fn matches_severity(&self, severity: u8) -> bool {
        match Self::from_severity(severity) {
            SeverityLevel::Low | SeverityLevel::LowHigh => {
                matches!(self, SeverityLevel::Low | SeverityLevel::LowHigh)
            }
            banded => banded == *self,
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision. `confidence` and `reasoning` are kept for auditing only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClassificationWire")]
pub struct ClassificationResult {
    pub category: Category,
    pub severity: Option<u8>,
    pub severity_level: Option<SeverityLevel>,
    pub scale: Option<String>,
    pub confidence: f64,
    pub reasoning: String,
}

/// Model reply as sent. Severity is any integer until the category is known.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassificationWire {
    category: Category,
    #[serde(default)]
    severity: Option<i64>,
    #[serde(default)]
    severity_level: Option<SeverityLevel>,
    #[serde(default)]
    scale: Option<String>,
    confidence: f64,
    reasoning: String,
}

impl TryFrom<ClassificationWire> for ClassificationResult {
    type Error = String;

    fn try_from(wire: ClassificationWire) -> Result<Self, Self::Error> {
        // A reject's severity is discarded anyway, whatever its value.
        let severity = match wire.severity {
            _ if wire.category.is_reject() => None,
            Some(severity) => Some(
                u8::try_from(severity)
                    .ok()
                    .filter(|severity| *severity <= MAX_SEVERITY)
                    .ok_or_else(|| format!("severity {severity} is outside 0-{MAX_SEVERITY}"))?,
            ),
            None => None,
        };

        Ok(Self {
            category: wire.category,
            severity,
            severity_level: wire.severity_level,
            scale: wire.scale,
            confidence: wire.confidence,
            reasoning: wire.reasoning,
        })
    }
}

impl ClassificationResult {
    /// Deterministic rejection for indoor/household imagery.
    pub fn indoor_household_reject() -> Self {
        Self {
            category: Category::Reject,
            severity: None,
            severity_level: None,
            scale: None,
            confidence: INDOOR_HOUSEHOLD_CONFIDENCE,
            reasoning: INDOOR_HOUSEHOLD_REASONING.to_string(),
        }
    }

    /// A reject never carries severity, severity level or scale, whatever
    /// the model sent.
    pub fn enforce_reject_invariant(mut self) -> Self {
        if self.category.is_reject() {
            self.severity = None;
            self.severity_level = None;
            self.scale = None;
        }
        self
    }

    /// Bring a non-reject level in line with the severity banding: a
    /// missing or out-of-band level is replaced by the banded one.
    pub fn normalize_severity_level(mut self) -> Self {
        let Some(severity) = self.severity.filter(|_| !self.category.is_reject()) else {
            return self;
        };

        match self.severity_level {
            Some(level) if level.matches_severity(severity) => {}
            Some(level) => {
                let banded = SeverityLevel::from_severity(severity);
                tracing::warn!(
                    "Severity level {} inconsistent with severity {}, using {}",
                    level,
                    severity,
                    banded
                );
                self.severity_level = Some(banded);
            }
            None => self.severity_level = Some(SeverityLevel::from_severity(severity)),
        }

        self
    }
}

impl StructuredOutput for ClassificationResult {
    const SCHEMA_NAME: &'static str = "classification_result";

    fn json_schema() -> Value {
        let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        let mut levels: Vec<Value> = SeverityLevel::ALL
            .iter()
            .map(|level| Value::from(level.as_str()))
            .collect();
        levels.push(Value::Null);

        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["category", "severity", "severity_level", "scale", "confidence", "reasoning"],
            "properties": {
                "category": {
                    "type": "string",
                    "enum": categories,
                    "description": "Classification category or 'reject' if the image doesn't fit any category"
                },
                "severity": {
                    "type": ["integer", "null"],
                    "description": "Severity score from 0-100, or null if category is 'reject'"
                },
                "severity_level": {
                    "type": ["string", "null"],
                    "enum": levels,
                    "description": "Severity level, or null if category is 'reject'"
                },
                "scale": {
                    "type": ["string", "null"],
                    "description": "Size/extent of the issue (e.g. 'small pothole', 'large garbage pile', 'single tree'), or null if category is 'reject'"
                },
                "confidence": {
                    "type": "number",
                    "description": "Confidence score for the classification (0.0 to 1.0)"
                },
                "reasoning": {
                    "type": "string",
                    "description": "Explanation for the classification and severity score"
                }
            }
        })
    }

    fn validate(&self) -> Result<(), String> {
        // A reject's severity fields are discarded, so only decisions are range-checked.
        if let Some(severity) = self.severity.filter(|_| !self.category.is_reject()) {
            if severity > MAX_SEVERITY {
                return Err(format!("severity {severity} is outside 0-{MAX_SEVERITY}"));
            }
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} is outside 0.0-1.0", self.confidence));
        }
        if !self.category.is_reject() {
            if self.severity.is_none() {
                return Err(format!("category {} requires a severity", self.category));
            }
            if self.scale.as_deref().is_none_or(|scale| scale.trim().is_empty()) {
                return Err(format!("category {} requires a scale", self.category));
            }
        }
        Ok(())
    }
}
