use crate::model::StructuredOutput;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Evidence extracted from the image by the vision call.
///
/// Decoded in one piece from the model output, so a context either holds a
/// complete analysis or none at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneAnalysis {
    pub description: String,
    pub objects_detected: Vec<String>,
    pub environment_type: String,
    pub is_indoor_household: bool,
    pub lighting_conditions: String,
    pub image_quality: String,
    pub potential_issues: Vec<String>,
    pub legitimacy_assessment: String,
}

impl StructuredOutput for SceneAnalysis {
    const SCHEMA_NAME: &'static str = "scene_analysis";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": [
                "description",
                "objects_detected",
                "environment_type",
                "is_indoor_household",
                "lighting_conditions",
                "image_quality",
                "potential_issues",
                "legitimacy_assessment"
            ],
            "properties": {
                "description": {
                    "type": "string",
                    "description": "Detailed description of what's visible in the image"
                },
                "objects_detected": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Main objects, features, or elements detected in the image"
                },
                "environment_type": {
                    "type": "string",
                    "description": "Type of environment (urban, rural, indoor, outdoor, etc.)"
                },
                "is_indoor_household": {
                    "type": "boolean",
                    "description": "True for indoor/household garbage or personal living spaces, false for outdoor/public areas"
                },
                "lighting_conditions": {
                    "type": "string",
                    "description": "Lighting conditions (bright, dim, natural, artificial, etc.)"
                },
                "image_quality": {
                    "type": "string",
                    "description": "Assessment of image quality (clear, blurry, high-resolution, etc.)"
                },
                "potential_issues": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Environmental or infrastructure issues visible"
                },
                "legitimacy_assessment": {
                    "type": "string",
                    "description": "Whether this is a legitimate public environmental/infrastructure concern or household/personal waste"
                }
            }
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        Ok(())
    }
}
