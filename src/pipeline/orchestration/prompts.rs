use crate::pipeline::domain::SceneAnalysis;

pub const ANALYSIS_PROMPT: &str = "\
Analyze this image in detail. Provide a comprehensive analysis including:
1. Detailed description of visible elements
2. All objects / features (concise list)
3. Environment type (indoor household vs outdoor/public is critical)
4. Lighting conditions
5. Image quality assessment
6. Environmental or infrastructure issues observable
7. Scale/extent of the issue relative to its category (e.g. small pile vs large accumulation, small crack vs large pothole, single tree vs large clearing)

KEY GATING RULE: Flag indoor/household imagery (kitchen waste, home bins, personal living spaces) distinctly from outdoor/public imagery by setting is_indoor_household. These are NOT legitimate public environmental concerns.

Provide only factual, observable details that can support downstream classification.";

const CLASSIFICATION_INSTRUCTIONS: &str = "\
Based on the detailed image analysis provided, classify this image into one of these categories:

1. garbage: Litter, waste, dumping, public-space pollution (OUTDOOR ONLY)
2. potholes: Road or pavement surface damage in public roads (holes, cracks, erosion)
3. deforestation: Tree removal, stumps, cleared forest areas, logging (OUTDOOR ONLY)
4. reject: Anything else, indoor/household garbage, or irrelevant content

REJECTION RULES:
- Indoor or household garbage -> reject
- Private personal trash not in a public context -> reject
- Ambiguous content not clearly belonging to a defined category -> reject

SEVERITY GUIDELINES:
- 0-30  : low / low-high (minor, limited impact)
- 31-55 : moderate (noticeable, localized impact)
- 56-75 : moderate-high (significant or growing issue)
- 76-90 : high (large, impactful, requires action soon)
- 91-100: extreme (severe, urgent intervention likely needed)

Provide:
- category (or reject)
- severity (0-100) unless reject, otherwise null
- severity_level (one of: low, low-high, moderate, moderate-high, high, extreme) unless reject, otherwise null
- scale (concise phrase, e.g. \"small pothole\", \"large garbage pile\", \"single tree\", \"extensive clearing\") unless reject, otherwise null
- confidence (0.0-1.0)
- reasoning (succinct explanation referencing the analysis evidence)";

/// Decision prompt with the full scene analysis embedded as evidence.
pub fn classification_prompt(analysis: &SceneAnalysis) -> String {
    format!(
        "{CLASSIFICATION_INSTRUCTIONS}

IMAGE ANALYSIS INPUT:
Description: {}
Objects: {}
Environment: {}
Indoor/Household Flag: {}
Lighting: {}
Image Quality: {}
Potential Issues: {}
Legitimacy Assessment: {}

Be conservative: only assign a non-reject category if clearly supported.",
        analysis.description,
        analysis.objects_detected.join(", "),
        analysis.environment_type,
        analysis.is_indoor_household,
        analysis.lighting_conditions,
        analysis.image_quality,
        analysis.potential_issues.join(", "),
        analysis.legitimacy_assessment,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::scene_analysis::fixtures;

    #[test]
    fn analysis_prompt_demands_indoor_flag() {
        assert!(ANALYSIS_PROMPT.contains("is_indoor_household"));
        assert!(ANALYSIS_PROMPT.contains("outdoor/public"));
    }

    #[test]
    fn classification_prompt_embeds_every_evidence_field() {
        let analysis = fixtures::outdoor_pothole();
        let prompt = classification_prompt(&analysis);

        assert!(prompt.contains(&analysis.description));
        assert!(prompt.contains("road, pothole, curb"));
        assert!(prompt.contains("Indoor/Household Flag: false"));
        assert!(prompt.contains("Lighting: natural daylight"));
        assert!(prompt.contains("Potential Issues: road surface damage"));
        assert!(prompt.contains(&analysis.legitimacy_assessment));
    }

    #[test]
    fn classification_prompt_states_rules_and_banding() {
        let prompt = classification_prompt(&fixtures::outdoor_pothole());
        assert!(prompt.contains("REJECTION RULES"));
        assert!(prompt.contains("Private personal trash"));
        assert!(prompt.contains("91-100: extreme"));
        assert!(prompt.contains("56-75 : moderate-high"));
    }
}
