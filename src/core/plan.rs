use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Number of scenes the directive asks the model for.
pub const SCENE_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    pub logline: String,
    pub music: MusicBrief,
    pub visual_style: VisualStyle,
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicBrief {
    pub style: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualStyle {
    pub description: String,
    pub character_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_num: u32,
    pub time: String,
    pub action: String,
    pub camera: String,
    pub image_prompt: String,
}

#[derive(Debug, Error)]
pub enum PlanFormatError {
    #[error("invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid plan: {0}")]
    Invalid(String),
}

impl Plan {
    /// Parses already-unwrapped model output. Shape mismatches are rejected
    /// rather than coerced.
    pub fn from_json(text: &str) -> Result<Self, PlanFormatError> {
        let plan: Plan = serde_json::from_str(text)?;
        plan.validate()?;
        if plan.scenes.len() != SCENE_COUNT {
            log::warn!(
                "Plan has {} scenes, expected {}",
                plan.scenes.len(),
                SCENE_COUNT
            );
        }
        Ok(plan)
    }

    fn validate(&self) -> Result<(), PlanFormatError> {
        if self.scenes.is_empty() {
            return Err(PlanFormatError::Invalid("plan has no scenes".to_string()));
        }
        let mut seen = HashSet::new();
        for scene in &self.scenes {
            if scene.scene_num == 0 {
                return Err(PlanFormatError::Invalid(
                    "scene numbers are 1-based".to_string(),
                ));
            }
            if !seen.insert(scene.scene_num) {
                return Err(PlanFormatError::Invalid(format!(
                    "duplicate scene number {}",
                    scene.scene_num
                )));
            }
        }
        Ok(())
    }

    pub fn scene(&self, scene_num: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.scene_num == scene_num)
    }

    pub fn has_scene(&self, scene_num: u32) -> bool {
        self.scene(scene_num).is_some()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::plan_json;
    use super::*;

    #[test]
    fn test_parse_four_scene_plan() {
        let plan = Plan::from_json(&plan_json(4)).unwrap();
        assert_eq!(plan.scenes.len(), 4);
        assert_eq!(plan.scenes[0].scene_num, 1);
        assert_eq!(plan.visual_style.character_prompt, "trench coat detective, cyberpunk");
        assert!(plan.has_scene(4));
        assert!(!plan.has_scene(5));
    }

    #[test]
    fn test_other_scene_counts_are_accepted() {
        let plan = Plan::from_json(&plan_json(3)).unwrap();
        assert_eq!(plan.scenes.len(), 3);
    }

    #[test]
    fn test_empty_scenes_rejected() {
        let err = Plan::from_json(&plan_json(0)).unwrap_err();
        assert!(matches!(err, PlanFormatError::Invalid(_)));
    }

    #[test]
    fn test_duplicate_scene_numbers_rejected() {
        let json = plan_json(2).replace(r#""scene_num": 2"#, r#""scene_num": 1"#);
        let err = Plan::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate scene number 1"));
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = plan_json(4).replace(r#""logline": "A detective walks the rain.","#, "");
        assert!(matches!(
            Plan::from_json(&json),
            Err(PlanFormatError::Json(_))
        ));
    }

    #[test]
    fn test_prose_is_not_json() {
        assert!(Plan::from_json("Sure! Here is your plan.").is_err());
    }
}
