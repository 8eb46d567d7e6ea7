use crate::core::plan::SCENE_COUNT;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Builds the plan directive for a topic. The template is fixed; only the
/// topic varies.
pub fn build_plan_directive(topic: &str) -> String {
    format!(
        r#"You are a music video director. Create a music video plan for the topic below.

Topic: {topic}

Return JSON ONLY, no prose and no explanations, matching this schema exactly:
{{
  "title": "video title",
  "logline": "one-sentence story summary",
  "music": {{
    "style": "genre and mood",
    "prompt": "music generation prompt in English (genre, instruments, bpm, mood)"
  }},
  "visual_style": {{
    "description": "overall look and palette",
    "character_prompt": "English description of the main character for image generation"
  }},
  "scenes": [
    {{
      "scene_num": 1,
      "time": "0:00-0:15",
      "action": "what happens in the shot",
      "camera": "camera movement and framing",
      "image_prompt": "English image generation prompt for this shot"
    }}
  ]
}}

Rules:
- Exactly {SCENE_COUNT} scenes, numbered 1 to {SCENE_COUNT} in order.
- title, logline, music.style, visual_style.description, time, action and camera are written in the same language as the topic.
- music.prompt, visual_style.character_prompt and every image_prompt are written in English.
"#
    )
}

/// Returns the payload inside a markdown code fence, preferring a fence
/// labelled `json` over an unlabelled one. Text without a fence is returned
/// unchanged.
pub fn strip_code_blocks(s: &str) -> String {
    if let Some(start) = s.find(JSON_FENCE) {
        return fence_body(&s[start + JSON_FENCE.len()..]);
    }
    if let Some(start) = s.find(FENCE) {
        return fence_body(&s[start + FENCE.len()..]);
    }
    s.to_string()
}

fn fence_body(rest: &str) -> String {
    let body = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    };
    body.trim().to_string()
}
