use crate::core::config::Config;
use crate::services::planner::model_preference;
use anyhow::{anyhow, Result};
use inquire::{Confirm, Select, Text};

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRequest {
    pub topic: String,
    pub model: String,
    pub style: String,
    /// False when the run was started from the command line or unattended;
    /// no prompts are shown after setup either.
    pub interactive: bool,
}

/// Collects topic, preferred model and image style. A topic given on the
/// command line, or `unattended: true`, skips the prompts and uses the
/// configured model and style.
pub fn run_setup(config: &Config, cli_topic: Option<String>) -> Result<ProjectRequest> {
    let cli_topic = cli_topic.filter(|t| !t.trim().is_empty());

    if cli_topic.is_some() || config.unattended {
        let topic = cli_topic.ok_or_else(|| anyhow!("Unattended mode needs a topic argument"))?;
        return Ok(ProjectRequest {
            topic,
            model: config.llm.model.clone(),
            style: config.image.style.clone(),
            interactive: false,
        });
    }

    let topic = Text::new("Video topic:")
        .with_placeholder("cyberpunk detective, rainy night")
        .prompt()?;
    if topic.trim().is_empty() {
        return Err(anyhow!("Topic must not be empty"));
    }

    let models = model_preference(&config.llm.model, &config.llm.fallback_models);
    let model = Select::new("Preferred model:", models).prompt()?;

    let styles = style_options(&config.image.style, &config.image.styles);
    let style = Select::new("Image style:", styles).prompt()?;

    Ok(ProjectRequest {
        topic,
        model,
        style,
        interactive: true,
    })
}

pub fn confirm_retry(request: &ProjectRequest, failed: usize) -> Result<bool> {
    if !request.interactive {
        return Ok(false);
    }
    let answer = Confirm::new(&format!("{} scene(s) have no image. Retry them?", failed))
        .with_default(true)
        .prompt()?;
    Ok(answer)
}

fn style_options(default: &str, styles: &[String]) -> Vec<String> {
    let mut options = vec![default.to_string()];
    for style in styles {
        if !options.contains(style) {
            options.push(style.clone());
        }
    }
    options
}
