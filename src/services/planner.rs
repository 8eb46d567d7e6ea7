use log::{info, warn};
use std::time::Duration;
use thiserror::Error;

use crate::core::config::LlmConfig;
use crate::core::plan::{Plan, PlanFormatError};
use crate::services::llm::{LlmClient, LlmError};
use crate::services::script::{build_plan_directive, strip_code_blocks};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Content(#[from] PlanFormatError),

    #[error("all {attempts} model attempts failed; last error: {last_error}")]
    Exhausted { attempts: usize, last_error: String },
}

#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: Plan,
    pub model: String,
    pub attempts: usize,
}

/// Preferred model first, then the fallbacks in order, each model once.
pub fn model_preference(preferred: &str, fallbacks: &[String]) -> Vec<String> {
    let mut models = vec![preferred.to_string()];
    for model in fallbacks {
        if !models.contains(model) {
            models.push(model.clone());
        }
    }
    models
}

pub struct PlanPipeline<'a> {
    llm: &'a dyn LlmClient,
    fallback_models: Vec<String>,
    fallback_delay: Duration,
}

impl<'a> PlanPipeline<'a> {
    pub fn new(llm: &'a dyn LlmClient, config: &LlmConfig) -> Self {
        Self {
            llm,
            fallback_models: config.fallback_models.clone(),
            fallback_delay: config.fallback_delay(),
        }
    }

    pub async fn generate(&self, topic: &str, preferred_model: &str) -> Result<GeneratedPlan, PlanError> {
        let directive = build_plan_directive(topic);
        let models = model_preference(preferred_model, &self.fallback_models);

        let mut last_error = String::new();
        for (i, model) in models.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.fallback_delay).await;
                info!("Falling back to model {}", model);
            }

            match self.attempt(&directive, model).await {
                Ok(plan) => {
                    info!("Plan \"{}\" generated by {} ({} scenes)", plan.title, model, plan.scenes.len());
                    return Ok(GeneratedPlan {
                        plan,
                        model: model.clone(),
                        attempts: i + 1,
                    });
                }
                Err(e) => {
                    warn!("Model {} failed: {}", model, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(PlanError::Exhausted {
            attempts: models.len(),
            last_error,
        })
    }

    async fn attempt(&self, directive: &str, model: &str) -> Result<Plan, PlanError> {
        let text = self.llm.generate(directive, model).await?;
        let payload = strip_code_blocks(&text);
        Ok(Plan::from_json(&payload)?)
    }
}
