use crate::core::config::Config;
use crate::core::state::Session;
use crate::services::image::ImageSource;
use crate::services::llm::LlmClient;
use crate::services::planner::{GeneratedPlan, PlanError, PlanPipeline};
use crate::services::storyboard::{SceneOutcome, Storyboard, StoryboardReport};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub struct WorkflowManager {
    config: Config,
    llm: Box<dyn LlmClient>,
    images: Box<dyn ImageSource>,
    session: Session,
}

impl WorkflowManager {
    pub fn new(config: Config, llm: Box<dyn LlmClient>, images: Box<dyn ImageSource>) -> Self {
        Self {
            config,
            llm,
            images,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drops the current project and requests a new plan.
    pub async fn start_project(&mut self, topic: &str, model: &str) -> Result<GeneratedPlan, PlanError> {
        self.session.begin_project();
        let pipeline = PlanPipeline::new(self.llm.as_ref(), &self.config.llm);
        let generated = pipeline.generate(topic, model).await?;
        self.session.set_plan(generated.plan.clone());
        Ok(generated)
    }

    /// Fetches every scene that has no image yet.
    pub async fn render_storyboard(&mut self, style: &str) -> Result<StoryboardReport> {
        let pending = Storyboard::pending(&self.session);
        if pending.is_empty() {
            return Ok(StoryboardReport::default());
        }

        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"));

        let storyboard = Storyboard::new(self.images.as_ref(), style);
        let report = storyboard
            .render_pending(&mut self.session, |scene_num, outcome| {
                match outcome {
                    SceneOutcome::Failed(e) => pb.println(format!("Scene {}: no image ({})", scene_num, e)),
                    _ => pb.set_message(format!("scene {}", scene_num)),
                }
                pb.inc(1);
            })
            .await;
        pb.finish_and_clear();

        Ok(report)
    }

    /// Writes `plan.json` and one PNG per rendered scene into a folder named
    /// after the plan title.
    pub fn export(&self) -> Result<PathBuf> {
        let plan = self.session.plan().context("No plan to export")?;
        let dir = Path::new(&self.config.output_folder).join(folder_name(&plan.title));
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;

        let content = serde_json::to_string_pretty(plan)?;
        fs::write(dir.join("plan.json"), content)?;

        for (scene_num, image) in self.session.images() {
            let path = dir.join(format!("scene_{:02}.png", scene_num));
            image
                .save(&path)
                .with_context(|| format!("Failed to write {:?}", path))?;
        }
        Ok(dir)
    }

    pub fn summary(&self) -> String {
        let Some(plan) = self.session.plan() else {
            return "No plan.".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", plan.title);
        let _ = writeln!(out, "  {}", plan.logline);
        let _ = writeln!(out, "Music: {} | {}", plan.music.style, plan.music.prompt);
        let _ = writeln!(out, "Look:  {}", plan.visual_style.description);
        for scene in &plan.scenes {
            let mark = if self.session.has_image(scene.scene_num) { "✓" } else { "✗" };
            let _ = writeln!(
                out,
                "[{}] #{} {} | {} | camera: {}",
                mark, scene.scene_num, scene.time, scene.action, scene.camera
            );
        }
        out
    }
}

fn folder_name(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "plan".to_string()
    } else {
        name
    }
}
