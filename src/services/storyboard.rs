use log::{info, warn};

use crate::core::plan::{Plan, Scene};
use crate::core::state::Session;
use crate::services::image::{ImageFetchError, ImageSource};

#[derive(Debug)]
pub enum SceneOutcome {
    /// The image was stored; the session changed and should be redrawn.
    Rendered,
    /// Nothing was stored; the scene stays pending and can be retried.
    Failed(ImageFetchError),
    /// The scene number is not part of the current plan.
    Unknown,
}

#[derive(Debug, Default)]
pub struct StoryboardReport {
    pub rendered: Vec<u32>,
    pub failed: Vec<(u32, ImageFetchError)>,
}

pub struct Storyboard<'a> {
    images: &'a dyn ImageSource,
    style: String,
}

pub fn scene_prompt(plan: &Plan, scene: &Scene) -> String {
    format!("{}, {}", plan.visual_style.character_prompt, scene.image_prompt)
}

impl<'a> Storyboard<'a> {
    pub fn new(images: &'a dyn ImageSource, style: &str) -> Self {
        Self {
            images,
            style: style.to_string(),
        }
    }

    /// Scenes of the current plan that have no image yet, in plan order.
    pub fn pending(session: &Session) -> Vec<u32> {
        session
            .plan()
            .map(|plan| {
                plan.scenes
                    .iter()
                    .map(|s| s.scene_num)
                    .filter(|n| !session.has_image(*n))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn render_scene(&self, session: &mut Session, scene_num: u32) -> SceneOutcome {
        let prompt = match session
            .plan()
            .and_then(|plan| plan.scene(scene_num).map(|scene| scene_prompt(plan, scene)))
        {
            Some(prompt) => prompt,
            None => return SceneOutcome::Unknown,
        };

        match self.images.fetch(&prompt, &self.style).await {
            Ok(image) => {
                session.record_image(scene_num, image);
                info!("Scene {} rendered", scene_num);
                SceneOutcome::Rendered
            }
            Err(e) => {
                warn!("Scene {} image failed: {}", scene_num, e);
                SceneOutcome::Failed(e)
            }
        }
    }

    /// Renders the first pending scene, if any. At most one fetch.
    pub async fn render_next(&self, session: &mut Session) -> Option<(u32, SceneOutcome)> {
        let scene_num = *Self::pending(session).first()?;
        Some((scene_num, self.render_scene(session, scene_num).await))
    }

    /// Renders every pending scene once, calling `on_scene` after each fetch.
    pub async fn render_pending<F>(&self, session: &mut Session, mut on_scene: F) -> StoryboardReport
    where
        F: FnMut(u32, &SceneOutcome),
    {
        let mut report = StoryboardReport::default();
        for scene_num in Self::pending(session) {
            let outcome = self.render_scene(session, scene_num).await;
            on_scene(scene_num, &outcome);
            match outcome {
                SceneOutcome::Rendered => report.rendered.push(scene_num),
                SceneOutcome::Failed(e) => report.failed.push((scene_num, e)),
                SceneOutcome::Unknown => {}
            }
        }
        report
    }
}
