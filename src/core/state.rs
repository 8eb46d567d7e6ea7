use crate::core::plan::Plan;
use image::DynamicImage;
use std::collections::BTreeMap;

/// Per-session context: the current plan and the images rendered for it.
///
/// Images are keyed by scene number and only ever hold scenes of the current
/// plan; starting a new project drops both.
#[derive(Debug, Default)]
pub struct Session {
    plan: Option<Plan>,
    images: BTreeMap<u32, DynamicImage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Clears the previous project before a new plan is requested.
    pub fn begin_project(&mut self) {
        self.reset();
    }

    pub fn set_plan(&mut self, plan: Plan) {
        self.images.clear();
        self.plan = Some(plan);
    }

    pub fn reset(&mut self) {
        self.plan = None;
        self.images.clear();
    }

    /// Returns false (and stores nothing) when the scene is not part of the
    /// current plan.
    pub fn record_image(&mut self, scene_num: u32, image: DynamicImage) -> bool {
        match &self.plan {
            Some(plan) if plan.has_scene(scene_num) => {
                self.images.insert(scene_num, image);
                true
            }
            _ => false,
        }
    }

    pub fn image(&self, scene_num: u32) -> Option<&DynamicImage> {
        self.images.get(&scene_num)
    }

    pub fn images(&self) -> &BTreeMap<u32, DynamicImage> {
        &self.images
    }

    pub fn has_image(&self, scene_num: u32) -> bool {
        self.images.contains_key(&scene_num)
    }

    pub fn all_scenes_complete(&self) -> bool {
        match &self.plan {
            Some(plan) => self.images.len() == plan.scenes.len(),
            None => false,
        }
    }
}
