pub mod image;
pub mod llm;
pub mod planner;
pub mod script;
pub mod setup;
pub mod storyboard;
pub mod workflow;
