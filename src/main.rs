use anyhow::{Context, Result};
use mvplan::core::config::Config;
use mvplan::services::image::PollinationsClient;
use mvplan::services::llm::GeminiClient;
use mvplan::services::setup;
use mvplan::services::workflow::WorkflowManager;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 1. Load Config
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please provide 'config.yml' or set GEMINI_API_KEY.");
            return Err(e);
        }
    };
    config.ensure_directories()?;

    // 2. Topic, model and style
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli_topic = (!args.is_empty()).then(|| args.join(" "));
    let request = setup::run_setup(&config, cli_topic)?;

    // 3. Clients
    let llm = Box::new(GeminiClient::new(&config.llm));
    let images = Box::new(PollinationsClient::new(&config.image));
    let mut manager = WorkflowManager::new(config.clone(), llm, images);

    // 4. Plan
    println!("Generating plan with {}...", request.model);
    let generated = manager
        .start_project(&request.topic, &request.model)
        .await
        .context("Plan generation failed")?;
    println!("Plan ready (model {}, {} attempt(s)).\n", generated.model, generated.attempts);
    println!("{}", manager.summary());

    // 5. Storyboard
    loop {
        let report = manager.render_storyboard(&request.style).await?;
        println!(
            "Storyboard: {} rendered, {} failed.",
            report.rendered.len(),
            report.failed.len()
        );
        if manager.session().all_scenes_complete() || report.failed.is_empty() {
            break;
        }
        match setup::confirm_retry(&request, report.failed.len()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                // Keep what was rendered.
                log::warn!("Retry prompt failed: {}", e);
                break;
            }
        }
    }

    // 6. Export
    println!("\n{}", manager.summary());
    let dir = manager.export()?;
    println!("Saved to {}", dir.display());

    Ok(())
}
