use anyhow::{Context, Result};
use rune_config::{CONFIG_FILE, MotionConfig, Scenario};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scenes;
use scenes::Scene;

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Value of a `--flag=value` argument.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter().find_map(|a| a.strip_prefix(flag))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = match arg_value(&args, "--config=") {
        Some(path) => MotionConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => MotionConfig::load_from_path(CONFIG_FILE)?,
    };
    config
        .merge_with_env()
        .context("Invalid environment override")?;
    if let Some(name) = arg_value(&args, "--scenario=") {
        config.demo.scenario = name.parse()?;
    }

    init_tracing(&config.logging.filter);
    info!(scenario = %config.demo.scenario, "starting scenario runner");

    let mut scenes: Vec<Box<dyn Scene>> = match config.demo.scenario {
        Scenario::Single => vec![Box::new(scenes::single::SingleScene::new(
            config.transition.clone(),
        ))],
        Scenario::Modes => vec![Box::new(scenes::modes::ModesScene::new(
            config.transition.clone(),
        ))],
        Scenario::Group => vec![Box::new(scenes::group::GroupScene::new(
            config.group.clone(),
        ))],
        Scenario::All => vec![
            Box::new(scenes::single::SingleScene::new(config.transition.clone())),
            Box::new(scenes::modes::ModesScene::new(config.transition.clone())),
            Box::new(scenes::group::GroupScene::new(config.group.clone())),
        ],
    };

    for scene in &mut scenes {
        info!(scene = scene.name(), "running scene");
        scene
            .run()
            .with_context(|| format!("Scene {} failed", scene.name()))?;
    }
    info!("all scenes settled");
    Ok(())
}
