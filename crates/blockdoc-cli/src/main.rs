use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use blockdoc_config::EngineConfig;
use blockdoc_engine::{Engine, LineSplitterService, MarkdownParseService, ParseService};
use clap::Parser;

#[derive(Parser)]
#[command(name = "blockdoc-cli", version, about = "Show the block model of a markdown file")]
struct Cli {
    /// Markdown file to load
    file: PathBuf,

    /// Print rendered markup instead of the block list
    #[arg(long)]
    html: bool,

    /// Only show blocks visible at SCROLL_TOP within HEIGHT
    #[arg(long, num_args = 2, value_names = ["SCROLL_TOP", "HEIGHT"])]
    window: Option<Vec<f64>>,

    /// Use the local line splitter instead of the markdown parser
    #[arg(long)]
    fallback: bool,

    /// Config file (defaults to ~/.config/blockdoc/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let loaded = match path {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::load()?,
    };
    match loaded {
        Some(config) => Ok(config),
        None => {
            log::info!("No config file found, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let service: Arc<dyn ParseService> = if cli.fallback {
        Arc::new(LineSplitterService)
    } else {
        Arc::new(MarkdownParseService::default())
    };
    let mut engine = Engine::new(service, &config);
    engine.set_content(&text).await;

    if let Err(violation) = engine.check_invariants() {
        log::warn!("Block model does not match buffer: {violation}");
    }

    let range = match cli.window.as_deref() {
        Some([scroll_top, height]) => {
            let window = engine.visible_window(*scroll_top, *height);
            println!(
                "window {}..{} of {} (spacers {:.1} / {:.1}, total {:.1})",
                window.range.start,
                window.range.end,
                engine.blocks().len(),
                window.leading_spacer,
                window.trailing_spacer,
                engine.total_height()
            );
            window.range
        }
        _ => 0..engine.blocks().len(),
    };

    for block in &engine.blocks()[range] {
        if cli.html {
            println!("{}", blockdoc_engine::render::render(block));
            continue;
        }
        let first_line = block.content.lines().next().unwrap_or_default();
        println!(
            "{:<14} {:>6}..{:<6} {:<24} {}",
            block.kind.as_str(),
            block.from(),
            block.to(),
            block.id.as_str(),
            first_line
        );
    }

    Ok(())
}
