use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use furnish::{assets::FsAssetLoader, FurnishApp, ViewerConfig};
use log::info;

/// Arrange furniture in a 3D room
#[derive(Parser, Debug)]
#[command(name = "furnish", version, about)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory model and texture paths are resolved against
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Window width in logical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in logical pixels
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Could not load configuration from {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(assets) = args.assets {
        config.asset_root = assets;
    }
    if let Some(width) = args.width {
        config.window.width = width;
    }
    if let Some(height) = args.height {
        config.window.height = height;
    }

    info!("Loading assets from {}", config.asset_root.display());
    let loader = FsAssetLoader::new(config.asset_root.clone());
    let app = FurnishApp::new(&config, Box::new(loader))?;
    app.run()
}
