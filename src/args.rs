use clap::Parser;
use std::path::PathBuf;

use waycast::Config;

#[derive(Parser, Debug)]
#[command(name = "waycast")]
#[command(version)]
#[command(about = "Headless Wayland compositor core", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/waycast.toml")]
    pub config: PathBuf,

    /// Output width
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height
    #[arg(long)]
    pub height: Option<u32>,

    /// Verbose logging
    #[arg(short, long, action)]
    pub verbose: bool,
}

impl Args {
    pub fn load_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        Config::load(&self.config)
    }
}
