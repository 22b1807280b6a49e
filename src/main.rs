//! waycast - standalone runner
//!
//! Starts the headless compositor on its own and logs every event the
//! bus publishes, so the pipeline can be exercised without an embedding
//! host: `WAYLAND_DISPLAY=<socket> <application>`.

mod args;

use args::Args;
use clap::Parser;
use log::{info, warn};
use waycast::{Config, Event, HeadlessCompositor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::init_from_env(
        env_logger::Env::default()
            .filter_or("WAYCAST_LOG", if args.verbose { "debug" } else { "info" }),
    );

    info!("waycast v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match args.load_config() {
        Ok(cfg) => {
            info!("Loaded configuration from {:?}", args.config);
            cfg
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    if let Some(width) = args.width {
        config.display.width = width;
    }
    if let Some(height) = args.height {
        config.display.height = height;
    }

    let mut compositor = HeadlessCompositor::initialize(config)?;
    info!(
        "Run applications with: WAYLAND_DISPLAY={} <application>",
        compositor.socket_name()
    );

    for name in Event::NAMES {
        compositor.add_event_listener(name, |event| match event {
            Event::SurfaceImage { wid, image } => {
                let first_pixel = &image.bytes[..image.bytes.len().min(4)];
                info!(
                    "event surface-image: wid={} {} first_pixel={:?}",
                    wid, image, first_pixel
                );
            }
            other => info!("event {}: {:?}", other.name(), other),
        })?;
    }

    let result = compositor.run();
    compositor.cleanup();
    result
}
