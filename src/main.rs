//! Focus monitoring application: webcam attention tracking with an annotated preview.

use anyhow::Result;
use clap::Parser;
use focus_monitor::{
    app::{AppConfig, FocusMonitor},
    capture::VideoSource,
    config::Config,
};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process instead of a camera
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    // Load configuration if provided
    let mut settings = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(cam) = args.cam {
        settings.capture.camera_index = cam;
    }

    let config = AppConfig {
        video_source: if let Some(video_path) = args.video {
            VideoSource::File(video_path)
        } else {
            VideoSource::Camera(settings.capture.camera_index)
        },
        settings,
    };

    println!(
        "Focus Monitoring - Press '{}' to quit",
        config.settings.display.quit_key
    );

    // Monitor is dropped at the end of the block, releasing camera and window
    let summary = {
        let mut monitor = FocusMonitor::new(&config)?;
        monitor.run()?
    };

    info!("Processed {} frame(s)", summary.frames_processed);
    println!("Monitoring Stopped.");
    println!("Total Blinks: {}", summary.total_blinks);

    Ok(())
}
