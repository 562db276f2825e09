#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use log::info;
use tl_detector::config::DetectorConfig;
use tl_detector::detect::frame_processor::FrameProcessor;
use tl_detector::detect::light_source::LightSource;
use tl_detector::server;

#[actix_web::main]
async fn main() -> Result<()> {
    let config_path = DetectorConfig::resolve_path(std::env::args().nth(1));
    let config = DetectorConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_max_level(config.logging.level_filter()?)
        .init();
    info!("Loaded configuration from {}", config_path.display());
    info!(
        "{} stop line(s), site mode: {}, state count threshold: {}",
        config.stop_line_positions.len(),
        config.is_site,
        config.state_count_threshold
    );

    let source = LightSource::from_config(&config)?;
    let processor = FrameProcessor::from_config(&config, source);

    server::run(&config.server, processor).await
}
