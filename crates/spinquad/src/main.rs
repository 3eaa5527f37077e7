use anyhow::Result;

use spinquad_engine::core::SceneConfig;
use spinquad_engine::device::SessionInit;
use spinquad_engine::logging::{LoggingConfig, init_logging};
use spinquad_engine::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig::default();
    log::info!(
        "spinquad v{} starting on canvas '{}'",
        env!("CARGO_PKG_VERSION"),
        config.canvas_name
    );

    Runtime::run(config, SessionInit::default(), SceneConfig::default())?;

    log::info!("spinquad exited cleanly");
    Ok(())
}
