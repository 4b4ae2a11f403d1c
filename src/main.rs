use async_trait::async_trait;
use neonpose::common::frame::FrameUpdate;
use neonpose::coordinator::CoordinatorBuilder;
use neonpose::error::EngineError;
use neonpose::provider::LandmarkProvider;
use neonpose::Configuration;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

/// Stand-in provider until a real pose model is wired up; yields no frames,
/// which the engine treats as skipped ticks.
struct IdleProvider;

#[async_trait]
impl LandmarkProvider for IdleProvider {
    async fn next_update(&mut self) -> Option<FrameUpdate> {
        tokio::time::sleep(std::time::Duration::from_millis(33)).await;
        None
    }
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    init_logging();
    let configuration = Configuration::default();
    let coordinator = CoordinatorBuilder::new(configuration)
        .provider(Box::new(IdleProvider))
        .build()?;

    tokio::signal::ctrl_c().await.ok();
    coordinator.shutdown().await;
    Ok(())
}
