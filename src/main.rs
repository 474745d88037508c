use calendar_dashboard::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar dashboard");

    // Load configuration
    let config = startup::load_config()?;

    // Serve until shut down
    startup::run(config).await
}
