use booking_server::{ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, working directory, logging)
    let config = setup_environment()?;

    print_banner();
    tracing::info!("Veritas booking server starting...");

    // 2. Service stack (database, sessions, reservation engine)
    let state = ServerState::initialize(&config).await?;
    state.start_background_tasks();

    tracing::info!(
        environment = %state.config.environment,
        resources = state.config.resources.len(),
        "Booking server ready"
    );

    // 3. Run until interrupted
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    state.shutdown();

    Ok(())
}
