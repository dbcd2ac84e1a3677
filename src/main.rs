use mirror_fix_gateway::bootstrap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let registry = bootstrap::setup().await?;

    tracing::info!("mirror-fix-gateway started");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining sessions");

    bootstrap::shutdown(&registry).await;
    tracing::info!("mirror-fix-gateway stopped");
    Ok(())
}
