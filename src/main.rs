use nexus_gateway::config::loader::load_from_env;
use nexus_gateway::lifecycle::startup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Gateway stopped with an error");
        return Err(e.into());
    }
    Ok(())
}
