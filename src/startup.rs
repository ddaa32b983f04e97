use garagehours::config::Config;
use garagehours::error::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize logging; RUST_LOG overrides the info default
pub fn init_logging() -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;
    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    Config::load().map_err(|e| {
        error!("Failed to load configuration: {:?}", e);
        e.into()
    })
}
