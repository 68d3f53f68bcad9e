use sales_dashboard::{DashboardConfig, app};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    // Optional config file as the first argument
    let config_path = args.get(1).map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref())?;

    // Start the web application
    app::run(config).await?;

    Ok(())
}
