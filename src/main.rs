use lane_backend::{AppError, Configuration, ServerBuilder};
use tracing_subscriber::EnvFilter;

fn init_logging(configuration: &Configuration) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&configuration.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let configuration = Configuration::load()?;
    init_logging(&configuration);

    let server = ServerBuilder::new(configuration).build().await?;
    server.start().await
}
