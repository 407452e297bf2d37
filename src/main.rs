use docbroker::cli::{self, Invocation};
use docbroker::config::AppConfig;
use docbroker::db::ConnectionManager;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let invocation = cli::parse();
    let connections = ConnectionManager::mongo(&config);

    if invocation != Invocation::Serve {
        if let Err(e) = cli::run(&invocation, &config, &connections).await {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    info!(
        port = config.port,
        env = %config.env,
        mongodb_uri = %config
            .mongodb_uri
            .as_ref()
            .map(|t| t.redacted())
            .unwrap_or_else(|| "<none>".to_string()),
        "starting server"
    );

    docbroker::build(config, connections)?.launch().await?;

    Ok(())
}
