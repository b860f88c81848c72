//! scout-query - run analytics queries through the Scout query client.

mod cli;

use cli::{query_request, Cli, Command};
use scout_query::backend::MockBackend;
use scout_query::client::QueryClient;
use scout_query::config::ClientConfig;
use scout_query::error::Result;
use scout_query::logging;
use scout_query::output;
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(2);
        }
    }
}

/// Runs the selected command. Returns whether the query succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = ClientConfig::resolve(Some(&config_path), &cli.overrides())?;

    let client = if cli.mock {
        QueryClient::with_backends(
            config,
            Arc::new(MockBackend::new()),
            Arc::new(MockBackend::new()),
        )
    } else {
        QueryClient::from_config(config)?
    };
    debug!("Resolved config: {:?}", client.config());

    let result = match &cli.command {
        Command::Kpis => client.aggregate_kpis().await,
        Command::Stores => client.store_ranking().await,
        Command::Trends => client.transaction_trends().await,
        Command::Query {
            text,
            params,
            target,
        } => {
            client
                .execute_query(query_request(text, params, target.as_deref()))
                .await
        }
    };

    println!("{}", output::render(&result, cli.format));
    Ok(result.succeeded())
}
