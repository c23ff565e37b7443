use livefit_backend::api;
use livefit_backend::database::Database;
use livefit_backend::food::aliases::AliasTable;
use livefit_backend::food::api::UsdaClient;
use livefit_backend::food::classify::HybridClassifier;
use livefit_backend::food::config::FoodConfig;
use livefit_backend::food::ifct::{CompositionTable, IfctSource};
use livefit_backend::food::resolve::FoodResolver;
use livefit_backend::food::traits::NutrientSource;

use clap::Parser;
use dotenv::dotenv;
use log::{info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (the PORT env var wins when set)
    #[arg(long, default_value = "4000")]
    port: u16,

    /// SQLite food log location
    #[arg(long, default_value = "livefit.db")]
    db: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(args.port);

    let config = FoodConfig::from_env();
    if config.usda_api_key.is_none() {
        warn!("USDA_API_KEY not set; remote nutrition lookups will fail");
    }
    if config.roboflow_api_key.is_none() || config.roboflow_model.is_none() {
        warn!("Roboflow not configured; image classification has no fallback tier");
    }

    let table = CompositionTable::bundled()?;
    let classifier = HybridClassifier::new(&config);
    let sources: Vec<Box<dyn NutrientSource>> = vec![
        Box::new(IfctSource::new(table)),
        Box::new(UsdaClient::new(&config)),
    ];
    let resolver = FoodResolver::new(AliasTable::bundled(), Box::new(classifier), sources);

    let db = Database::new(&args.db).await?;

    let app = api::create_api(resolver, db);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server running at http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
