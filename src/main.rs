mod adapters;
mod api;
mod config;
mod core_logic;
mod error;

use adapters::openai::OpenAiClient;
use adapters::yahoo_finance::YahooFinanceClient;
use api::routes::{routes, AppState};
use config::Config;
use core_logic::narrative::NarrativeComposer;
use error::AppError;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warp::Filter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("earnings_analyzer=info,warp=info")),
        )
        .init();

    let config = Config::from_env()?;

    let market = YahooFinanceClient::new(&config.yahoo_base_url, config.http_timeout)?;
    let model = OpenAiClient::new(config.openai.clone(), config.http_timeout)?;

    let state = AppState {
        market: Arc::new(market),
        composer: Arc::new(NarrativeComposer::new(Arc::new(model))),
        price_period: config.price_period.clone(),
    };

    info!(
        "Starting web server on {} (model {}, price period {})",
        config.bind_addr, config.openai.model, config.price_period
    );
    warp::serve(routes(state).with(warp::trace::request()))
        .run(config.bind_addr)
        .await;

    Ok(())
}
