use crate::adapters::MarketDataClient;
use crate::api::models::{AnalyzeParameters, ErrorBody};
use crate::api::report::{home_page, render_report};
use crate::core_logic::analysis::analyze_stock;
use crate::core_logic::narrative::NarrativeComposer;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::{reject, Filter, Rejection, Reply};

#[derive(Debug)]
pub struct MissingTicker;

impl reject::Reject for MissingTicker {}

#[derive(Debug)]
pub struct AnalysisFailed(pub String);

impl reject::Reject for AnalysisFailed {}

/// Shared, read-only collaborators handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub market: Arc<dyn MarketDataClient>,
    pub composer: Arc<NarrativeComposer>,
    pub price_period: String,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let home_route = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(home_page()));

    let analyze_route = warp::path("analyze_earnings")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<AnalyzeParameters>())
        .and(with_state(state))
        .and_then(analyze_earnings);

    home_route.or(analyze_route).recover(handle_rejection)
}

async fn analyze_earnings(
    params: AnalyzeParameters,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let ticker = params
        .ticker()
        .ok_or_else(|| reject::custom(MissingTicker))?;

    info!("Analyzing earnings for {}", ticker);
    match analyze_stock(
        state.market.as_ref(),
        &state.composer,
        &ticker,
        &state.price_period,
    )
    .await
    {
        Ok(report) => {
            info!(
                "Report ready for {} ({} ratio trends fitted)",
                ticker,
                report.trends.len()
            );
            Ok(warp::reply::html(render_report(&report)))
        }
        Err(e) => {
            error!("Analysis failed for {}: {}", ticker, e);
            Err(reject::custom(AnalysisFailed(e.to_string())))
        }
    }
}

fn error_reply(status: StatusCode, message: String) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.find::<MissingTicker>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            "Please provide a ticker symbol".to_string(),
        )
    } else if let Some(AnalysisFailed(message)) = err.find::<AnalysisFailed>() {
        (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
    } else if err.find::<reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(error_reply(status, message))
}
