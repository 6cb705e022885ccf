//! Dashboard web server
//!
//! Serves the single-page dashboard and the JSON endpoints its script
//! calls: dropdown options plus the three chart figures. Chart state lives
//! entirely in the page; handlers recompute figures from the processor on
//! every request and degrade to the empty figure when a query fails.

mod charts;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::processor::{Processor, COL_CATEGORY, COL_PERIOD};

/// Shared dashboard state. The mutex exists because the monthly summary
/// writes the derived `month` column back into the table.
pub struct AppState {
    processor: Mutex<Processor>,
}

#[derive(Deserialize)]
struct CategoryQuery {
    category: Option<String>,
}

#[derive(Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    categories: Vec<String>,
    periods: Vec<String>,
}

pub async fn run(processor: Processor, bind_address: &str) -> anyhow::Result<()> {
    if processor.is_empty() {
        log::warn!("No data available for visualization.");
    } else {
        log::info!("Data loaded successfully for visualization.");
    }

    let state = Arc::new(AppState {
        processor: Mutex::new(processor),
    });

    let app = Router::new()
        .route("/", get(dashboard_page))
        .route("/app.js", get(dashboard_script))
        .route("/api/options", get(get_options))
        .route("/api/charts/category", get(category_chart))
        .route("/api/charts/monthly", get(monthly_chart))
        .route("/api/charts/comparison", get(comparison_chart))
        .with_state(state);

    let listener = TcpListener::bind(bind_address).await?;
    log::info!("Dashboard listening on http://{}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn dashboard_page() -> Html<&'static str> {
    Html(include_str!("assets/index.html"))
}

async fn dashboard_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("assets/app.js"),
    )
}

/// Dropdown contents: unique categories and periods in sheet order.
async fn get_options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    let processor = state.processor.lock().unwrap();
    let table = processor.table();
    Json(OptionsResponse {
        categories: table.unique_text(COL_CATEGORY),
        periods: table.unique_text(COL_PERIOD),
    })
}

/// Pie figure: subcategory breakdown when a category is selected,
/// category breakdown otherwise.
async fn category_chart(
    Query(query): Query<CategoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let processor = state.processor.lock().unwrap();

    let figure = match selected(query.category) {
        Some(category) => processor
            .subcategory_summary(&category)
            .map(|summary| charts::subcategory_pie(&summary, &category)),
        None => processor
            .category_summary()
            .map(|summary| charts::category_pie(&summary)),
    };

    Json(figure.unwrap_or_else(|e| {
        log::error!("Failed to update pie chart: {}", e);
        charts::empty_figure()
    }))
}

/// Bar figure: per-category totals for the selected period, monthly
/// totals otherwise.
async fn monthly_chart(
    Query(query): Query<PeriodQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let mut processor = state.processor.lock().unwrap();

    let figure = match selected(query.period) {
        Some(period) => processor
            .period_category_summary(&period)
            .map(|summary| charts::period_bar(&summary, &period)),
        None => processor
            .monthly_summary()
            .map(|summary| charts::monthly_bar(&summary)),
    };

    Json(figure.unwrap_or_else(|e| {
        log::error!("Failed to update bar chart: {}", e);
        charts::empty_figure()
    }))
}

/// Grouped mean vs median bars per category.
async fn comparison_chart(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let processor = state.processor.lock().unwrap();

    let figure = processor
        .category_mean_median()
        .map(|stats| charts::comparison_bars(&stats));

    Json(figure.unwrap_or_else(|e| {
        log::error!("Failed to update comparison chart: {}", e);
        charts::empty_figure()
    }))
}

/// A dropdown with nothing chosen submits an empty string.
fn selected(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
