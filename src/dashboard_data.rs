// src/dashboard_data.rs

use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use serde::Serialize;

use crate::app_state::AppState;
use crate::stats::TaskStats;

/// Header counters plus whether they come from a loaded snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(flatten)]
    pub stats: TaskStats,
    pub loaded: bool,
    pub error: Option<&'static str>,
}

/// GET /dashboard
/// Counters and load status are read from the same snapshot.
pub async fn get_dashboard(data: web::Data<AppState>) -> impl Responder {
    let snapshot = data.board.snapshot().await;
    HttpResponse::Ok().json(DashboardData {
        stats: snapshot.stats(&Local::now()),
        loaded: snapshot.loaded,
        error: snapshot.load_error,
    })
}
