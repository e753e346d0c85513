// src/category_endpoints.rs

use actix_web::{web, HttpResponse, Responder};
use log::debug;

use crate::app_state::{board_error_response, AppState};
use crate::models::CategoryId;
use crate::validation::CategoryDraft;

/// GET /categories
/// Categories as of the last load, ordered by name.
pub async fn list_categories(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.board.categories().await)
}

/// POST /categories
pub async fn create_category(
    data: web::Data<AppState>,
    draft: web::Json<CategoryDraft>,
) -> impl Responder {
    debug!("Received create_category request with payload: {:?}", draft);
    match data.board.create_category(&draft).await {
        Ok(applied) => HttpResponse::Created().json(applied),
        Err(e) => board_error_response(&e),
    }
}

/// PUT /categories/{id}
pub async fn update_category(
    data: web::Data<AppState>,
    path: web::Path<CategoryId>,
    draft: web::Json<CategoryDraft>,
) -> impl Responder {
    let category_id = path.into_inner();
    debug!(
        "Received update_category request for {} with payload: {:?}",
        category_id, draft
    );
    match data.board.update_category(category_id, &draft).await {
        Ok(applied) => HttpResponse::Ok().json(applied),
        Err(e) => board_error_response(&e),
    }
}

/// DELETE /categories/{id}
/// Tasks that reference the category keep their id and show no category.
pub async fn delete_category(
    data: web::Data<AppState>,
    path: web::Path<CategoryId>,
) -> impl Responder {
    match data.board.delete_category(path.into_inner()).await {
        Ok(applied) => HttpResponse::Ok().json(applied),
        Err(e) => board_error_response(&e),
    }
}
