use std::sync::Arc;

use actix_web::HttpResponse;
use log::error;
use serde_json::json;

use crate::board::TaskBoard;
use crate::errors::BoardError;

#[derive(Clone)]
pub struct AppState {
    pub board: Arc<TaskBoard>,
}

/// Map a board failure onto the response the frontend expects.
pub fn board_error_response(err: &BoardError) -> HttpResponse {
    match err {
        BoardError::Validation(errors) => HttpResponse::UnprocessableEntity().json(json!({
            "message": "Please fix the highlighted fields",
            "errors": errors,
        })),
        BoardError::Load { message, source } if source.is_not_found() => {
            HttpResponse::NotFound().json(json!({ "message": message }))
        }
        BoardError::Load { message, source } => {
            error!("Load failed: {}", source);
            HttpResponse::ServiceUnavailable().json(json!({
                "message": message,
                "retry": true,
            }))
        }
        BoardError::Mutation { source, .. } if source.is_not_found() => {
            HttpResponse::NotFound().json(json!({ "message": source.to_string() }))
        }
        BoardError::Mutation { message, .. } => {
            HttpResponse::BadGateway().json(json!({ "message": message }))
        }
    }
}
