// src/task_endpoints.rs

use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use log::{debug, info};
use serde_json::json;

use crate::app_state::{board_error_response, AppState};
use crate::filter::TaskFilter;
use crate::models::TaskId;
use crate::validation::TaskDraft;

/// GET /tasks?search=&category=&status=&priority=
/// The filtered task list, with each task's category and due status resolved.
pub async fn list_tasks(data: web::Data<AppState>, filter: web::Query<TaskFilter>) -> impl Responder {
    debug!("Received list_tasks request with filter: {:?}", filter);
    let view = data.board.view(&filter, &Local::now()).await;
    HttpResponse::Ok().json(view)
}

/// GET /tasks/{id}
pub async fn get_task(data: web::Data<AppState>, path: web::Path<TaskId>) -> impl Responder {
    let task_id = path.into_inner();
    match data.board.task(task_id).await {
        Ok(Some(task)) => HttpResponse::Ok().json(task),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Task not found" })),
        Err(e) => board_error_response(&e),
    }
}

/// POST /tasks
pub async fn create_task(data: web::Data<AppState>, draft: web::Json<TaskDraft>) -> impl Responder {
    debug!("Received create_task request with payload: {:?}", draft);
    match data.board.create_task(&draft).await {
        Ok(applied) => HttpResponse::Created().json(applied),
        Err(e) => board_error_response(&e),
    }
}

/// PUT /tasks/{id}
/// Saves the edit form. Completion is not part of the form and stays as is.
pub async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<TaskId>,
    draft: web::Json<TaskDraft>,
) -> impl Responder {
    let task_id = path.into_inner();
    debug!("Received update_task request for {} with payload: {:?}", task_id, draft);
    match data.board.update_task(task_id, &draft).await {
        Ok(applied) => HttpResponse::Ok().json(applied),
        Err(e) => board_error_response(&e),
    }
}

/// POST /tasks/{id}/toggle
pub async fn toggle_task(data: web::Data<AppState>, path: web::Path<TaskId>) -> impl Responder {
    let task_id = path.into_inner();
    match data.board.toggle_complete(task_id).await {
        Ok(applied) => HttpResponse::Ok().json(applied),
        Err(e) => board_error_response(&e),
    }
}

/// DELETE /tasks/{id}
pub async fn delete_task(data: web::Data<AppState>, path: web::Path<TaskId>) -> impl Responder {
    let task_id = path.into_inner();
    match data.board.delete_task(task_id).await {
        Ok(applied) => HttpResponse::Ok().json(applied),
        Err(e) => board_error_response(&e),
    }
}

/// POST /tasks/reload
/// Retry after a failed load.
pub async fn reload_tasks(data: web::Data<AppState>) -> impl Responder {
    info!("Reloading tasks on request");
    match data.board.retry().await {
        Ok(()) => {
            let snapshot = data.board.snapshot().await;
            HttpResponse::Ok().json(json!({
                "tasks": snapshot.tasks.len(),
                "categories": snapshot.categories.len(),
            }))
        }
        Err(e) => board_error_response(&e),
    }
}
