use actix_web::web;

use crate::category_endpoints::{create_category, delete_category, list_categories, update_category};
use crate::dashboard_data::get_dashboard;
use crate::task_endpoints::{
    create_task, delete_task, get_task, list_tasks, reload_tasks, toggle_task, update_task,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // TASKS
        .service(
            web::scope("/tasks")
                .route("", web::get().to(list_tasks))
                .route("", web::post().to(create_task))
                .route("/reload", web::post().to(reload_tasks))
                .route("/{task_id}", web::get().to(get_task))
                .route("/{task_id}", web::put().to(update_task))
                .route("/{task_id}", web::delete().to(delete_task))
                .route("/{task_id}/toggle", web::post().to(toggle_task)),
        )
        // CATEGORIES
        .service(
            web::scope("/categories")
                .route("", web::get().to(list_categories))
                .route("", web::post().to(create_category))
                .route("/{category_id}", web::put().to(update_category))
                .route("/{category_id}", web::delete().to(delete_category)),
        )
        .service(web::resource("/dashboard").route(web::get().to(get_dashboard)));
}
