// src/lib.rs

pub mod app_state;
pub mod board;
pub mod category_endpoints;
pub mod config;
pub mod dashboard_data;
pub mod due_date;
pub mod errors;
pub mod filter;
pub mod models;
pub mod routes;
pub mod stats;
pub mod store;
pub mod task_endpoints;
pub mod timestamp;
pub mod validation;
