// src/main.rs

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use taskflow::app_state::AppState;
use taskflow::board::TaskBoard;
use taskflow::config::Config;
use taskflow::routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let store = config
        .build_store()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    info!("Using {:?} record store", config.backend);

    let board = Arc::new(TaskBoard::new(store));
    // a failed first load leaves the board in its error state until a retry
    if let Err(e) = board.load().await {
        warn!("Initial load failed: {}", e);
    }

    let bind_address = config.bind_address.clone();
    let frontend_origin = config.frontend_origin.clone();
    info!("Server running at http://{}", bind_address);
    info!("Allowed CORS Origin: {}", frontend_origin);

    let state = AppState { board };

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
