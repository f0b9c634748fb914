mod assets;
mod certificate;
mod config;
mod error;
mod exam;
mod identity;
mod services;
mod state;
mod storage;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::storage::{Database, TemplateRepository};
use actix_files::Files;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::fs;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let db = match Database::open(&config.storage.database) {
        Ok(db) => db,
        Err(e) => {
            error!("Cannot open database {}: {}", config.storage.database.display(), e);
            std::process::exit(1);
        }
    };
    // Explicit singleton initialization instead of creating it on first read.
    match db.ensure_template() {
        Ok(template) => info!(
            "Certificate template ready (year {}, last number {:03})",
            template.current_year, template.last_sequence
        ),
        Err(e) => {
            error!("Cannot initialize certificate template: {}", e);
            std::process::exit(1);
        }
    }

    fs::create_dir_all(&config.storage.uploads_dir)?;
    if let Some(dir) = &config.storage.pdf_cache_dir {
        fs::create_dir_all(dir)?;
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let json_limit = config.server.json_limit_bytes;
    let uploads_dir = config.storage.uploads_dir.clone();
    let state = AppState::new(db, config);

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(state.clone()))
            .service(services::certificates::configure_routes())
            .service(services::exams::configure_routes())
            .service(Files::new("/uploads", uploads_dir.clone()))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
