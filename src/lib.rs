use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};

use crate::models::config::ServerConfig;
use crate::services::completion::LogCompletion;
use crate::services::preview::PreviewStore;
use crate::services::registry::FormRegistry;

pub mod domain;
pub mod dto;
pub mod models;
pub mod routes;
pub mod services;

const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Cookie signing key derived from the configured secret.
///
/// Secrets shorter than 64 bytes cannot back a key; a random one is used
/// instead, which invalidates sessions on restart.
pub fn session_key(secret: &str) -> Key {
    match Key::try_from(secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            log::warn!("Secret is shorter than 64 bytes, using a random session key");
            Key::generate()
        }
    }
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .build()
}

pub fn flash_framework(key: Key) -> FlashMessagesFramework {
    let store = CookieMessageStore::builder(key).build();
    FlashMessagesFramework::builder(store).build()
}

/// Registers the form routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::main::index)
        .service(routes::main::select_file)
        .service(routes::main::clear_file)
        .service(routes::main::submit_form)
        .service(routes::main::discard_form)
        .service(routes::main::preview);
}

pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let key = session_key(&server_config.secret);
    let registry = web::Data::new(FormRegistry::with_idle_ttl(
        PreviewStore::new(),
        Arc::new(LogCompletion),
        Duration::from_secs(server_config.form_idle_secs),
    ));
    let assets_dir = server_config.assets_dir.clone();

    // Release abandoned forms even when no requests arrive.
    let sweeper = registry.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(IDLE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.evict_idle(Instant::now());
        }
    });

    log::info!(
        "Starting server on {}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(flash_framework(key.clone()))
            .wrap(session_middleware(key.clone()))
            .wrap(Logger::default())
            .app_data(registry.clone())
            .service(Files::new("/assets", &assets_dir))
            .configure(configure)
    })
    .bind((server_config.address.as_str(), server_config.port))?
    .run()
    .await
}
