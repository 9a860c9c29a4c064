use actix_session::Session;
use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::Level;
use lazy_static::lazy_static;
use log::error;
use tera::{Context, Tera};
use uuid::Uuid;

pub mod main;

/// Session key holding the id of the visitor's form.
const FORM_ID_KEY: &str = "form_id";

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                println!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        }
    };
}

fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn render_template(template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok().body(TEMPLATES.render(template, context).unwrap_or_else(|e| {
        error!("Failed to render template {}: {}", template, e);
        String::new()
    }))
}

/// Form id stored in the session, assigning a fresh one when absent.
fn session_form_id(session: &Session) -> Uuid {
    if let Ok(Some(raw)) = session.get::<String>(FORM_ID_KEY) {
        if let Ok(id) = Uuid::parse_str(&raw) {
            return id;
        }
    }

    let id = Uuid::new_v4();
    if let Err(e) = session.insert(FORM_ID_KEY, id.to_string()) {
        error!("Failed to store form id in session: {e}");
    }
    id
}

fn forget_form_id(session: &Session) {
    session.remove(FORM_ID_KEY);
}
