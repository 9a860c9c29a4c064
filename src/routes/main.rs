use actix_multipart::Multipart;
use actix_session::Session;
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, Responder, error::ErrorNotFound, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Context;
use uuid::Uuid;

use crate::domain::FieldId;
use crate::domain::rules::{DOCUMENT_TYPES, IMAGE_TYPES};
use crate::routes::{
    alert_level_to_str, forget_form_id, redirect, render_template, session_form_id,
};
use crate::services::ServiceError;
use crate::services::registry::FormRegistry;
use crate::services::upload::read_selection;

#[get("/")]
pub async fn index(
    session: Session,
    flash_messages: IncomingFlashMessages,
    registry: web::Data<FormRegistry>,
) -> impl Responder {
    let form_id = session_form_id(&session);

    let alerts: Vec<_> = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("form", &registry.view(&form_id));
    context.insert("document_types", &DOCUMENT_TYPES.join(", "));
    context.insert("image_types", &IMAGE_TYPES.join(", "));

    render_template("main/index.html", &context)
}

#[post("/form/select/{field}")]
pub async fn select_file(
    field: web::Path<String>,
    session: Session,
    registry: web::Data<FormRegistry>,
    payload: Multipart,
) -> impl Responder {
    let field = match field.parse::<FieldId>() {
        Ok(field) => field,
        Err(_) => return HttpResponse::NotFound().finish(),
    };
    let form_id = session_form_id(&session);

    let file = match read_selection(payload, field).await {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Failed to read {field} upload: {e}");
            return HttpResponse::BadRequest().finish();
        }
    };

    registry.select(form_id, field, file);

    redirect("/")
}

#[post("/form/clear/{field}")]
pub async fn clear_file(
    field: web::Path<String>,
    session: Session,
    registry: web::Data<FormRegistry>,
) -> impl Responder {
    let field = match field.parse::<FieldId>() {
        Ok(field) => field,
        Err(_) => return HttpResponse::NotFound().finish(),
    };
    let form_id = session_form_id(&session);
    registry.clear(&form_id, field);

    redirect("/")
}

#[post("/form/submit")]
pub async fn submit_form(session: Session, registry: web::Data<FormRegistry>) -> impl Responder {
    let form_id = session_form_id(&session);

    match registry.submit(form_id) {
        Ok(()) => FlashMessage::success("Form submitted.").send(),
        // Field errors are rendered inline.
        Err(ServiceError::IncompleteForm) | Err(ServiceError::InvalidFields) => {}
        Err(e) => {
            log::error!("Failed to submit form {form_id}: {e:?}");
            FlashMessage::error("Failed to submit the form.").send();
        }
    }

    redirect("/")
}

#[post("/form/discard")]
pub async fn discard_form(session: Session, registry: web::Data<FormRegistry>) -> impl Responder {
    let form_id = session_form_id(&session);
    if registry.discard(&form_id) {
        log::debug!("Discarded form {form_id}");
    }
    forget_form_id(&session);

    redirect("/")
}

#[get("/preview/{token}")]
pub async fn preview(
    token: web::Path<String>,
    registry: web::Data<FormRegistry>,
) -> actix_web::Result<HttpResponse> {
    let entry = Uuid::parse_str(&token)
        .ok()
        .and_then(|token| registry.previews().resolve(&token))
        .ok_or_else(|| ErrorNotFound(ServiceError::PreviewNotFound.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(entry.content_type)
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .body(entry.content.to_vec()))
}
