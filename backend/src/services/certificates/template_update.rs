//! `PUT /api/certificates/template`
//!
//! Multipart form with three optional parts:
//! - `gerenteNombre`: text, the manager name printed under the signature.
//! - `background`: PNG or JPEG for the full-page background.
//! - `firma`: PNG or JPEG of the manager's signature.
//!
//! Parts that are absent leave the stored value untouched. Unknown parts are ignored.

use crate::error::AppError;
use crate::state::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use common::model::template::BrandingUpdate;
use common::responses::TemplateUpdatedResponse;
use futures_util::StreamExt;

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 4 * 1024;

/// Raw upload kept in memory until it has been validated.
struct ImageUpload {
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct BrandingForm {
    manager_name: Option<String>,
    background: Option<ImageUpload>,
    signature: Option<ImageUpload>,
}

pub async fn process(payload: Multipart, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let form = read_form(payload).await?;
    let template = web::block(move || apply(&state, form)).await??;
    Ok(HttpResponse::Ok().json(TemplateUpdatedResponse {
        mensaje: "Plantilla actualizada".to_string(),
        template,
    }))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::invalid(format!("Error leyendo el formulario: {}", e)))?;
        if bytes.len() + chunk.len() > limit {
            return Err(AppError::invalid("Archivo demasiado grande"));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_form(mut payload: Multipart) -> Result<BrandingForm, AppError> {
    let mut form = BrandingForm::default();
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::invalid(format!("Formulario inválido: {}", e)))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        match name.as_deref() {
            Some("gerenteNombre") => {
                let bytes = read_field(&mut field, MAX_TEXT_BYTES).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| AppError::invalid("gerenteNombre no es texto UTF-8"))?;
                form.manager_name = Some(text.trim().to_string());
            }
            Some("background") => {
                let bytes = read_field(&mut field, MAX_IMAGE_BYTES).await?;
                if !bytes.is_empty() {
                    form.background = Some(ImageUpload { content_type, bytes });
                }
            }
            Some("firma") => {
                let bytes = read_field(&mut field, MAX_IMAGE_BYTES).await?;
                if !bytes.is_empty() {
                    form.signature = Some(ImageUpload { content_type, bytes });
                }
            }
            other => {
                log::debug!("Ignoring multipart field {:?}", other);
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| AppError::invalid(e.to_string()))?;
                }
            }
        }
    }
    Ok(form)
}

/// Validates and stores both images before touching the template, so a bad
/// second file leaves nothing half-applied.
fn apply(state: &AppState, form: BrandingForm) -> Result<common::model::template::Template, AppError> {
    let store = |upload: Option<ImageUpload>| -> Result<Option<String>, AppError> {
        upload
            .map(|u| state.assets.store(u.content_type.as_deref(), &u.bytes))
            .transpose()
    };
    let update = BrandingUpdate {
        manager_name: form.manager_name,
        background_ref: store(form.background)?,
        signature_ref: store(form.signature)?,
    };
    state.template_store().update_branding(&update)
}
