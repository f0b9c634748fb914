//! `GET /api/certificates/{id}/pdf`
//!
//! The PDF is rendered on every request so that branding edits made after
//! issuance are always reflected. With `storage.pdf_cache_dir` configured, the
//! fresh document also replaces `cert-<id>.pdf` in that directory.

use crate::error::AppError;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use std::fs;
use std::path::Path;

fn write_cache(dir: &Path, id: &str, bytes: &[u8]) -> Result<(), AppError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("cert-{}.pdf", id));
    if path.exists() {
        fs::remove_file(&path)?;
    }
    fs::write(&path, bytes)?;
    Ok(())
}

fn render(state: &AppState, id: &str) -> Result<Vec<u8>, AppError> {
    let bytes = state.renderer().render(id)?;
    if let Some(dir) = state.config.storage.pdf_cache_dir.as_deref() {
        // Only ids of existing certificates reach this point.
        if let Err(e) = write_cache(dir, id, &bytes) {
            log::warn!("Cannot cache PDF for certificate {}: {}", id, e);
        }
    }
    Ok(bytes)
}

pub async fn process(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let file_name = format!("cert-{}.pdf", id);
    let bytes = tokio::task::spawn_blocking(move || render(&state, &id)).await??;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        write_cache(dir.path(), "k1", b"first").unwrap();
        write_cache(dir.path(), "k1", b"second").unwrap();
        assert_eq!(fs::read(dir.path().join("cert-k1.pdf")).unwrap(), b"second");
    }
}
