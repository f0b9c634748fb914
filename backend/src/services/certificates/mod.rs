//! # Certificate Service Module
//!
//! Routes every request under `/api/certificates` to its handler. Handlers
//! extract and validate HTTP input, then run the certificate core on the
//! blocking pool through `web::block`.
//!
//! ## Sub-modules:
//! - `template_get` / `template_update`: read and edit the branding template.
//! - `next_number`: non-authoritative preview of the next number.
//! - `emit`: administrative issuance.
//! - `ensure`: student issuance gated on the exam result.
//! - `get` / `list`: certificate records with their user and course.
//! - `pdf`: rendered document.

mod emit;
mod ensure;
mod get;
mod list;
mod next_number;
mod pdf;
mod template_get;
mod template_update;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

/// The base path for all certificate-related API endpoints.
const API_PATH: &str = "/api/certificates";

/// Configures and returns the Actix `Scope` for all certificate routes.
///
/// # Registered Routes:
///
/// *   **`GET /template`** (`template_get::process`): current branding plus `year`/`lastSeq`.
/// *   **`PUT /template`** (`template_update::process`): multipart with optional
///     `gerenteNombre`, `background` and `firma` parts; only the sent parts change.
/// *   **`GET /next-number?year=YYYY`** (`next_number::process`): `{ number }` preview.
/// *   **`POST /`** (`emit::process`): admin issuance, `409` when the pair already has one.
/// *   **`POST /ensure`** (`ensure::process`): student issuance, idempotent.
/// *   **`GET /mine`** and **`GET /user/{user_id}`** (`list`): certificates newest first.
/// *   **`GET /{id}`** (`get::process`): certificate with populated `user` and `course`.
/// *   **`GET /{id}/pdf`** (`pdf::process`): the rendered PDF. Requires no identity so
///     it can be opened directly in a browser tab.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(emit::process))
        .route("/template", get().to(template_get::process))
        .route("/template", put().to(template_update::process))
        .route("/next-number", get().to(next_number::process))
        .route("/ensure", post().to(ensure::process))
        .route("/mine", get().to(list::mine))
        .route("/user/{user_id}", get().to(list::by_user))
        .route("/{id}/pdf", get().to(pdf::process))
        .route("/{id}", get().to(get::process))
}
