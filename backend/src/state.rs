//! Shared application state handed to every request handler.
//!
//! `AppState` is built once in `main.rs` and registered as `web::Data`. All
//! members are cheap to clone and safe to move into blocking tasks, which is
//! where the certificate core runs.

use crate::assets::AssetStore;
use crate::certificate::render::fonts::{FontProvider, LocalFonts};
use crate::certificate::render::Renderer;
use crate::certificate::{CertificateIssuer, TemplateStore};
use crate::config::AppConfig;
use crate::exam::SubmissionRecorder;
use crate::storage::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Single serialized SQLite connection; see `storage`.
    pub db: Database,
    /// Read-only after startup.
    pub config: Arc<AppConfig>,
    /// Uploaded branding images.
    pub assets: AssetStore,
    /// Base family plus optional decorative faces for the PDF writer.
    pub fonts: Arc<dyn FontProvider>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let fonts: Arc<dyn FontProvider> = Arc::new(LocalFonts::new(&config.fonts));
        Self::with_fonts(db, config, fonts)
    }

    pub fn with_fonts(db: Database, config: AppConfig, fonts: Arc<dyn FontProvider>) -> Self {
        let assets = AssetStore::new(config.storage.uploads_dir.clone());
        Self {
            db,
            config: Arc::new(config),
            assets,
            fonts,
        }
    }

    pub fn template_store(&self) -> TemplateStore<'_> {
        TemplateStore::new(&self.db)
    }

    pub fn issuer(&self) -> CertificateIssuer<'_> {
        CertificateIssuer::new(
            &self.db,
            &self.db,
            &self.db,
            &self.db,
            &self.config.certificates,
        )
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.db, &self.db, &self.assets, self.fonts.as_ref())
    }

    pub fn recorder(&self) -> SubmissionRecorder<'_> {
        SubmissionRecorder::new(&self.db)
    }
}
