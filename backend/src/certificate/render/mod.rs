//! # Certificate Rendering
//!
//! Produces the one-page landscape PDF of an issued certificate. Text comes
//! from the certificate's snapshot; background, signature and manager name
//! are read from the live template on every render, so artwork changed after
//! issuance shows up on re-download.
//!
//! Rendering happens in two steps: `layout` computes positions without any
//! font, `pdf` draws them with `genpdf`. Image problems drop the image, never
//! the document.

pub mod fonts;
pub mod images;
pub mod layout;
pub mod pdf;

use crate::assets::AssetStore;
use crate::error::AppError;
use crate::storage::{CertificateRepository, TemplateRepository};
use common::model::certificate::Certificate;
use fonts::FontProvider;
use images::LoadedImage;
use layout::CertificateLayout;

pub struct Renderer<'a> {
    certificates: &'a dyn CertificateRepository,
    templates: &'a dyn TemplateRepository,
    assets: &'a AssetStore,
    fonts: &'a dyn FontProvider,
}

/// Layout plus the decoded images it references.
pub struct PreparedPage {
    pub certificate: Certificate,
    pub layout: CertificateLayout,
    images: Vec<LoadedImage>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        certificates: &'a dyn CertificateRepository,
        templates: &'a dyn TemplateRepository,
        assets: &'a AssetStore,
        fonts: &'a dyn FontProvider,
    ) -> Self {
        Self {
            certificates,
            templates,
            assets,
            fonts,
        }
    }

    /// Loads the certificate and the live branding, and lays out the page.
    pub fn prepare(&self, certificate_id: &str) -> Result<PreparedPage, AppError> {
        let certificate = self
            .certificates
            .find_certificate(certificate_id)?
            .ok_or_else(|| AppError::not_found("Certificado"))?;
        let template = self.templates.get_template()?;

        let background = images::load(self.assets, template.background_ref.as_deref());
        let signature = images::load(self.assets, template.signature_ref.as_deref());
        let layout =
            CertificateLayout::build(&certificate, &template, background.as_ref(), signature.as_ref());

        Ok(PreparedPage {
            certificate,
            layout,
            images: background.into_iter().chain(signature).collect(),
        })
    }

    pub fn render(&self, certificate_id: &str) -> Result<Vec<u8>, AppError> {
        let page = self.prepare(certificate_id)?;
        let images: Vec<&LoadedImage> = page.images.iter().collect();
        let bytes = pdf::write_pdf(&page.layout, &images, self.fonts)?;
        log::debug!(
            "Rendered certificate {} ({} bytes)",
            page.certificate.id,
            bytes.len()
        );
        Ok(bytes)
    }
}
