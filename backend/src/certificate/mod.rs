//! # Certificate Core
//!
//! Numbering, eligibility, issuance and rendering of course certificates.
//! Everything here is synchronous and talks to storage through the repository
//! traits; HTTP handlers run it inside blocking tasks.
//!
//! ## Sub-modules:
//! - `sequence`: branding and the per-year number counter.
//! - `eligibility`: pass threshold and the eligibility decision.
//! - `issuer`: admin emit and student ensure paths.
//! - `wording`: hours, long dates and the brand code printed on the page.
//! - `render`: page layout and PDF serialization.

pub mod eligibility;
pub mod issuer;
pub mod render;
pub mod sequence;
pub mod wording;

pub use issuer::{CertificateIssuer, EmitCommand, EnsureTarget};
pub use sequence::TemplateStore;
