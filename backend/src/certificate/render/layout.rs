//! Page geometry of the certificate, computed before any font is loaded.
//!
//! All coordinates are PDF points measured from the top-left corner of an
//! A4 landscape page. Text positions are baselines.

use super::images::LoadedImage;
use crate::certificate::wording::brand_code;
use chrono::Datelike;
use common::model::certificate::Certificate;
use common::model::template::Template;

pub const PAGE_WIDTH_PT: f64 = 841.89;
pub const PAGE_HEIGHT_PT: f64 = 595.28;

pub const CAPTION_RECIPIENT: &str = "Certificado de aprobación para:";
pub const CAPTION_COMPLETION: &str = "Por haber completado satisfactoriamente el curso:";
pub const CAPTION_MANAGER: &str = "Gerente General";
const FALLBACK_MANAGER: &str = "Gerente General";

const SIGNATURE_WIDTH_PT: f64 = 200.0;
const SIGNATURE_MAX_HEIGHT_PT: f64 = 120.0;
const SIGNATURE_RIGHT_MARGIN_PT: f64 = 80.0;
const SIGNATURE_BOTTOM_PT: f64 = 80.0;
const DATE_LEFT_PT: f64 = 40.0;

const INK: Rgb = Rgb(25, 25, 25);
const GREY: Rgb = Rgb(90, 90, 90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Which typeface a text block asks for. Decorative faces are optional;
/// `Body` always uses the base family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Number,
    Brand,
    Caption,
    Body,
    Date,
}

impl FontRole {
    /// Key under `[fonts.decorative]` in the configuration.
    pub fn key(&self) -> &'static str {
        match self {
            FontRole::Number => "number",
            FontRole::Brand => "brand",
            FontRole::Caption => "caption",
            FontRole::Body => "body",
            FontRole::Date => "date",
        }
    }

    pub const DECORATIVE: [FontRole; 4] =
        [FontRole::Number, FontRole::Brand, FontRole::Caption, FontRole::Date];
}

/// Horizontal placement of a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Text is centered on this x.
    Center(f64),
    /// Text starts at this x.
    Left(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub role: FontRole,
    pub size: u8,
    pub bold: bool,
    pub color: Rgb,
    pub anchor: Anchor,
    pub baseline: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Background,
    Signature,
}

/// An image stretched into a rectangle given by its top-left corner and size.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    pub slot: ImageSlot,
    /// Stored reference the pixels came from.
    pub source: String,
    pub x: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Horizontal line from `x1` to `x2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateLayout {
    pub title: String,
    pub background: Option<PlacedImage>,
    pub signature: Option<PlacedImage>,
    pub rule: Option<Rule>,
    pub texts: Vec<TextBlock>,
}

fn centered(text: String, role: FontRole, size: u8, bold: bool, baseline: f64) -> TextBlock {
    TextBlock {
        text,
        role,
        size,
        bold,
        color: INK,
        anchor: Anchor::Center(PAGE_WIDTH_PT / 2.0),
        baseline,
    }
}

impl CertificateLayout {
    /// Lays out `certificate` with the branding of the live `template`.
    ///
    /// Only images that were actually loaded are placed; text always comes
    /// from the certificate snapshot except the manager name.
    pub fn build(
        certificate: &Certificate,
        template: &Template,
        background: Option<&LoadedImage>,
        signature: Option<&LoadedImage>,
    ) -> Self {
        let mut texts = vec![
            centered(certificate.number.clone(), FontRole::Number, 26, false, 170.0),
            centered(
                brand_code(certificate.emit_date.year()),
                FontRole::Brand,
                14,
                false,
                202.0,
            ),
            centered(CAPTION_RECIPIENT.to_string(), FontRole::Caption, 14, false, 232.0),
            centered(certificate.student_name.to_uppercase(), FontRole::Body, 24, true, 267.0),
            centered(CAPTION_COMPLETION.to_string(), FontRole::Body, 13, false, 312.0),
            centered(certificate.course_title.clone(), FontRole::Body, 15, true, 332.0),
            centered(
                format!("con una duración de {} horas académicas.", certificate.hours),
                FontRole::Body,
                13,
                false,
                352.0,
            ),
            TextBlock {
                text: certificate.date_text.clone(),
                role: FontRole::Date,
                size: 12,
                bold: false,
                color: INK,
                anchor: Anchor::Left(DATE_LEFT_PT),
                baseline: PAGE_HEIGHT_PT - 40.0,
            },
        ];

        let background = background.map(|img| PlacedImage {
            slot: ImageSlot::Background,
            source: img.source.clone(),
            x: 0.0,
            top: 0.0,
            width: PAGE_WIDTH_PT,
            height: PAGE_HEIGHT_PT,
        });

        let mut rule = None;
        let signature = signature.map(|img| {
            let (w, h) = img.dimensions();
            let aspect = f64::from(h.max(1)) / f64::from(w.max(1));
            // Narrow signatures are capped by height and centered over the rule.
            let (width, height) = if SIGNATURE_WIDTH_PT * aspect > SIGNATURE_MAX_HEIGHT_PT {
                (SIGNATURE_MAX_HEIGHT_PT / aspect, SIGNATURE_MAX_HEIGHT_PT)
            } else {
                (SIGNATURE_WIDTH_PT, SIGNATURE_WIDTH_PT * aspect)
            };
            let x = PAGE_WIDTH_PT - SIGNATURE_WIDTH_PT - SIGNATURE_RIGHT_MARGIN_PT;
            let bottom = PAGE_HEIGHT_PT - SIGNATURE_BOTTOM_PT;
            let line_y = bottom - 8.0;
            let center = x + SIGNATURE_WIDTH_PT / 2.0;

            rule = Some(Rule {
                x1: x,
                x2: x + SIGNATURE_WIDTH_PT,
                y: line_y,
            });
            let manager = if template.manager_name.trim().is_empty() {
                FALLBACK_MANAGER.to_string()
            } else {
                template.manager_name.trim().to_string()
            };
            texts.push(TextBlock {
                text: manager,
                role: FontRole::Body,
                size: 12,
                bold: false,
                color: INK,
                anchor: Anchor::Center(center),
                baseline: line_y + 14.0,
            });
            texts.push(TextBlock {
                text: CAPTION_MANAGER.to_string(),
                role: FontRole::Body,
                size: 10,
                bold: false,
                color: GREY,
                anchor: Anchor::Center(center),
                baseline: line_y + 28.0,
            });

            PlacedImage {
                slot: ImageSlot::Signature,
                source: img.source.clone(),
                x: x + (SIGNATURE_WIDTH_PT - width) / 2.0,
                top: line_y - 8.0 - height,
                width,
                height,
            }
        });

        Self {
            title: format!("Certificado {}", certificate.number),
            background,
            signature,
            rule,
            texts,
        }
    }

    pub fn text(&self, needle: &str) -> Option<&TextBlock> {
        self.texts.iter().find(|t| t.text == needle)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use image::DynamicImage;

    pub(crate) fn certificate() -> Certificate {
        Certificate {
            id: "k1".into(),
            user_id: "u1".into(),
            course_id: "c1".into(),
            template_id: 1,
            number: "007".into(),
            emit_date: NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            student_name: "Luis Quispe".into(),
            course_title: "Electrónica Básica".into(),
            hours: 20,
            date_text: "Lima, 20 de agosto de 2025".into(),
            manager_name: "Ana Torres".into(),
            background_ref: Some("certificados/old.png".into()),
            signature_ref: None,
            created_at: Utc.with_ymd_and_hms(2025, 8, 20, 15, 0, 0).unwrap(),
        }
    }

    fn template(manager: &str) -> Template {
        Template {
            id: 1,
            background_ref: Some("certificados/new.png".into()),
            signature_ref: Some("certificados/sig.png".into()),
            manager_name: manager.into(),
            current_year: 2025,
            last_sequence: 7,
        }
    }

    fn loaded(source: &str, w: u32, h: u32) -> LoadedImage {
        LoadedImage {
            source: source.into(),
            image: DynamicImage::new_rgb8(w, h),
        }
    }

    #[test]
    fn text_blocks_follow_reading_order() {
        let layout = CertificateLayout::build(&certificate(), &template(""), None, None);
        let lines: Vec<&str> = layout.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "007",
                "BIO-2025",
                CAPTION_RECIPIENT,
                "LUIS QUISPE",
                CAPTION_COMPLETION,
                "Electrónica Básica",
                "con una duración de 20 horas académicas.",
                "Lima, 20 de agosto de 2025",
            ]
        );
        let centered: Vec<f64> = layout
            .texts
            .iter()
            .filter(|t| t.anchor == Anchor::Center(PAGE_WIDTH_PT / 2.0))
            .map(|t| t.baseline)
            .collect();
        assert_eq!(centered.len(), 7);
        assert!(centered.windows(2).all(|w| w[0] < w[1]));
        assert!(layout.signature.is_none() && layout.rule.is_none() && layout.background.is_none());
    }

    #[test]
    fn background_fills_the_page() {
        let bg = loaded("certificados/new.png", 1200, 800);
        let layout = CertificateLayout::build(&certificate(), &template(""), Some(&bg), None);
        let placed = layout.background.unwrap();
        assert_eq!(placed.source, "certificados/new.png");
        assert_eq!((placed.x, placed.top), (0.0, 0.0));
        assert_eq!((placed.width, placed.height), (PAGE_WIDTH_PT, PAGE_HEIGHT_PT));
    }

    #[test]
    fn signature_keeps_aspect_and_brings_rule_and_manager() {
        let sig = loaded("certificados/sig.png", 400, 100);
        let layout = CertificateLayout::build(&certificate(), &template("Ana Torres"), None, Some(&sig));

        let placed = layout.signature.clone().unwrap();
        assert_eq!(placed.width, 200.0);
        assert_eq!(placed.height, 50.0);
        assert!(placed.x + placed.width < PAGE_WIDTH_PT);

        let rule = layout.rule.unwrap();
        assert!(rule.y > placed.top + placed.height);
        assert_eq!((rule.x1, rule.x2), (placed.x, placed.x + placed.width));

        let manager = layout.text("Ana Torres").unwrap();
        let caption = layout.text(CAPTION_MANAGER).unwrap();
        assert_eq!(manager.anchor, Anchor::Center(placed.x + 100.0));
        assert!(rule.y < manager.baseline && manager.baseline < caption.baseline);
        assert!(caption.baseline < PAGE_HEIGHT_PT);
    }

    #[test]
    fn tall_signature_is_capped_above_the_rule() {
        let sig = loaded("certificados/sig.png", 50, 2000);
        let layout = CertificateLayout::build(&certificate(), &template("Ana Torres"), None, Some(&sig));

        let placed = layout.signature.clone().unwrap();
        let rule = layout.rule.unwrap();
        assert_eq!(placed.height, SIGNATURE_MAX_HEIGHT_PT);
        assert!((placed.width - 3.0).abs() < 1e-9);
        assert!((placed.x + placed.width / 2.0 - (rule.x1 + rule.x2) / 2.0).abs() < 1e-9);
        assert!(placed.top + placed.height < rule.y);

        let last_body_line = layout.text("con una duración de 20 horas académicas.").unwrap();
        assert!(placed.top > last_body_line.baseline);
    }

    #[test]
    fn manager_name_comes_from_live_template() {
        let sig = loaded("certificados/sig.png", 300, 120);
        let layout = CertificateLayout::build(&certificate(), &template("Rosa Díaz"), None, Some(&sig));
        assert!(layout.text("Rosa Díaz").is_some());
        assert!(layout.text("Ana Torres").is_none());

        let layout = CertificateLayout::build(&certificate(), &template("  "), None, Some(&sig));
        assert_eq!(
            layout
                .texts
                .iter()
                .filter(|t| t.text == "Gerente General")
                .count(),
            2
        );
    }
}
