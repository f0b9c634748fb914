use super::fonts::{single_face, FontProvider};
use super::images::{write_temp_png, LoadedImage};
use super::layout::{
    Anchor, CertificateLayout, FontRole, PlacedImage, Rule, TextBlock, PAGE_HEIGHT_PT, PAGE_WIDTH_PT,
};
use crate::error::AppError;
use genpdf::elements::Image as PdfImage;
use genpdf::fonts::{Font, FontFamily};
use genpdf::render::Area;
use genpdf::style::{Color, Style};
use genpdf::{Context, Document, Element, Mm, Position, RenderResult, Scale, Size};
use image::GenericImageView;
use std::collections::HashMap;
use tempfile::NamedTempFile;

const MM_PER_PT: f64 = 25.4 / 72.0;
/// Embedded images are declared at 72 dpi so one pixel is one point at scale 1.
const IMAGE_DPI: f64 = 72.0;
/// Share of the font size above the baseline, used to turn baselines into line tops.
const ASCENT_RATIO: f64 = 0.75;

fn mm(pt: f64) -> Mm {
    Mm::from(pt * MM_PER_PT)
}

/// The whole certificate as one absolutely positioned page element.
struct CertificatePage {
    images: Vec<PdfImage>,
    rule: Option<Rule>,
    texts: Vec<(TextBlock, Option<FontFamily<Font>>)>,
    // Embedded files must outlive rendering.
    _temp_files: Vec<NamedTempFile>,
}

impl CertificatePage {
    fn style_for(block: &TextBlock, family: Option<FontFamily<Font>>) -> Style {
        let mut style = Style::new()
            .with_font_size(block.size)
            .with_color(Color::Rgb(block.color.0, block.color.1, block.color.2));
        if let Some(family) = family {
            style = style.with_font_family(family);
        }
        if block.bold {
            style = style.bold();
        }
        style
    }
}

impl Element for CertificatePage {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, genpdf::error::Error> {
        for image in self.images.iter_mut() {
            // Positioned absolutely; the returned size does not matter here.
            image.render(context, area.clone(), Style::new())?;
        }

        if let Some(rule) = self.rule {
            area.draw_line(
                vec![
                    Position::new(mm(rule.x1), mm(rule.y)),
                    Position::new(mm(rule.x2), mm(rule.y)),
                ],
                Style::new().with_color(Color::Rgb(25, 25, 25)),
            );
        }

        for (block, family) in &self.texts {
            let style = Self::style_for(block, *family);
            let top = mm(block.baseline - f64::from(block.size) * ASCENT_RATIO);
            let x = match block.anchor {
                Anchor::Left(x) => mm(x),
                Anchor::Center(center) => {
                    let width = style.str_width(&context.font_cache, &block.text);
                    mm(center) - width / 2.0
                }
            };
            area.print_str(&context.font_cache, Position::new(x, top), style, &block.text)?;
        }

        Ok(RenderResult {
            size: area.size(),
            has_more: false,
        })
    }
}

fn pdf_image(placed: &PlacedImage, loaded: &LoadedImage) -> Result<(PdfImage, NamedTempFile), AppError> {
    let tmp = write_temp_png(&loaded.image)?;
    let (w, h) = loaded.image.dimensions();
    let mut image = PdfImage::from_path(tmp.path())
        .map_err(|e| AppError::Render(format!("embedding {}: {}", loaded.source, e)))?;
    image.set_dpi(IMAGE_DPI);
    image.set_position(Position::new(mm(placed.x), mm(placed.top)));
    image.set_scale(Scale::new(
        placed.width / f64::from(w.max(1)),
        placed.height / f64::from(h.max(1)),
    ));
    Ok((image, tmp))
}

/// Serializes `layout` into a single-page PDF.
///
/// `images` maps each placed slot's source reference to its decoded pixels;
/// a slot whose pixels cannot be embedded is left out with a warning.
pub fn write_pdf(
    layout: &CertificateLayout,
    images: &[&LoadedImage],
    fonts: &dyn FontProvider,
) -> Result<Vec<u8>, AppError> {
    let base = fonts.base_family()?;
    let mut doc = Document::new(base);
    doc.set_title(layout.title.clone());
    doc.set_paper_size(Size::new(mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT)));

    let mut families: HashMap<FontRole, FontFamily<Font>> = HashMap::new();
    for role in FontRole::DECORATIVE {
        if layout.texts.iter().any(|t| t.role == role) {
            if let Some(data) = fonts.decorative(role) {
                families.insert(role, doc.add_font_family(single_face(data)));
            }
        }
    }

    let mut pdf_images = Vec::new();
    let mut temp_files = Vec::new();
    for placed in layout.background.iter().chain(layout.signature.iter()) {
        let Some(loaded) = images.iter().find(|img| img.source == placed.source) else {
            continue;
        };
        match pdf_image(placed, loaded) {
            Ok((image, tmp)) => {
                pdf_images.push(image);
                temp_files.push(tmp);
            }
            Err(e) => log::warn!("Skipping image {}: {}", placed.source, e),
        }
    }

    let texts = layout
        .texts
        .iter()
        .map(|block| (block.clone(), families.get(&block.role).copied()))
        .collect();

    doc.push(CertificatePage {
        images: pdf_images,
        rule: layout.rule,
        texts,
        _temp_files: temp_files,
    });

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| AppError::Render(e.to_string()))?;
    Ok(out)
}
