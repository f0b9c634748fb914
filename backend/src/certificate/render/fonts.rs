//! Font sources for the PDF writer.
//!
//! The base family comes from the configured directory or a few well-known
//! system locations, falling back to the DejaVu Sans faces compiled into the
//! binary. Decorative faces are optional single TTF files fetched over HTTP
//! once per role.

use super::layout::FontRole;
use crate::config::FontsConfig;
use crate::error::AppError;
use genpdf::fonts::{self, FontData, FontFamily};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const FAMILY_NAMES: [&str; 3] = ["Arial", "LiberationSans", "DejaVuSans"];

const SYSTEM_DIRS: [&str; 5] = [
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/Library/Fonts",
];

/// DejaVu ships `-Oblique` instead of `-Italic`, which `fonts::from_files` does not know.
const DEJAVU_FILES: [&str; 4] = [
    "DejaVuSans.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Oblique.ttf",
    "DejaVuSans-BoldOblique.ttf",
];

const BUNDLED_REGULAR: &[u8] = include_bytes!("../../../fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../../../fonts/DejaVuSans-Bold.ttf");

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub trait FontProvider: Send + Sync {
    /// Family used for every text block without a decorative face.
    fn base_family(&self) -> Result<FontFamily<FontData>, AppError>;

    /// Optional face for `role`; `None` means use the base family.
    fn decorative(&self, role: FontRole) -> Option<FontData>;
}

/// Base family from disk, decorative faces from configured URLs.
pub struct LocalFonts {
    dirs: Vec<PathBuf>,
    decorative_urls: BTreeMap<String, String>,
    base: Mutex<Option<FontFamily<FontData>>>,
    fetched: Mutex<HashMap<FontRole, Option<FontData>>>,
}

impl LocalFonts {
    pub fn new(config: &FontsConfig) -> Self {
        let mut dirs = vec![config.dir.clone()];
        dirs.extend(SYSTEM_DIRS.iter().map(PathBuf::from));
        Self {
            dirs,
            decorative_urls: config.decorative.clone(),
            base: Mutex::new(None),
            fetched: Mutex::new(HashMap::new()),
        }
    }

    fn discover(&self) -> Option<FontFamily<FontData>> {
        self.dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .find_map(|dir| family_in(dir))
    }

    fn fetch(&self, role: FontRole) -> Option<FontData> {
        let url = self.decorative_urls.get(role.key())?;
        match download(url).and_then(|bytes| {
            FontData::new(bytes, None).map_err(|e| AppError::Render(e.to_string()))
        }) {
            Ok(data) => {
                log::info!("Loaded decorative font for {} from {}", role.key(), url);
                Some(data)
            }
            Err(e) => {
                log::warn!(
                    "Decorative font for {} unavailable ({}), using base family",
                    role.key(),
                    e
                );
                None
            }
        }
    }
}

fn family_in(dir: &Path) -> Option<FontFamily<FontData>> {
    for name in FAMILY_NAMES {
        if let Ok(family) = fonts::from_files(dir, name, None) {
            log::debug!("Using font family {} from {}", name, dir.display());
            return Some(family);
        }
    }
    let faces: Vec<FontData> = DEJAVU_FILES
        .iter()
        .map(|file| std::fs::read(dir.join(file)).ok().and_then(|b| FontData::new(b, None).ok()))
        .collect::<Option<Vec<_>>>()?;
    let [regular, bold, italic, bold_italic]: [FontData; 4] = faces.try_into().ok()?;
    Some(FontFamily {
        regular,
        bold,
        italic,
        bold_italic,
    })
}

/// DejaVu Sans shipped in `backend/fonts`; italic slots reuse the upright faces.
fn bundled_family() -> Result<FontFamily<FontData>, AppError> {
    let face = |bytes: &[u8]| {
        FontData::new(bytes.to_vec(), None)
            .map_err(|e| AppError::Render(format!("bundled font: {}", e)))
    };
    let regular = face(BUNDLED_REGULAR)?;
    let bold = face(BUNDLED_BOLD)?;
    Ok(FontFamily {
        italic: regular.clone(),
        bold_italic: bold.clone(),
        regular,
        bold,
    })
}

fn download(url: &str) -> Result<Vec<u8>, AppError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response
        .bytes()
        .map_err(|e| AppError::Internal(e.to_string()))?
        .to_vec())
}

impl FontProvider for LocalFonts {
    fn base_family(&self) -> Result<FontFamily<FontData>, AppError> {
        let mut cached = self
            .base
            .lock()
            .map_err(|_| AppError::Internal("font cache poisoned".to_string()))?;
        if let Some(family) = cached.as_ref() {
            return Ok(family.clone());
        }
        let family = match self.discover() {
            Some(family) => family,
            None => {
                log::info!(
                    "No {} family in {:?}, using bundled DejaVu Sans",
                    FAMILY_NAMES.join("/"),
                    self.dirs
                );
                bundled_family()?
            }
        };
        *cached = Some(family.clone());
        Ok(family)
    }

    fn decorative(&self, role: FontRole) -> Option<FontData> {
        if !self.decorative_urls.contains_key(role.key()) {
            return None;
        }
        let mut fetched = self.fetched.lock().ok()?;
        fetched.entry(role).or_insert_with(|| self.fetch(role)).clone()
    }
}

/// Single-face family used to register a decorative font with the document.
pub fn single_face(data: FontData) -> FontFamily<FontData> {
    FontFamily {
        regular: data.clone(),
        bold: data.clone(),
        italic: data.clone(),
        bold_italic: data,
    }
}
