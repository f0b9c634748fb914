//! Text fields computed at issuance: academic hours, the long Spanish date
//! and the program code printed under the number.

use crate::config::CertificatesConfig;
use crate::error::AppError;
use chrono::{DateTime, Datelike, NaiveDate};

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Academic hours for a course, from the first keyword contained in its
/// title (case-insensitive), else the configured default.
pub fn hours_for_title(title: &str, settings: &CertificatesConfig) -> u32 {
    let title = title.to_lowercase();
    settings
        .hours
        .iter()
        .find(|rule| title.contains(&rule.keyword.to_lowercase()))
        .map(|rule| rule.hours)
        .unwrap_or(settings.default_hours)
}

/// `"Lima, 05 de marzo de 2025"`.
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "Lima, {:02} de {} de {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

pub fn brand_code(year: i32) -> String {
    format!("BIO-{}", year)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (the date part in its own offset).
pub fn parse_emit_date(value: &str) -> Result<NaiveDate, AppError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| AppError::invalid(format!("Fecha de emisión inválida: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_follow_title_keywords() {
        let settings = CertificatesConfig::default();
        assert_eq!(hours_for_title("Actualización en Seguridad", &settings), 5);
        assert_eq!(
            hours_for_title("Curso Oficial de Protección Radiológica", &settings),
            50
        );
        assert_eq!(hours_for_title("Electrónica Básica", &settings), 20);
        assert_eq!(hours_for_title("", &settings), 20);
    }

    #[test]
    fn hours_match_is_case_insensitive() {
        let settings = CertificatesConfig::default();
        assert_eq!(hours_for_title("ACTUALIZACIÓN ANUAL", &settings), 5);
    }

    #[test]
    fn long_date_is_spanish_with_padded_day() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap();
        assert_eq!(long_date(date), "Lima, 20 de agosto de 2025");
        let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert_eq!(long_date(date), "Lima, 03 de enero de 2026");
    }

    #[test]
    fn emit_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap();
        assert_eq!(parse_emit_date("2025-08-20").unwrap(), expected);
        assert_eq!(parse_emit_date("2025-08-20T10:30:00-05:00").unwrap(), expected);
        assert!(matches!(
            parse_emit_date("20/08/2025"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn brand_code_uses_year() {
        assert_eq!(brand_code(2025), "BIO-2025");
    }
}
