//! # Message Catalog
//!
//! Human-readable text for validation failures and search misses, in
//! English, German and Spanish. Text is returned unescaped; escaping is the
//! view layer's job.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::Violation;

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
    Es,
}

/// A language tag that names no supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale: {0:?}")]
pub struct UnknownLocale(pub String);

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Es => "es",
        }
    }

    /// Pick the best supported locale from an `Accept-Language` header value.
    ///
    /// Entries are ranked by their `q` weight (default 1.0, ties keep header
    /// order); region subtags are ignored (`en-US` matches `en`). Returns
    /// `None` when no entry names a supported language.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, usize, Locale)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.split(';');
                let tag = parts.next()?.trim();
                let weight = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                if weight <= 0.0 {
                    return None;
                }
                tag.parse::<Locale>()
                    .ok()
                    .map(|locale| (weight, position, locale))
            })
            .collect();

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.first().map(|(_, _, locale)| *locale)
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .trim();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "de" => Ok(Self::De),
            "es" => Ok(Self::Es),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the views need to say to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// A field constraint failed.
    Violation(Violation),
    /// A last-name search matched nobody.
    NotFound,
}

impl From<Violation> for Message {
    fn from(v: Violation) -> Self {
        Self::Violation(v)
    }
}

/// Render `message` in `locale`.
pub fn render(locale: Locale, message: Message) -> String {
    match (locale, message) {
        (Locale::En, Message::Violation(Violation::NotEmpty)) => "must not be empty".to_string(),
        (Locale::De, Message::Violation(Violation::NotEmpty)) => "darf nicht leer sein".to_string(),
        (Locale::Es, Message::Violation(Violation::NotEmpty)) => "no puede estar vacío".to_string(),

        (Locale::En, Message::Violation(Violation::Digits { integer, fraction })) => format!(
            "numeric value out of bounds (<{integer} digits>.<{fraction} digits> expected)"
        ),
        (Locale::De, Message::Violation(Violation::Digits { integer, fraction })) => format!(
            "numerischer Wert außerhalb des gültigen Bereichs (<{integer} Ziffern>.<{fraction} Ziffern> erwartet)"
        ),
        (Locale::Es, Message::Violation(Violation::Digits { integer, fraction })) => format!(
            "valor numérico fuera de rango (<{integer} dígitos>.<{fraction} dígitos> esperado)"
        ),

        (Locale::En, Message::NotFound) => "has not been found".to_string(),
        (Locale::De, Message::NotFound) => "wurde nicht gefunden".to_string(),
        (Locale::Es, Message::NotFound) => "no ha sido encontrado".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_messages() {
        assert_eq!(
            render(Locale::En, Violation::NotEmpty.into()),
            "must not be empty"
        );
        assert_eq!(
            render(
                Locale::En,
                Violation::Digits {
                    integer: 10,
                    fraction: 0
                }
                .into()
            ),
            "numeric value out of bounds (<10 digits>.<0 digits> expected)"
        );
        assert_eq!(render(Locale::En, Message::NotFound), "has not been found");
    }

    #[test]
    fn german_and_spanish_differ_from_english() {
        for locale in [Locale::De, Locale::Es] {
            assert_ne!(
                render(locale, Message::NotFound),
                render(Locale::En, Message::NotFound)
            );
        }
    }

    #[test]
    fn parse_ignores_region_and_case() {
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("DE_at".parse::<Locale>().unwrap(), Locale::De);
        assert_eq!("es".parse::<Locale>().unwrap(), Locale::Es);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn accept_language_single_tag() {
        assert_eq!(Locale::from_accept_language("en-US"), Some(Locale::En));
    }

    #[test]
    fn accept_language_respects_weights() {
        assert_eq!(
            Locale::from_accept_language("en;q=0.5, de;q=0.9"),
            Some(Locale::De)
        );
    }

    #[test]
    fn accept_language_skips_unsupported() {
        assert_eq!(
            Locale::from_accept_language("fr-CH, fr;q=0.9, es;q=0.8"),
            Some(Locale::Es)
        );
        assert_eq!(Locale::from_accept_language("fr, ja"), None);
        assert_eq!(Locale::from_accept_language(""), None);
    }

    #[test]
    fn accept_language_zero_weight_excluded() {
        assert_eq!(Locale::from_accept_language("de;q=0, en;q=0.1"), Some(Locale::En));
    }

    #[test]
    fn accept_language_ties_keep_header_order() {
        assert_eq!(Locale::from_accept_language("es, de"), Some(Locale::Es));
    }
}
