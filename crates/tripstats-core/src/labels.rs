//! Localized chart labels
//!
//! Labels only: locale never changes numeric values or sort order.

use chrono::NaiveDate;

use crate::dates::parse_compact_date;

/// Stable weekday keys, Monday first
pub const WEEKDAY_KEYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Supported label languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// Spanish
    #[default]
    Es,
    /// English
    En,
    /// French
    Fr,
    /// German
    De,
    /// Portuguese
    Pt,
    /// Italian
    It,
}

impl Locale {
    /// Resolve a BCP 47 tag (`"en-US"`, `"es"`) by its language subtag.
    /// Unknown tags fall back to Spanish.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match language.as_str() {
            "es" | "ca" | "gl" | "eu" => Locale::Es,
            "en" => Locale::En,
            "fr" => Locale::Fr,
            "de" => Locale::De,
            "pt" => Locale::Pt,
            "it" => Locale::It,
            "" => Locale::default(),
            other => {
                tracing::debug!("Unknown locale '{other}', using default labels");
                Locale::default()
            }
        }
    }

    fn month_names(self) -> [&'static str; 12] {
        match self {
            Locale::Es => [
                "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sept", "Oct", "Nov",
                "Dic",
            ],
            Locale::En => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                "Dec",
            ],
            Locale::Fr => [
                "Janv.", "Févr.", "Mars", "Avr.", "Mai", "Juin", "Juil.", "Août", "Sept.",
                "Oct.", "Nov.", "Déc.",
            ],
            Locale::De => [
                "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.",
                "Nov.", "Dez.",
            ],
            Locale::Pt => [
                "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov",
                "Dez",
            ],
            Locale::It => [
                "Gen", "Feb", "Mar", "Apr", "Mag", "Giu", "Lug", "Ago", "Set", "Ott", "Nov",
                "Dic",
            ],
        }
    }

    fn weekday_names(self) -> [&'static str; 7] {
        match self {
            Locale::Es => ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"],
            Locale::En => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            Locale::Fr => ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"],
            Locale::De => ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"],
            Locale::Pt => ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"],
            Locale::It => ["Lun", "Mar", "Mer", "Gio", "Ven", "Sab", "Dom"],
        }
    }

    /// `202501` → `Ene 2025`. Malformed keys are returned unchanged.
    pub fn month_label(self, key: &str) -> String {
        let month = key
            .get(4..6)
            .and_then(|m| m.parse::<usize>().ok())
            .filter(|m| (1..=12).contains(m));
        match (key.get(..4), month) {
            (Some(year), Some(month)) if year.bytes().all(|b| b.is_ascii_digit()) => {
                format!("{} {}", self.month_names()[month - 1], year)
            }
            _ => key.to_string(),
        }
    }

    /// `20250114` → `14/01/2025` (`01/14/2025` in English, `14.01.2025` in
    /// German). Malformed keys are returned unchanged.
    pub fn date_label(self, key: &str) -> String {
        match parse_compact_date(key) {
            Some(date) => self.format_date(date),
            None => key.to_string(),
        }
    }

    fn format_date(self, date: NaiveDate) -> String {
        let pattern = match self {
            Locale::En => "%m/%d/%Y",
            Locale::De => "%d.%m.%Y",
            _ => "%d/%m/%Y",
        };
        date.format(pattern).to_string()
    }

    /// Short weekday name, Monday = 0
    pub fn weekday_label(self, index: usize) -> String {
        self.weekday_names()
            .get(index)
            .copied()
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("en-US"), Locale::En);
        assert_eq!(Locale::from_tag("pt_BR"), Locale::Pt);
        assert_eq!(Locale::from_tag("ES"), Locale::Es);
        assert_eq!(Locale::from_tag("xx"), Locale::Es);
        assert_eq!(Locale::from_tag(""), Locale::Es);
    }

    #[test]
    fn test_month_and_date_labels() {
        assert_eq!(Locale::Es.month_label("202501"), "Ene 2025");
        assert_eq!(Locale::En.month_label("202512"), "Dec 2025");
        assert_eq!(Locale::En.month_label("bogus"), "bogus");
        assert_eq!(Locale::Es.date_label("20250114"), "14/01/2025");
        assert_eq!(Locale::En.date_label("20250114"), "01/14/2025");
        assert_eq!(Locale::De.date_label("20250114"), "14.01.2025");
        assert_eq!(Locale::En.date_label("unknown"), "unknown");
    }

    #[test]
    fn test_weekday_labels() {
        assert_eq!(Locale::En.weekday_label(0), "Mon");
        assert_eq!(Locale::Es.weekday_label(6), "Dom");
        assert_eq!(Locale::En.weekday_label(9), "");
    }
}
