//! Free ebook availability and expiry warnings.

use chrono::{DateTime, FixedOffset};

use crate::domain::entities::FreeBook;

/// Promotion page of the daily free ebook.
pub const BOOK_URL: &str = "https://www.packtpub.com/packt/offers/free-learning";

/// Warning thresholds in seconds of remaining time, tightest first.
const TIME_LEFT: [(i64, &str); 5] = [
    (30, "30 segundos"),
    (60, "1 minuto"),
    (600, "10 minutos"),
    (1800, "meia hora"),
    (3600, "1 hora"),
];

/// Availability of the promotion relative to `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookStatus {
    Expired,
    Available { warning: Option<&'static str> },
}

/// Evaluates which expiry warning, if any, applies at `now`.
///
/// Boundaries are inclusive and only the tightest crossed threshold is
/// reported: at 59 minutes remaining the warning is "1 hora", at 29 minutes
/// it is "meia hora". More than an hour of remaining time carries no warning.
pub fn time_left(expires: i64, now: DateTime<FixedOffset>) -> BookStatus {
    let remaining = expires - now.timestamp();
    if remaining < 0 {
        return BookStatus::Expired;
    }
    let warning = TIME_LEFT
        .iter()
        .find(|(limit, _)| remaining <= *limit)
        .map(|(_, label)| *label);
    BookStatus::Available { warning }
}

/// Builds the `/book` reply text.
///
/// Without a scraped book the reply falls back to the promotion URL. `None`
/// means the promotion already expired and the caller should refetch.
pub fn book_response(book: Option<&FreeBook>, now: DateTime<FixedOffset>) -> Option<String> {
    let Some(book) = book else {
        return Some(BOOK_URL.to_string());
    };

    match time_left(book.expires, now) {
        BookStatus::Expired => None,
        BookStatus::Available { warning } => {
            let mut response = format!(
                "Confira o livro gratuito de hoje da Packt Publishing 🎁\n\n\
                 📖 [{}]({})\n\
                 🔎 {}\n",
                book.name, BOOK_URL, book.summary
            );
            if let Some(label) = warning {
                response.push_str(&format!("⌛️ Menos de {}!", label));
            }
            Some(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::timezone::gmt;

    const EXPIRY: i64 = 1_700_000_000;

    fn at(seconds_before_expiry: i64) -> DateTime<FixedOffset> {
        gmt(-3)
            .from_timestamp(EXPIRY - seconds_before_expiry)
            .expect("valid timestamp")
    }

    fn warning_at(seconds_before_expiry: i64) -> Option<&'static str> {
        match time_left(EXPIRY, at(seconds_before_expiry)) {
            BookStatus::Available { warning } => warning,
            BookStatus::Expired => panic!("promotion should still be valid"),
        }
    }

    #[test]
    fn no_warning_far_from_expiry() {
        assert_eq!(warning_at(10 * 3600), None);
    }

    #[test]
    fn tightest_threshold_wins() {
        assert_eq!(warning_at(59 * 60), Some("1 hora"));
        assert_eq!(warning_at(29 * 60), Some("meia hora"));
        assert_eq!(warning_at(9 * 60), Some("10 minutos"));
        assert_eq!(warning_at(59), Some("1 minuto"));
        assert_eq!(warning_at(29), Some("30 segundos"));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(warning_at(3600), Some("1 hora"));
        assert_eq!(warning_at(30), Some("30 segundos"));
    }

    #[test]
    fn past_expiry_is_expired() {
        assert_eq!(time_left(EXPIRY, at(-1)), BookStatus::Expired);
    }

    #[test]
    fn response_includes_book_and_warning() {
        let book = FreeBook {
            name: "Rust Essentials".to_string(),
            summary: "Aprenda Rust.".to_string(),
            expires: EXPIRY,
        };

        let text = book_response(Some(&book), at(29 * 60)).expect("still valid");
        assert!(text.contains("[Rust Essentials]"));
        assert!(text.contains("Aprenda Rust."));
        assert!(text.ends_with("⌛️ Menos de meia hora!"));

        let relaxed = book_response(Some(&book), at(10 * 3600)).expect("still valid");
        assert!(!relaxed.contains("⌛️"));
    }

    #[test]
    fn response_without_book_falls_back_to_url() {
        assert_eq!(book_response(None, at(60)), Some(BOOK_URL.to_string()));
    }

    #[test]
    fn response_after_expiry_is_none() {
        let book = FreeBook {
            name: "Rust Essentials".to_string(),
            summary: "Aprenda Rust.".to_string(),
            expires: EXPIRY,
        };
        assert_eq!(book_response(Some(&book), at(-1)), None);
    }
}
