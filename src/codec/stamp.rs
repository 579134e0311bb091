use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::errors::{Error, Result};

/// Label of the trailing integrity line, `HBTC=<sha256 hex>`.
pub const STAMP_LABEL: &str = "HBTC";

fn stamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^HBTC=(?<digest>[0-9a-f]{64})$").expect("stamp pattern is valid")
    })
}

pub fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn stamp_line(text: &str) -> String {
    format!("{}={}", STAMP_LABEL, digest(text))
}

/// Appends the stamp computed over `text` exactly as given.
pub fn append(text: &str) -> String {
    format!("{}\n{}", text, stamp_line(text))
}

/// Separates a trailing stamp line from the text it covers.
pub fn split(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end_matches(['\n', '\r']);
    let (body, last) = match trimmed.rsplit_once('\n') {
        Some((body, last)) => (body, last),
        None => ("", trimmed),
    };
    match stamp_pattern().captures(last.trim()) {
        Some(captures) => match captures.name("digest") {
            Some(found) => (body.trim_end_matches('\r'), Some(found.as_str())),
            None => (text, None),
        },
        None => (text, None),
    }
}

/// Whether the stamp still matches the text above it.
pub fn verify(text: &str) -> Result<bool> {
    match split(text) {
        (body, Some(expected)) => Ok(digest(body) == expected),
        (_, None) => Err(Error::validation(format!(
            "no {}= integrity line found",
            STAMP_LABEL
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "lat=-19.84\nlon=-43.91\nshop=bakery";

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn append_then_verify() {
        let stamped = append(BODY);
        assert!(stamped.starts_with(BODY));
        assert!(stamped.lines().last().unwrap().starts_with("HBTC="));
        assert_eq!(verify(&stamped), Ok(true));
        assert_eq!(split(&stamped), (BODY, Some(digest(BODY).as_str())));
    }

    #[test]
    fn tampering_is_detected() {
        let stamped = append(BODY).replace("bakery", "butcher");
        assert_eq!(verify(&stamped), Ok(false));
    }

    #[test]
    fn trailing_newline_is_tolerated() {
        let stamped = format!("{}\n", append(BODY));
        assert_eq!(verify(&stamped), Ok(true));
    }

    #[test]
    fn unstamped_text_is_left_alone() {
        assert_eq!(split(BODY), (BODY, None));
        assert!(verify(BODY).is_err());
    }
}
