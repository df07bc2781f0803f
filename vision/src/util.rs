pub static DIGIT_REGEX: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"\d").unwrap());

/// Extract the leading integer counter from an OCR'd string.
///
/// Counters are commonly rendered as `current/total`; everything from the
/// first separator onward is discarded, then the remainder is stripped to
/// digits. `None` when no digits survive.
pub fn extract_digits(text: &str) -> Option<u32> {
    let head = text.split('/').next().unwrap_or(text);
    let digits: String = head.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Count digit characters; used to score OCR preprocessing candidates.
pub fn digit_count(text: &str) -> usize {
    DIGIT_REGEX.find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_separator() {
        assert_eq!(extract_digits("123/456"), Some(123));
        assert_eq!(extract_digits(" 98 / 135"), Some(98));
    }

    #[test]
    fn strips_ocr_noise() {
        assert_eq!(extract_digits("1O7"), Some(17)); // misread zero is dropped, not fatal
        assert_eq!(extract_digits("sanity: 42"), Some(42));
    }

    #[test]
    fn no_digits_yields_none() {
        assert_eq!(extract_digits(""), None);
        assert_eq!(extract_digits("no digits"), None);
        assert_eq!(extract_digits("/120"), None);
    }

    #[test]
    fn counts_digits() {
        assert_eq!(digit_count("12a3/4"), 4);
        assert_eq!(digit_count("none"), 0);
    }
}
