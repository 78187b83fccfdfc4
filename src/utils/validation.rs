use validator::Validate;

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Loose international phone check: optional leading `+`, then 9-15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Strips angle brackets and collapses runs of whitespace.
pub fn sanitize_input(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| *c != '<' && *c != '>').collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_validation_accepts_international_numbers() {
        assert!(is_valid_phone("+12025550123"));
        assert!(is_valid_phone("992900112233"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+1 202 555 0123"));
        assert!(!is_valid_phone("not-a-phone"));
    }

    #[test]
    fn sanitize_strips_markup_and_extra_whitespace() {
        assert_eq!(sanitize_input("  Jane   Doe "), "Jane Doe");
        assert_eq!(sanitize_input("<script>Jane</script>"), "scriptJane/script");
    }
}
