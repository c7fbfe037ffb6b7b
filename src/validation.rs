//! Input validation for catalog and account data.
//!
//! Centralizes the boundary checks the data model relies on:
//! - account fields (usernames, names, passwords)
//! - catalog fields (game names, prices, discount percentages)

/// Validation result type.
pub type ValidationResult = Result<(), String>;

/// Validate a username.
/// - Length: 3-50 characters
/// - Allowed: alphanumeric, underscore, hyphen
/// - Must start with a letter
pub fn validate_username(username: &str) -> ValidationResult {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err("Username must not be empty".into());
    }

    if trimmed.len() < 3 || trimmed.len() > 50 {
        return Err("Username must be 3-50 characters".into());
    }

    if !trimmed.chars().next().is_some_and(|c| c.is_alphabetic()) {
        return Err("Username must start with a letter".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Username may only contain letters, digits, underscore and hyphen".into());
    }

    Ok(())
}

/// Validate a display name (2-100 characters, letters/spaces/basic punctuation).
pub fn validate_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Name must not be empty".into());
    }

    if trimmed.len() < 2 || trimmed.len() > 100 {
        return Err("Name must be 2-100 characters".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || ".-'".contains(c))
    {
        return Err("Name may only contain letters, spaces and .-'".into());
    }

    Ok(())
}

/// Validate password strength.
/// - Minimum length: 8 characters
/// - Must contain: uppercase, lowercase, number
pub fn validate_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return Err("Password must not be empty".into());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters".into());
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());

    if !has_upper || !has_lower || !has_digit {
        return Err("Password must contain an uppercase letter, a lowercase letter and a digit".into());
    }

    Ok(())
}

/// Validate a game title (2-200 characters).
pub fn validate_game_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Game name must not be empty".into());
    }

    if trimmed.len() < 2 || trimmed.len() > 200 {
        return Err("Game name must be 2-200 characters".into());
    }

    Ok(())
}

/// Validate a category name (1-100 characters).
pub fn validate_category_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Category name must not be empty".into());
    }

    if trimmed.len() > 100 {
        return Err("Category name must be at most 100 characters".into());
    }

    Ok(())
}

/// Validate a price in integer cents (non-negative, capped).
pub fn validate_price_cents(price_cents: i64) -> ValidationResult {
    if price_cents < 0 {
        return Err("Price must not be negative".into());
    }

    // 1 million in cents; keys never cost more.
    if price_cents > 100_000_000 {
        return Err("Price is out of range".into());
    }

    Ok(())
}

/// Validate a discount percentage (0-100).
pub fn validate_discount_percent(discount: i64) -> ValidationResult {
    if !(0..=100).contains(&discount) {
        return Err("Discount must be between 0 and 100".into());
    }

    Ok(())
}

/// Validate free-form description text.
pub fn validate_description(text: &str) -> ValidationResult {
    if text.len() > 10_000 {
        return Err("Description is too long (max 10000 characters)".into());
    }

    Ok(())
}

/// Strip control characters from free-form input.
pub fn sanitize_string(input: &str) -> String {
    input.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("ana_souza").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("1abc").is_err());
        assert!(validate_username("user name").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Segura123").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("NODIGITSHERE").is_err());
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount_percent(0).is_ok());
        assert!(validate_discount_percent(100).is_ok());
        assert!(validate_discount_percent(-1).is_err());
        assert!(validate_discount_percent(101).is_err());
    }

    #[test]
    fn price_bounds() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_price_cents(100_000_001).is_err());
    }

    #[test]
    fn sanitize_removes_control_chars() {
        assert_eq!(sanitize_string("abc\u{0}def\n"), "abcdef");
    }
}
