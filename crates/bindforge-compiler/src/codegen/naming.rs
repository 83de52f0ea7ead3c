//! Case conversions shared by generators and templates.

/// Converts a snake_case name to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == '.')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Converts a PascalCase or camelCase name to snake_case.
///
/// Runs of capitals stay together: `HTTPServer` becomes `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '.' || c == ' ' {
            result.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("media_player"), "MediaPlayer");
        assert_eq!(to_pascal_case("widgets"), "Widgets");
        assert_eq!(to_pascal_case("acme.media"), "AcmeMedia");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("MediaPlayer"), "media_player");
        assert_eq!(to_snake_case("mediaPlayer"), "media_player");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("media"), "media");
    }
}
