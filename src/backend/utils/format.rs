// src/backend/utils/format.rs

/// Shortens an address for display: first six and last four characters.
/// Anything shorter than ten characters is returned unchanged.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Loose shape check for Aleo account addresses (`aleo1` + 58 bech32 chars).
pub fn is_aleo_address(candidate: &str) -> bool {
    candidate.len() == 63
        && candidate.starts_with("aleo1")
        && candidate[5..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_long_addresses() {
        let addr = "aleo1qnr4dkkvkgfqph0vzc3y6z2eu975wnpz2925ntjccd5cfqxtyu8s7pyjh9";
        assert_eq!(format_address(addr), "aleo1q...yjh9");
        assert_eq!(format_address("short"), "short");
        assert_eq!(format_address(""), "");
    }

    #[test]
    fn recognises_aleo_addresses() {
        assert!(is_aleo_address(
            "aleo1qnr4dkkvkgfqph0vzc3y6z2eu975wnpz2925ntjccd5cfqxtyu8s7pyjh9"
        ));
        assert!(!is_aleo_address("aleo1abc"));
        assert!(!is_aleo_address(
            "ALEO1qnr4dkkvkgfqph0vzc3y6z2eu975wnpz2925ntjccd5cfqxtyu8s7pyjh9"
        ));
    }
}
