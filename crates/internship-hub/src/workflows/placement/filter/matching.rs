const TOKEN_DELIMITERS: [char; 5] = [';', ',', '|', '/', '-'];

pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn same_text(left: &str, right: &str) -> bool {
    normalize(left) == normalize(right)
}

/// Splits a multi-value field such as `"Computer Science; Data Science"` into trimmed tokens.
pub(crate) fn tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(TOKEN_DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// True when the whole field or any of its tokens equals `wanted`.
pub(crate) fn field_matches(source: &str, wanted: &str) -> bool {
    let wanted = normalize(wanted);
    normalize(source) == wanted || tokens(source).any(|token| normalize(token) == wanted)
}

/// Blank and "any"/"all" preferred majors place no restriction on applicants.
pub(crate) fn is_unrestricted(preferred: Option<&str>) -> bool {
    match preferred.map(normalize) {
        None => true,
        Some(value) => value.is_empty() || value == "any" || value == "all",
    }
}

pub(crate) fn major_admits(preferred: Option<&str>, major: &str) -> bool {
    match preferred {
        Some(preferred) if !is_unrestricted(Some(preferred)) => field_matches(preferred, major),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_split_on_every_supported_delimiter() {
        let parsed: Vec<_> = tokens("CS; Data Science,EEE | Math/Physics - Biology").collect();
        assert_eq!(
            parsed,
            vec!["CS", "Data Science", "EEE", "Math", "Physics", "Biology"]
        );
    }

    #[test]
    fn field_matching_ignores_case_and_padding() {
        assert!(field_matches("  Computer Science ", "computer science"));
        assert!(field_matches("Business;Computer Science", "COMPUTER SCIENCE"));
        assert!(!field_matches("Computer Engineering", "Computer Science"));
    }

    #[test]
    fn blank_and_any_majors_are_unrestricted() {
        assert!(is_unrestricted(None));
        assert!(is_unrestricted(Some("   ")));
        assert!(is_unrestricted(Some("Any")));
        assert!(!is_unrestricted(Some("Biology")));
        assert!(major_admits(Some("ANY"), "History"));
        assert!(!major_admits(Some("Biology"), "History"));
    }
}
