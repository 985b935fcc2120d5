use regex::Regex;

/// Replace every whole-word occurrence of `current` (optionally `v`-prefixed)
/// with `new_version`. `None` when the text doesn't change.
pub fn replace_version(content: &str, current: &str, new_version: &str) -> Option<String> {
    if !content.contains(current) {
        return None;
    }

    // A following `-`, `+` or `.x` would make it a different version (`1.2.3-beta.1`)
    let pattern = format!(
        r"(?P<prefix>\b|v){}(?P<tail>$|[^-+.\w]|\.$|\.[^\w])",
        regex::escape(current)
    );
    let re = Regex::new(&pattern).ok()?;
    let replacement = format!("${{prefix}}{}${{tail}}", new_version);
    let replaced = re.replace_all(content, replacement.as_str());

    (replaced != content).then(|| replaced.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_all_occurrences() {
        let content = "version 1.2.3\ncurl .../v1.2.3/install.sh\n";
        assert_eq!(
            replace_version(content, "1.2.3", "1.3.0").unwrap(),
            "version 1.3.0\ncurl .../v1.3.0/install.sh\n"
        );
    }

    #[test]
    fn test_ignores_partial_numbers() {
        assert_eq!(replace_version("11.2.34", "1.2.3", "2.0.0"), None);
    }

    #[test]
    fn test_longer_versions_left_alone() {
        assert_eq!(replace_version("next: 1.2.3-beta.1", "1.2.3", "1.3.0"), None);
        assert_eq!(replace_version("1.2.3+build.7 1.2.3.4", "1.2.3", "1.3.0"), None);
        assert_eq!(
            replace_version("1.2.3-beta.1 follows 1.2.3.\n", "1.2.3", "1.3.0").unwrap(),
            "1.2.3-beta.1 follows 1.3.0.\n"
        );
    }

    #[test]
    fn test_adjacent_and_trailing_occurrences() {
        assert_eq!(
            replace_version("1.2.3,1.2.3 v1.2.3", "1.2.3", "2.0.0").unwrap(),
            "2.0.0,2.0.0 v2.0.0"
        );
    }

    #[test]
    fn test_dots_are_literal() {
        assert_eq!(replace_version("1a2b3", "1.2.3", "2.0.0"), None);
    }

    #[test]
    fn test_already_current() {
        assert_eq!(replace_version("VERSION = 2.0.0", "2.0.0", "2.0.0"), None);
    }
}
