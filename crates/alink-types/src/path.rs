//! Metadata subtree paths and the numeric key parsing shared by the codecs.
//!
//! Subtree paths are slash-separated and carry no leading slash
//! (`public/asset_metadata/titles/0`). Joining trims stray slashes from every
//! segment and drops empty segments, so `join(["a/", "", "/b"])` is `a/b`.

/// Root of the editable asset metadata inside an object.
pub const ASSET_METADATA: &str = "public/asset_metadata";

/// Join path segments into a normalized subtree path.
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for segment in segments {
        for part in segment.as_ref().split('/').filter(|p| !p.is_empty()) {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(part);
        }
    }
    out
}

/// Split a subtree path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|p| !p.is_empty())
}

/// The last non-empty segment of a path, if any.
pub fn last_segment(path: &str) -> Option<&str> {
    segments(path).last()
}

/// Parse the leading integer of a string the way stored keys have always been
/// read: optional surrounding whitespace, optional sign, then as many decimal
/// digits as are present. `"2"`, `"02"` and `"2nd"` all yield 2; `"foo"` and
/// `""` yield `None`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn join_normalizes_slashes() {
        assert_eq!(join(["public/asset_metadata", "titles", "0"]), "public/asset_metadata/titles/0");
        assert_eq!(join(["a/", "", "/b/", "c"]), "a/b/c");
        assert_eq!(join(Vec::<String>::new()), "");
    }

    #[test]
    fn last_segment_ignores_trailing_slash() {
        assert_eq!(last_segment("./meta/public/asset_metadata/titles/my-slug/"), Some("my-slug"));
        assert_eq!(last_segment(""), None);
    }

    #[test]
    fn int_prefix_matches_key_semantics() {
        assert_eq!(parse_int_prefix("2"), Some(2));
        assert_eq!(parse_int_prefix("02"), Some(2));
        assert_eq!(parse_int_prefix("2nd"), Some(2));
        assert_eq!(parse_int_prefix(" -3"), Some(-3));
        assert_eq!(parse_int_prefix("foo"), None);
        assert_eq!(parse_int_prefix("default"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    proptest! {
        #[test]
        fn int_prefix_roundtrips_integers(n in -1_000_000i64..1_000_000) {
            prop_assert_eq!(parse_int_prefix(&n.to_string()), Some(n));
        }

        #[test]
        fn int_prefix_ignores_suffix(n in 0i64..100_000, suffix in "[a-z_]{0,6}") {
            prop_assert_eq!(parse_int_prefix(&format!("{n}{suffix}")), Some(n));
        }
    }
}
