//! Fuzzy identifier matching.
//!
//! Answers supplied on the command line rarely use the exact spelling of the
//! template's variables (`--fullName` vs `____AUTHOR_FULL_NAME____`). Names
//! are compared on their normalized form: separators removed, lowercased.
//!
//! Matching is pairwise and first-hit. There is no ranking between several
//! candidates that all match; the caller's iteration order decides.

/// Shortest window used by the overlap heuristic.
pub const MIN_OVERLAP: usize = 4;

/// Canonical form of an identifier: ASCII letters and digits only, lowercase.
///
/// `USER_FULL_NAME`, `userFullName` and `user-full-name` all normalize to
/// `userfullname`.
pub fn normalize_identifier(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Whether two *normalized* identifiers refer to the same thing.
///
/// Equal, contained in one another, or sharing a window of
/// [`MIN_OVERLAP`] characters.
///
/// An empty identifier only matches another empty one. Plain substring
/// containment would let an all-punctuation key (normalized to `""`) match
/// every variable, so the empty case is excluded from containment.
pub fn identifiers_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    // An empty side would be "contained" in everything.
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(b) || b.contains(a) {
        return true;
    }
    has_significant_overlap(a, b)
}

/// Normalize both sides, then [`identifiers_match`].
pub fn names_match(a: &str, b: &str) -> bool {
    identifiers_match(&normalize_identifier(a), &normalize_identifier(b))
}

/// Slide a [`MIN_OVERLAP`]-wide window over the shorter string and look for
/// it in the longer one.
fn has_significant_overlap(a: &str, b: &str) -> bool {
    if a.len() < MIN_OVERLAP || b.len() < MIN_OVERLAP {
        return false;
    }

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    // Normalized identifiers are ASCII, so byte windows are char windows.
    shorter
        .as_bytes()
        .windows(MIN_OVERLAP)
        .filter_map(|w| std::str::from_utf8(w).ok())
        .any(|w| longer.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_separators_and_case() {
        assert_eq!(normalize_identifier("USER_FULL_NAME"), "userfullname");
        assert_eq!(normalize_identifier("userFullName"), "userfullname");
        assert_eq!(normalize_identifier("user-full-name"), "userfullname");
        assert_eq!(normalize_identifier("__x.y z__"), "xyz");
    }

    #[test]
    fn normalization_drops_non_ascii() {
        assert_eq!(normalize_identifier("naïve"), "nave");
    }

    #[test]
    fn equal_identifiers_match() {
        assert!(identifiers_match("author", "author"));
    }

    #[test]
    fn containment_matches_both_directions() {
        let a = normalize_identifier("USERFULLNAME");
        let b = normalize_identifier("fullName");
        assert!(identifiers_match(&a, &b));
        assert!(identifiers_match(&b, &a));
    }

    #[test]
    fn window_overlap_matches() {
        let a = normalize_identifier("MODULEDESC");
        let b = normalize_identifier("description");
        // "desc" is shared, neither contains the other.
        assert!(!a.contains(&b) && !b.contains(&a));
        assert!(identifiers_match(&a, &b));
    }

    #[test]
    fn short_identifiers_never_overlap() {
        assert!(!has_significant_overlap("abc", "abcdef"));
        assert!(!has_significant_overlap("abcdef", "abc"));
        assert!(!identifiers_match("abc", "xyzw"));
    }

    #[test]
    fn short_identifier_still_matches_by_containment() {
        // Containment has no minimum length.
        assert!(identifiers_match("abc", "abcdef"));
    }

    #[test]
    fn unrelated_identifiers_do_not_match() {
        assert!(!identifiers_match("projectname", "license"));
        assert!(!identifiers_match("email", "year"));
    }

    #[test]
    fn empty_identifier_matches_nothing_but_itself() {
        assert!(!identifiers_match("", "anything"));
        assert!(!identifiers_match("anything", ""));
        assert!(identifiers_match("", ""));
    }

    #[test]
    fn names_match_normalizes_first() {
        assert!(names_match("AUTHOR_NAME", "authorName"));
        assert!(names_match("fullName", "USER_FULL_NAME"));
    }
}
