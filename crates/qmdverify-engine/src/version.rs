use std::cmp::Ordering;

/// Segment-wise prefix match of a dotted OS version against a filter.
///
/// Each filter segment must equal the version segment at the same position,
/// numerically when both parse as integers and textually otherwise. A filter
/// with more segments than the version never matches.
pub fn version_matches(version: &str, prefix: &str) -> bool {
    let version_parts: Vec<&str> = version.split('.').collect();
    let prefix_parts: Vec<&str> = prefix.split('.').collect();

    if prefix_parts.len() > version_parts.len() {
        return false;
    }

    prefix_parts
        .iter()
        .zip(version_parts.iter())
        .all(|(want, have)| match (want.parse::<i64>(), have.parse::<i64>()) {
            (Ok(want), Ok(have)) => want == have,
            _ => want == have,
        })
}

/// Compare dotted versions segment by segment as integers.
///
/// Missing and non-numeric segments count as zero, so `3.22` and `3.22.0.0`
/// compare equal.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('.').collect();
    let b_parts: Vec<&str> = b.split('.').collect();
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let x = segment_value(a_parts.get(i));
        let y = segment_value(b_parts.get(i));
        if x != y {
            return x.cmp(&y);
        }
    }

    Ordering::Equal
}

fn segment_value(segment: Option<&&str>) -> i64 {
    segment.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Sort newest first.
pub fn sort_versions_desc(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches() {
        assert!(version_matches("3.22.4.2", "3"));
        assert!(version_matches("3.22.4.2", "3.22"));
        assert!(version_matches("3.22.4.2", "3.22.4.2"));
        assert!(!version_matches("3.22.4.2", "3.2"));
        assert!(!version_matches("3.22.4.2", "3.21"));
    }

    #[test]
    fn test_longer_prefix_never_matches() {
        assert!(!version_matches("3.22.4.2", "3.22.4.2.9"));
        assert!(!version_matches("3.22.4.2", "3.22.4.2.0"));
    }

    #[test]
    fn test_numeric_segments_ignore_leading_zeros() {
        assert!(version_matches("3.22.4.2", "03.022"));
    }

    #[test]
    fn test_non_numeric_segments_compare_exactly() {
        assert!(version_matches("3.22-beta.1", "3.22-beta"));
        assert!(!version_matches("3.22-beta.1", "3.22-rc"));
        assert!(!version_matches("3.22.4.2", "3.x"));
    }

    #[test]
    fn test_empty_prefix_matches_only_empty_first_segment() {
        assert!(!version_matches("3.22", ""));
        assert!(version_matches("", ""));
    }

    #[test]
    fn test_compare_versions() {
        let cases = [
            ("3.22.4.2", "3.22.4.2", Ordering::Equal),
            ("3.22.4.2", "3.21.0.79", Ordering::Greater),
            ("3.21.0.79", "3.22.4.2", Ordering::Less),
            ("3.22.4.3", "3.22.4.2", Ordering::Greater),
            ("4.0.0.0", "3.22.4.2", Ordering::Greater),
            ("3.22", "3.22.0.0", Ordering::Equal),
            ("3.22", "3.21.99.99", Ordering::Greater),
            ("1", "2", Ordering::Less),
            ("", "1.0", Ordering::Less),
            ("1.0", "", Ordering::Greater),
            ("", "", Ordering::Equal),
        ];

        for (a, b, expected) in cases {
            assert_eq!(compare_versions(a, b), expected, "compare({a}, {b})");
        }
    }

    #[test]
    fn test_sort_versions_desc() {
        let mut versions = vec![
            "3.20.0.92".to_string(),
            "3.22.4.2".to_string(),
            "3.21.0.79".to_string(),
        ];
        sort_versions_desc(&mut versions);
        assert_eq!(versions, vec!["3.22.4.2", "3.21.0.79", "3.20.0.92"]);
    }
}
