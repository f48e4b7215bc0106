//! Partial-match similarity for keyword scoring.

/// Best similarity of `needle` against any same-length window of `haystack`,
/// in `[0.0, 100.0]`. Exact containment short-circuits to 100.
#[must_use]
pub fn partial_ratio(needle: &str, haystack: &str) -> f64 {
    if needle.is_empty() || haystack.is_empty() {
        return 0.0;
    }
    if haystack.contains(needle) {
        return 100.0;
    }

    let needle: Vec<char> = needle.chars().collect();
    let haystack: Vec<char> = haystack.chars().collect();

    if haystack.len() <= needle.len() {
        return similarity(&needle, &haystack);
    }

    let mut best: f64 = 0.0;
    for start in 0..=(haystack.len() - needle.len()) {
        let window = &haystack[start..start + needle.len()];
        best = best.max(similarity(&needle, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

#[expect(clippy::cast_precision_loss)]
fn similarity(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 0.0;
    }
    let dist = edit_distance(a, b);
    (1.0 - dist as f64 / max_len as f64) * 100.0
}

fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_containment_is_100() {
        assert!((partial_ratio("articles", "the articles of association") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn identical_strings_are_100() {
        assert!((partial_ratio("ubo declaration", "ubo declaration") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_are_zero() {
        assert!(partial_ratio("", "text").abs() < 1e-9);
        assert!(partial_ratio("text", "").abs() < 1e-9);
    }

    #[test]
    fn near_match_scores_high() {
        let score = partial_ratio("memorandum of association", "memorandum of asociation text");
        assert!(score > 90.0);
        assert!(score < 100.0);
    }

    #[test]
    fn unrelated_scores_low() {
        assert!(partial_ratio("board resolution", "zzzzzz qqqqqq xxxxxx yyyyyy") < 40.0);
    }

    #[test]
    fn needle_longer_than_haystack() {
        let score = partial_ratio("register of members", "register");
        assert!(score > 0.0);
        assert!(score < 100.0);
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance(&['a', 'b'], &['a', 'b']), 0);
        assert_eq!(edit_distance(&['a'], &['b']), 1);
        assert_eq!(edit_distance(&[], &['a', 'b']), 2);
    }
}
