use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Token sets
// ---------------------------------------------------------------------------

/// Deterministically ordered token set. BTreeSet so fingerprint iteration
/// order never depends on hashing.
pub type TokenSet = BTreeSet<String>;

/// English stop-words excluded from fingerprints. Connective words carry no
/// topical signal and would inflate Jaccard unions.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "an", "and", "any", "are", "as", "at", "be", "but", "by", "can",
    "do", "for", "from", "has", "have", "how", "if", "in", "into", "is", "it", "its", "more",
    "most", "no", "not", "of", "on", "or", "our", "out", "over", "so", "than", "that", "the",
    "their", "this", "to", "under", "up", "us", "was", "we", "what", "when", "where", "which",
    "will", "with", "you", "your",
];

/// Path segments that describe the serving stack, not the content.
const URL_NOISE: &[&str] = &[
    "amp", "asp", "aspx", "htm", "html", "index", "page", "php", "shtml", "www",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

fn is_url_noise(token: &str) -> bool {
    URL_NOISE.binary_search(&token).is_ok()
}

/// Lowercase, split on non-alphanumerics, drop stop-words and single
/// characters. The surviving tokens are the text's fingerprint contribution.
pub fn tokenize(text: &str) -> TokenSet {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2 && !is_stop_word(t))
        .map(|t| t.to_string())
        .collect()
}

/// Tokenize only the path of a URL: scheme, host, query string, and fragment
/// are stripped first, then stack noise like `html` or `index` is dropped.
/// Strings without a scheme are treated as already being a path.
pub fn url_path_tokens(url: &str) -> TokenSet {
    let after_scheme = match url.find("://") {
        Some(i) => &url[i + 3..],
        None => url,
    };
    let path = match after_scheme.find('/') {
        Some(i) => &after_scheme[i..],
        // Bare host, no path component.
        None => {
            if url.contains("://") {
                ""
            } else {
                after_scheme
            }
        }
    };
    let path = path.split(['?', '#']).next().unwrap_or("");

    let mut tokens = tokenize(path);
    tokens.retain(|t| !is_url_noise(t));
    tokens
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

/// Jaccard similarity |a ∩ b| / |a ∪ b|. Returns 0.0 when either side is
/// empty so degenerate inputs never produce NaN.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Fraction of `queries` tokens covered by `target`: |q ∩ t| / |q|.
/// Asymmetric on purpose — it measures how well the target topic covers what
/// searchers actually ask for. Returns 0.0 when `queries` is empty.
pub fn coverage(queries: &TokenSet, target: &TokenSet) -> f64 {
    if queries.is_empty() {
        return 0.0;
    }
    let covered = queries.intersection(target).count();
    covered as f64 / queries.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> TokenSet {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn stop_and_noise_lists_sorted() {
        // binary_search requires sorted constants
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(STOP_WORDS, sorted.as_slice());

        let mut sorted = URL_NOISE.to_vec();
        sorted.sort_unstable();
        assert_eq!(URL_NOISE, sorted.as_slice());
    }

    #[test]
    fn tokenize_basic() {
        let tokens = tokenize("The Mountain Bikes of 2026!");
        assert_eq!(tokens, set(&["2026", "bikes", "mountain"]));
    }

    #[test]
    fn tokenize_drops_short_and_stop_words() {
        let tokens = tokenize("a guide to X and the Y");
        assert!(tokens.is_empty());
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn url_path_strips_scheme_host_query() {
        let tokens = url_path_tokens("https://www.example.com/bikes/mountain-bikes.html?ref=nav#top");
        assert_eq!(tokens, set(&["bikes", "mountain"]));
    }

    #[test]
    fn url_path_without_scheme() {
        let tokens = url_path_tokens("/gear/helmets/index.php");
        assert_eq!(tokens, set(&["gear", "helmets"]));
    }

    #[test]
    fn url_bare_host_yields_nothing() {
        assert!(url_path_tokens("https://example.com").is_empty());
    }

    #[test]
    fn jaccard_identical() {
        let a = set(&["mountain", "bikes"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn jaccard_partial() {
        let a = set(&["mountain", "bikes", "guide"]);
        let b = set(&["mountain", "bikes"]);
        // intersection 2, union 3
        assert!((jaccard(&a, &b) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn jaccard_disjoint() {
        let a = set(&["mountain"]);
        let b = set(&["pricing"]);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_empty_is_zero_not_nan() {
        let empty = TokenSet::new();
        let b = set(&["mountain"]);
        assert_eq!(jaccard(&empty, &b), 0.0);
        assert_eq!(jaccard(&b, &empty), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn coverage_full_and_partial() {
        let queries = set(&["mountain", "bikes"]);
        let topic = set(&["mountain", "bikes", "trail"]);
        assert_eq!(coverage(&queries, &topic), 1.0);

        let queries = set(&["mountain", "bikes", "cheap", "carbon"]);
        assert_eq!(coverage(&queries, &topic), 0.5);
    }

    #[test]
    fn coverage_empty_queries_is_zero() {
        let topic = set(&["mountain"]);
        assert_eq!(coverage(&TokenSet::new(), &topic), 0.0);
    }
}
