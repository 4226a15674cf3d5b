//! Similarity scoring
//!
//! Score in [0, 1] for one normalized candidate against one normalized
//! inventory name. Three signals, best one wins:
//!
//! - containment: one string is a prefix (or substring) of the other —
//!   the common "typed the first half of the name" case,
//! - token overlap: Jaccard over `-`/`_`/`.`/`/` separated tokens,
//! - edit similarity: `1 - levenshtein / max_len`.

/// A score together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub score: f64,
    pub rule: &'static str,
}

/// Score `query` against `name`. Both must already be normalized.
pub fn similarity(query: &str, name: &str) -> Similarity {
    if query.is_empty() || name.is_empty() {
        return Similarity { score: 0.0, rule: "empty" };
    }
    if query == name {
        return Similarity { score: 1.0, rule: "exact" };
    }

    let mut best = Similarity {
        score: edit_similarity(query, name),
        rule: "edit distance",
    };

    let (shorter, longer) = if query.len() <= name.len() {
        (query, name)
    } else {
        (name, query)
    };
    let ratio = shorter.len() as f64 / longer.len() as f64;
    if longer.starts_with(shorter) {
        let score = 0.7 + 0.3 * ratio;
        if score > best.score {
            best = Similarity { score, rule: "prefix" };
        }
    } else if longer.contains(shorter) {
        let score = 0.55 + 0.25 * ratio;
        if score > best.score {
            best = Similarity { score, rule: "substring" };
        }
    }

    let overlap = token_overlap(query, name);
    if overlap > 0.0 {
        let score = 0.35 + 0.45 * overlap;
        if score > best.score {
            best = Similarity { score, rule: "token overlap" };
        }
    }

    best
}

fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Jaccard index over separator-delimited tokens.
fn token_overlap(a: &str, b: &str) -> f64 {
    let tokens = |s: &str| -> Vec<String> {
        s.split(['-', '_', '.', '/', ' '])
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    };
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.iter().filter(|t| tb.contains(t)).count();
    let union = ta.len() + tb.len() - shared;
    shared as f64 / union as f64
}

/// Classic two-row Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
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
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn exact_scores_one() {
        let s = similarity("web-api", "web-api");
        assert_eq!(s.score, 1.0);
        assert_eq!(s.rule, "exact");
    }

    #[test]
    fn prefix_beats_edit_distance() {
        // "prod-ap" is a prefix of "prod-api"
        let s = similarity("prod-ap", "prod-api");
        assert_eq!(s.rule, "prefix");
        assert!(s.score > 0.9);
    }

    #[test]
    fn longer_prefix_extension_scores_lower() {
        let near = similarity("prod-ap", "prod-api").score;
        let far = similarity("prod-ap", "prod-api2").score;
        assert!(near > far);
        // Both remain close: the tie band must catch them
        assert!(near - far < 0.05);
    }

    #[test]
    fn disjoint_names_score_near_zero() {
        let s = similarity("database", "web-frontend");
        assert!(s.score < 0.35, "score was {}", s.score);
    }

    #[test]
    fn shared_tokens_score_midband() {
        let s = similarity("web", "web-frontend");
        assert!(s.score >= 0.35);
        assert!(s.score < 0.85);
    }
}
