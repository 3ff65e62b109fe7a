//! Textual similarity primitives
//!
//! Two signals, combined:
//! - Jaccard similarity over 3-word shingles (order-sensitive, exact)
//! - SimHash over the same shingles (a 64-bit fingerprint whose Hamming
//!   distance approximates cosine similarity)
//!
//! The combined score weights Jaccard higher since it is the exact measure;
//! SimHash smooths over small reorderings.

use std::collections::HashSet;

use crate::core::util::hash_str64;

/// Shingle width in words
const SHINGLE_WORDS: usize = 3;

/// Weight of the Jaccard signal in the combined score
const JACCARD_WEIGHT: f64 = 0.6;

/// Weight of the SimHash signal in the combined score
const SIMHASH_WEIGHT: f64 = 0.4;

/// Similarity fingerprint of one document
#[derive(Debug, Clone)]
pub struct Fingerprint {
    /// Hashes of 3-word shingles
    pub shingles: HashSet<u64>,
    /// 64-bit SimHash over the shingles
    pub simhash: u64,
}

impl Fingerprint {
    /// Fingerprint a document's text content
    pub fn of(text: &str) -> Self {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|w| !w.is_empty())
            .collect();

        let mut shingles = HashSet::new();
        if words.len() < SHINGLE_WORDS {
            // Degenerate documents: fall back to single words
            for w in &words {
                shingles.insert(hash_str64(&w.to_lowercase()));
            }
        } else {
            for window in words.windows(SHINGLE_WORDS) {
                let shingle = window.join(" ").to_lowercase();
                shingles.insert(hash_str64(&shingle));
            }
        }

        let simhash = simhash_of(&shingles);
        Self { shingles, simhash }
    }

    /// Combined similarity against another fingerprint, in [0, 1]
    pub fn similarity(&self, other: &Fingerprint) -> f64 {
        let jaccard = jaccard_similarity(&self.shingles, &other.shingles);
        let simhash = simhash_similarity(self.simhash, other.simhash);
        JACCARD_WEIGHT * jaccard + SIMHASH_WEIGHT * simhash
    }
}

/// Jaccard similarity of two shingle sets
pub fn jaccard_similarity(a: &HashSet<u64>, b: &HashSet<u64>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Compute a 64-bit SimHash fingerprint from shingle hashes
fn simhash_of(shingles: &HashSet<u64>) -> u64 {
    let mut v = [0i32; 64];

    for h in shingles {
        for (i, slot) in v.iter_mut().enumerate() {
            if (h >> i) & 1 == 1 {
                *slot += 1;
            } else {
                *slot -= 1;
            }
        }
    }

    let mut fingerprint: u64 = 0;
    for (i, slot) in v.iter().enumerate() {
        if *slot > 0 {
            fingerprint |= 1 << i;
        }
    }

    fingerprint
}

/// Convert SimHash Hamming distance to similarity (0.0 to 1.0)
pub fn simhash_similarity(a: u64, b: u64) -> f64 {
    let distance = (a ^ b).count_ones();
    1.0 - (distance as f64 / 64.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_scores_one() {
        let text = "How do I install the compiler on my machine today";
        let a = Fingerprint::of(text);
        let b = Fingerprint::of(text);
        assert!((a.similarity(&b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disjoint_text_scores_low() {
        let a = Fingerprint::of("alpha beta gamma delta epsilon zeta eta theta");
        let b = Fingerprint::of("one two three four five six seven eight");
        assert!(a.similarity(&b) < 0.5);
    }

    #[test]
    fn test_near_identical_text_scores_high() {
        let base = "The language supports pattern matching, generics, and traits. \
                    It compiles to native code and has no garbage collector. \
                    The community maintains an extensive package registry.";
        let tweaked = "The language supports pattern matching, generics, and traits. \
                       It compiles to native code and has no garbage collector. \
                       The community maintains a large package registry.";
        let a = Fingerprint::of(base);
        let b = Fingerprint::of(tweaked);
        assert!(a.similarity(&b) > 0.7, "got {}", a.similarity(&b));
    }

    #[test]
    fn test_jaccard_edge_cases() {
        let empty: HashSet<u64> = HashSet::new();
        let some: HashSet<u64> = [1, 2, 3].into_iter().collect();
        assert_eq!(jaccard_similarity(&empty, &empty), 1.0);
        assert_eq!(jaccard_similarity(&empty, &some), 0.0);
        assert_eq!(jaccard_similarity(&some, &some), 1.0);
    }

    #[test]
    fn test_simhash_similarity_bounds() {
        assert_eq!(simhash_similarity(0, 0), 1.0);
        assert_eq!(simhash_similarity(0, u64::MAX), 0.0);
    }

    #[test]
    fn test_short_text_falls_back_to_words() {
        let a = Fingerprint::of("hello world");
        let b = Fingerprint::of("hello world");
        assert!(!a.shingles.is_empty());
        assert!((a.similarity(&b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_case_insensitive() {
        let a = Fingerprint::of("The Quick Brown Fox Jumps Over");
        let b = Fingerprint::of("the quick brown fox jumps over");
        assert!((a.similarity(&b) - 1.0).abs() < f64::EPSILON);
    }
}
