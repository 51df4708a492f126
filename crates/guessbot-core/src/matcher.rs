//! Fuzzy answer matching.
//!
//! A guess is scored against each canonical answer by the length of the
//! longest run of characters the two share, divided by the answer's length.
//! The best-scoring answer (first one on ties) wins if its score reaches the
//! threshold. This tolerates typos and plurals ("dogs" still matches "dog"),
//! at the price of being touchy on very short answers.

/// Default similarity needed to accept a guess.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Result of matching one guess against a question's answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome {
    /// The guess was blank after normalization; nothing was scored.
    Empty,
    /// No answer reached the threshold.
    NoMatch {
        /// Highest similarity seen (0.0 when there were no answers).
        best: f64,
    },
    /// `slot` was the best answer and scored `similarity >= threshold`.
    Match { slot: usize, similarity: f64 },
}

impl MatchOutcome {
    /// The matched slot, if any.
    pub fn slot(&self) -> Option<usize> {
        match self {
            MatchOutcome::Match { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

/// Lowercase and drop every whitespace character.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Length of the longest contiguous run of characters common to `a` and `b`.
///
/// Classic dynamic programme: cell `(i, j)` holds the length of the common
/// suffix of `a[..i]` and `b[..j]`, extended on a matching diagonal and reset
/// to zero on a mismatch. Only the previous row is kept.
pub fn longest_common_run(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut longest = 0;

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            longest = longest.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    longest
}

/// Similarity of an already-normalized guess to one answer, in `[0, 1]`.
///
/// The answer is lowercased before comparison. An empty answer scores 0.
pub fn similarity(normalized_guess: &str, answer: &str) -> f64 {
    let guess: Vec<char> = normalized_guess.chars().collect();
    let answer: Vec<char> = answer.chars().flat_map(char::to_lowercase).collect();
    if answer.is_empty() {
        return 0.0;
    }
    longest_common_run(&guess, &answer) as f64 / answer.len() as f64
}

/// Match a raw guess against a question's canonical answers.
pub fn match_guess<S: AsRef<str>>(raw: &str, answers: &[S], threshold: f64) -> MatchOutcome {
    let guess = normalize(raw);
    if guess.is_empty() {
        return MatchOutcome::Empty;
    }

    let mut best: Option<(usize, f64)> = None;
    for (slot, answer) in answers.iter().enumerate() {
        let score = similarity(&guess, answer.as_ref());
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((slot, score));
        }
    }

    match best {
        Some((slot, similarity)) if similarity >= threshold => {
            MatchOutcome::Match { slot, similarity }
        }
        Some((_, best)) => MatchOutcome::NoMatch { best },
        None => MatchOutcome::NoMatch { best: 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: [&str; 6] = ["dog", "cat", "fish", "bird", "hamster", "snake"];

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn normalize_lowercases_and_strips_whitespace() {
        assert_eq!(normalize("  Golden\tRetriever \n"), "goldenretriever");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn longest_common_run_basic() {
        assert_eq!(longest_common_run(&chars("hamsters"), &chars("hamster")), 7);
        assert_eq!(longest_common_run(&chars("xabcy"), &chars("zabcw")), 3);
        assert_eq!(longest_common_run(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(longest_common_run(&chars(""), &chars("abc")), 0);
    }

    #[test]
    fn run_resets_on_mismatch() {
        // "ab" and "cd" are both common but never contiguous together.
        assert_eq!(longest_common_run(&chars("abxcd"), &chars("abycd")), 2);
    }

    #[test]
    fn exact_answers_match_with_full_similarity() {
        for (slot, answer) in PETS.iter().enumerate() {
            let upper = answer.to_uppercase();
            let spaced = format!(" {} ", upper);
            assert_eq!(
                match_guess(&spaced, &PETS, DEFAULT_THRESHOLD),
                MatchOutcome::Match {
                    slot,
                    similarity: 1.0
                }
            );
        }
    }

    #[test]
    fn inner_whitespace_is_ignored() {
        let answers = ["goldenretriever"];
        assert_eq!(
            match_guess("Golden Retriever", &answers, DEFAULT_THRESHOLD).slot(),
            Some(0)
        );
    }

    #[test]
    fn plurals_and_small_typos_match() {
        assert_eq!(match_guess("Dogs", &PETS, DEFAULT_THRESHOLD).slot(), Some(0));
        assert_eq!(
            match_guess("hamstr", &PETS, DEFAULT_THRESHOLD),
            MatchOutcome::NoMatch { best: 5.0 / 7.0 }
        );
        assert_eq!(match_guess("hamsterr", &PETS, DEFAULT_THRESHOLD).slot(), Some(4));
    }

    #[test]
    fn below_threshold_is_no_match() {
        assert!(matches!(
            match_guess("elephant", &PETS, DEFAULT_THRESHOLD),
            MatchOutcome::NoMatch { .. }
        ));
        // 3 of 4 letters is 0.75, just under the bar.
        assert!(matches!(
            match_guess("fis", &PETS, DEFAULT_THRESHOLD),
            MatchOutcome::NoMatch { best } if (best - 0.75).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn empty_input_short_circuits() {
        assert_eq!(match_guess("", &PETS, DEFAULT_THRESHOLD), MatchOutcome::Empty);
        assert_eq!(match_guess(" \t\n", &PETS, DEFAULT_THRESHOLD), MatchOutcome::Empty);
        let none: [&str; 0] = [];
        assert_eq!(match_guess("", &none, DEFAULT_THRESHOLD), MatchOutcome::Empty);
    }

    #[test]
    fn ties_go_to_the_first_slot() {
        let answers = ["cart", "dart", "cat"];
        // "art" scores 0.75 against both "cart" and "dart".
        assert_eq!(
            match_guess("art", &answers, 0.7),
            MatchOutcome::Match {
                slot: 0,
                similarity: 0.75
            }
        );
    }

    #[test]
    fn canonical_answers_compare_case_insensitively() {
        let answers = ["Dog", "CAT"];
        assert_eq!(match_guess("cat", &answers, DEFAULT_THRESHOLD).slot(), Some(1));
    }

    #[test]
    fn no_answers_never_match() {
        let none: [&str; 0] = [];
        assert_eq!(
            match_guess("dog", &none, DEFAULT_THRESHOLD),
            MatchOutcome::NoMatch { best: 0.0 }
        );
    }
}
