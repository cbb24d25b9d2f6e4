//! Guess comparison and score rewards.
//!
//! Every non-storyteller answer pays somebody: a match pays the guesser,
//! a miss or timeout pays the storyteller. Scores only ever go up.

/// Points a guesser earns for finding the storyteller's phrase.
pub const CORRECT_GUESS_POINTS: u32 = 2;

/// Points the storyteller earns for every wrong or timed-out guess.
pub const STORYTELLER_MISS_REWARD: u32 = 1;

/// Content recorded for auto-submitted timeout guesses.
pub const TIMEOUT_CONTENT: &str = "[timed out]";

/// Points earned by a guess against the turn's secret phrase.
///
/// A turn whose storyteller never set a phrase cannot be matched, so every
/// guess on it is a miss.
pub fn score_guess(element: Option<&str>, content: &str) -> u32 {
    match element {
        Some(target) if phrases_match(target, content) => CORRECT_GUESS_POINTS,
        _ => 0,
    }
}

/// Case-, whitespace-, and punctuation-insensitive phrase comparison.
pub fn phrases_match(target: &str, guess: &str) -> bool {
    let target = normalize(target);
    !target.is_empty() && target == normalize(guess)
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_scores() {
        assert_eq!(score_guess(Some("haunted mill"), "haunted mill"), CORRECT_GUESS_POINTS);
    }

    #[test]
    fn match_ignores_case_whitespace_and_punctuation() {
        assert!(phrases_match("Haunted Mill", "haunted-mill"));
        assert!(phrases_match("haunted mill", "  HAUNTED   MILL!  "));
        assert!(phrases_match("it's a trap", "Its a Trap"));
    }

    #[test]
    fn different_phrases_do_not_match() {
        assert_eq!(score_guess(Some("haunted mill"), "haunted hill"), 0);
        assert!(!phrases_match("haunted mill", "haunted"));
    }

    #[test]
    fn missing_element_never_matches() {
        assert_eq!(score_guess(None, "anything"), 0);
        assert_eq!(score_guess(None, ""), 0);
    }

    #[test]
    fn empty_target_never_matches() {
        assert!(!phrases_match("!!!", "!!!"));
        assert!(!phrases_match("", ""));
    }
}
