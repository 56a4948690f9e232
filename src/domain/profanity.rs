/// Masks banned words in post bodies
///
/// Words are split on single spaces and compared case-insensitively. A match
/// is replaced by `****`; punctuation attached to a word prevents a match.
/// Words that are not masked keep their case, so the body is never lowercased.

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

pub fn mask_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if BANNED_WORDS.iter().any(|banned| word.eq_ignore_ascii_case(banned)) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_banned_words() {
        assert_eq!(mask_profanity("this is a kerfuffle"), "this is a ****");
        assert_eq!(mask_profanity("Sharbert and FORNAX"), "**** and ****");
    }

    #[test]
    fn test_keeps_other_words_and_spacing() {
        assert_eq!(mask_profanity("Hello  World"), "Hello  World");
        assert_eq!(mask_profanity("What A Kerfuffle Today"), "What A **** Today");
    }

    #[test]
    fn test_punctuation_prevents_match() {
        assert_eq!(mask_profanity("what a kerfuffle!"), "what a kerfuffle!");
    }
}
