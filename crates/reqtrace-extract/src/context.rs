use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// Chars kept on each side of a match when sentence lookup fails.
pub const FALLBACK_WINDOW: usize = 150;

struct Sentence<'a> {
    text: &'a str,
    /// Byte range owned by the sentence, trailing delimiter run included.
    start: usize,
    end: usize,
}

fn sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for delim in SENTENCE_END.find_iter(text) {
        out.push(Sentence { text: &text[start..delim.start()], start, end: delim.end() });
        start = delim.end();
    }
    out.push(Sentence { text: &text[start..], start, end: text.len() });
    out
}

/// Trimmed, non-empty sentences of `text`, split on runs of `.`, `!`, `?`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentences(text).into_iter().map(|s| s.text.trim()).filter(|s| !s.is_empty()).collect()
}

/// The sentence containing byte offset `start` plus its neighbours, as the
/// contiguous slice of `text` they span (the last one's delimiter excluded),
/// so the result stays a substring of `text`. Falls back to a window of
/// [`FALLBACK_WINDOW`] chars around `start..end`.
pub fn requirement_context(text: &str, start: usize, end: usize) -> String {
    let all = sentences(text);
    let position = all.iter().position(|s| s.start <= start && (start < s.end || s.end == text.len()));
    if let Some(i) = position {
        let lo = i.saturating_sub(1);
        let hi = (i + 1).min(all.len() - 1);
        let mut spanned = all[lo..=hi].iter().filter(|s| !s.text.trim().is_empty());
        if let Some(first) = spanned.next() {
            let last = spanned.last().unwrap_or(first);
            return text[first.start..last.start + last.text.len()].trim().to_string();
        }
    }
    window(text, start, end, FALLBACK_WINDOW).to_string()
}

fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let lo = text[..start.min(text.len())]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let tail_from = end.min(text.len());
    let hi = text[tail_from..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| tail_from + i)
        .unwrap_or(text.len());
    &text[lo..hi]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_neighbouring_sentences() {
        let text = "Intro text here. The system shall log users out! Sessions expire? Footer.";
        let start = text.find("The system").unwrap();
        assert_eq!(
            requirement_context(text, start, start + 16),
            "Intro text here. The system shall log users out! Sessions expire"
        );
    }

    #[test]
    fn context_is_a_slice_of_the_source() {
        let text = "Users must sign in first! The system shall lock accounts after five failures...? Admins can unlock them.";
        let start = text.find("The system").unwrap();
        let context = requirement_context(text, start, start + 16);
        assert!(text.contains(&context), "{context:?}");
        assert_eq!(
            context,
            "Users must sign in first! The system shall lock accounts after five failures...? Admins can unlock them"
        );
    }

    #[test]
    fn first_sentence_has_no_predecessor() {
        let text = "The system shall allow user login with valid credentials.";
        assert_eq!(
            requirement_context(text, 0, 16),
            "The system shall allow user login with valid credentials"
        );
    }

    #[test]
    fn split_sentences_drops_empty_pieces() {
        assert_eq!(split_sentences("One... Two!? Three"), vec!["One", "Two", "Three"]);
        assert!(split_sentences("...").is_empty());
    }

    #[test]
    fn window_is_char_boundary_safe() {
        let text = "ééééé marker ééééé";
        let start = text.find("marker").unwrap();
        assert_eq!(window(text, start, start + 6, 2), "é marker é");
    }

    #[test]
    fn punctuation_only_text_uses_window_fallback() {
        let text = "?!.";
        assert_eq!(requirement_context(text, 1, 2), "?!.");
    }
}
