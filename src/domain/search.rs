//! Phrase lookup over a page's tokens.

use super::geometry::{any_edge_in_range, Rect};
use super::token::Token;

/// Finds the box of the token that best matches `phrase` inside `region`.
///
/// Candidates are tokens with at least one horizontal and one vertical
/// edge inside the region. The first candidate containing the whole phrase
/// (case-insensitive) wins; failing that, the first candidate containing
/// the phrase's first word. Extraction often splits a phrase across
/// tokens, hence the second tier.
pub fn find_text_coordinates(tokens: &[Token], phrase: &str, region: &Rect) -> Option<Rect> {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let candidates: Vec<(&Token, String)> = tokens
        .iter()
        .filter(|token| any_edge_in_range(region, &token.bbox))
        .map(|token| (token, token.text.trim().to_lowercase()))
        .collect();

    if let Some((token, _)) = candidates.iter().find(|(_, text)| text.contains(&needle)) {
        return Some(token.bbox);
    }

    let first_word = needle.split_whitespace().next()?;
    candidates
        .iter()
        .find(|(_, text)| text.contains(first_word))
        .map(|(token, _)| token.bbox)
}
