//! Text normalization shared by the bucket and the pipeline.

/// Characters users routinely leave out when typing names.
const SPECIAL_CHARACTERS: [char; 3] = ['\'', '"', ','];

/// Remove quote and comma characters.
pub fn strip_special_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !SPECIAL_CHARACTERS.contains(c))
        .collect()
}

/// Strip special characters and lowercase, the form token matching uses.
pub fn normalize_name(name: &str) -> String {
    strip_special_characters(name).to_lowercase()
}

/// Length as the request layer measures it.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
