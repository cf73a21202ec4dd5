//! Reading time estimation

use super::Section;

/// Reading speed used when the site does not configure one
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Count words across sections
///
/// Headings are plain strings and are split as-is; bodies are rich text and
/// are flattened to plain text first.
pub fn count_words(sections: &[Section]) -> usize {
    sections
        .iter()
        .map(|section| {
            section.heading.split_whitespace().count()
                + section.body.as_text().split_whitespace().count()
        })
        .sum()
}

/// Minutes needed to read `total_words`, rounded up; zero words read in zero minutes
pub fn reading_time_minutes(total_words: usize, words_per_minute: usize) -> usize {
    total_words.div_ceil(words_per_minute.max(1))
}
