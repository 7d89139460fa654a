use anyhow::{ensure, Result};
use regex::Regex;

/// Splits text into ~`max_chars` slices on sentence boundaries, falling back
/// to word boundaries when a single sentence is too long. A chunk may exceed
/// `max_chars` only when it is a single unsplittable word. Lengths are counted
/// in characters.
///
/// Sentence boundaries are a deliberate approximation: a break fires after a
/// `.`, `!`, or `?` followed by whitespace and an ASCII uppercase letter, so
/// abbreviations followed by lowercase text never split. Chunking must stay
/// reproducible, so keep the heuristic as-is.
pub fn chunk(text: &str, max_chars: usize) -> Result<Vec<String>> {
    ensure!(max_chars > 0, "max_chars must be positive");

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    if char_count(text) <= max_chars {
        return Ok(vec![text.trim().to_string()]);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text)? {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = char_count(sentence);

        // +1 for the joining space.
        if current_len + sentence_len + 1 > max_chars {
            if !current.is_empty() {
                chunks.push(current.trim().to_string());
                current.clear();
                current_len = 0;
            }

            if sentence_len > max_chars {
                // The last word-chunk stays open so it can still absorb
                // following sentences if room remains.
                let mut word_chunks = split_by_words(sentence, max_chars);
                if let Some(last) = word_chunks.pop() {
                    chunks.extend(word_chunks);
                    current_len = char_count(&last);
                    current = last;
                }
            } else {
                current = sentence.to_string();
                current_len = sentence_len;
            }
        } else if current.is_empty() {
            current = sentence.to_string();
            current_len = sentence_len;
        } else {
            current.push(' ');
            current.push_str(sentence);
            current_len += sentence_len + 1;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    Ok(chunks)
}

/// Segments text into sentence-like units. A boundary is a sentence
/// terminator, a whitespace run (consumed), then an uppercase letter that
/// starts the next unit.
fn split_sentences(text: &str) -> Result<Vec<&str>> {
    let boundary = Regex::new(r"[.!?]\s+[A-Z]")?;

    let mut units = Vec::new();
    let mut start = 0usize;
    for m in boundary.find_iter(text) {
        // Split right after the terminator; the matched uppercase letter
        // belongs to the next unit. Both are single-byte, so the offsets stay
        // on char boundaries.
        let end = m.start() + 1;
        units.push(&text[start..end]);
        start = m.end() - 1;
    }
    units.push(&text[start..]);
    Ok(units)
}

/// Greedy word-level packing for a sentence that alone exceeds `max_chars`.
/// A single word longer than the limit becomes its own oversized chunk.
fn split_by_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = char_count(word);

        if current_len + word_len + 1 > max_chars {
            if !current.is_empty() {
                chunks.push(current);
                current = word.to_string();
                current_len = word_len;
            } else {
                chunks.push(word.to_string());
            }
        } else if current.is_empty() {
            current = word.to_string();
            current_len = word_len;
        } else {
            current.push(' ');
            current.push_str(word);
            current_len += word_len + 1;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}
