
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A bounded-length segment of one complaint narrative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeChunk {
    /// The chunk text
    pub content: String,
    /// 0-based position of this chunk within its parent narrative
    pub chunk_index: usize,
}

/// Configuration for narrative segmentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters of trailing context shared with the following chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Boundary preference order: paragraph, line, sentence, word.
/// A hard character cut is the last resort below all of these.
const SEPARATOR_LEVELS: &[&[&str]] = &[&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// Split one narrative into an ordered sequence of overlapping chunks.
///
/// The narrative is first partitioned into boundary-preserving pieces, each at
/// most `chunk_size` characters, then pieces are greedily merged into chunks.
/// Up to `chunk_overlap` characters are carried from the tail of each chunk
/// into the next, as whole pieces. Concatenating the pieces reconstructs the
/// input exactly, so the chunks minus their carried-over prefixes do too.
///
/// Empty or whitespace-only input yields no chunks. The function is pure and
/// deterministic.
#[inline]
pub fn split_narrative(text: &str, config: &ChunkingConfig) -> Vec<NarrativeChunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    split_recursive(text, config.chunk_size, 0, &mut pieces);

    let chunks = merge_pieces(&pieces, config);

    debug!(
        "Segmented narrative of {} chars into {} chunks",
        text.chars().count(),
        chunks.len()
    );

    chunks
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| NarrativeChunk {
            content,
            chunk_index,
        })
        .collect()
}

/// Recursively partition `text` into pieces of at most `limit` characters,
/// preferring the coarsest boundary level that fits.
fn split_recursive(text: &str, limit: usize, level: usize, out: &mut Vec<String>) {
    if text.is_empty() {
        return;
    }

    if text.chars().count() <= limit {
        out.push(text.to_string());
        return;
    }

    if level >= SEPARATOR_LEVELS.len() {
        hard_cut(text, limit, out);
        return;
    }

    let parts = split_after_any(text, SEPARATOR_LEVELS[level]);
    if parts.len() == 1 {
        // No boundary at this level, try a finer one
        split_recursive(text, limit, level + 1, out);
        return;
    }

    for part in &parts {
        if part.chars().count() <= limit {
            out.push(part.clone());
        } else {
            split_recursive(part, limit, level + 1, out);
        }
    }
}

/// Partition `text` at every occurrence of any separator, keeping each
/// separator attached to the piece it terminates. Concatenating the returned
/// pieces reproduces `text` exactly.
fn split_after_any(text: &str, separators: &[&str]) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text;

    loop {
        let mut earliest: Option<(usize, usize)> = None;
        for sep in separators {
            if let Some(pos) = rest.find(sep) {
                if earliest.is_none_or(|(best, _)| pos < best) {
                    earliest = Some((pos, sep.len()));
                }
            }
        }

        match earliest {
            Some((pos, sep_len)) => {
                let cut = pos + sep_len;
                parts.push(rest[..cut].to_string());
                rest = &rest[cut..];
                if rest.is_empty() {
                    break;
                }
            }
            None => {
                parts.push(rest.to_string());
                break;
            }
        }
    }

    parts
}

/// Cut `text` every `limit` characters, respecting UTF-8 boundaries.
/// Only reached when a single unit has no splittable boundary at all.
fn hard_cut(text: &str, limit: usize, out: &mut Vec<String>) {
    let mut start = 0;
    let mut count = 0;

    for (byte_idx, _) in text.char_indices() {
        if count == limit {
            out.push(text[start..byte_idx].to_string());
            start = byte_idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        out.push(text[start..].to_string());
    }
}

/// Greedily merge pieces into chunks of at most `chunk_size` characters,
/// carrying up to `chunk_overlap` trailing characters (as whole pieces) into
/// the next chunk.
fn merge_pieces(pieces: &[String], config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut window_chars = 0;

    for piece in pieces {
        let piece_chars = piece.chars().count();

        if window_chars + piece_chars > config.chunk_size && !window.is_empty() {
            chunks.push(join_window(&window));

            // Drop leading pieces until what remains fits the overlap budget
            // and leaves room for the incoming piece
            while window_chars > config.chunk_overlap
                || (window_chars + piece_chars > config.chunk_size && window_chars > 0)
            {
                if let Some((_, dropped)) = window.pop_front() {
                    window_chars -= dropped;
                } else {
                    break;
                }
            }
        }

        window.push_back((piece.as_str(), piece_chars));
        window_chars += piece_chars;
    }

    if !window.is_empty() {
        chunks.push(join_window(&window));
    }

    chunks
}

fn join_window(window: &VecDeque<(&str, usize)>) -> String {
    window.iter().map(|(piece, _)| *piece).collect()
}
