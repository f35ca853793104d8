//! Extractive summarization on top of the LSI engine.
//!
//! The text is split into chunks (sentences or paragraphs), the chunks are
//! indexed into a throwaway engine, and the chunks with the highest semantic
//! density are stitched back together in rank order.

use crate::error::Error;
use crate::lsi::{LsiConfig, LsiEngine};

const SEPARATOR: &str = " [...] ";

/// Split on sentence-ending punctuation. Chunks are trimmed; empty chunks
/// are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split on blank lines. Line endings are normalized first so DOS and
/// old-Mac text splits the same way.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// The `count` most representative sentences of `text`, joined with
/// `" [...] "` in descending order of semantic density.
pub fn summary(text: &str, count: usize) -> Result<String, Error> {
    rank_chunks(split_sentences(text), count)
}

/// As [`summary`], but over paragraphs instead of sentences.
pub fn paragraph_summary(text: &str, count: usize) -> Result<String, Error> {
    rank_chunks(split_paragraphs(text), count)
}

fn rank_chunks(chunks: Vec<String>, count: usize) -> Result<String, Error> {
    let mut engine = LsiEngine::with_config(LsiConfig {
        auto_rebuild: false,
        ..LsiConfig::default()
    });
    for chunk in &chunks {
        // one-word chunks carry no relational signal, and repeated chunks
        // would crowd the summary with themselves
        if chunk.split_whitespace().nth(1).is_none() {
            continue;
        }
        if engine.item_id(chunk).is_none() {
            engine.append(chunk)?;
        }
    }
    engine.build_index()?;
    Ok(engine.highest_relative_content(count)?.join(SEPARATOR))
}
