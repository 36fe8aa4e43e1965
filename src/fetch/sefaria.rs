//! Word and verse counts from the Sefaria texts API.

use super::verses::VerseRange;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const SEFARIA_URL: &str = "https://www.sefaria.org/api/texts";

/// Pause between requests to stay polite to the public API.
const REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Sefaria clamps an out-of-range end verse to the chapter's last verse.
const END_OF_CHAPTER: u32 = 999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCounts {
    pub words: u64,
    pub verses: u64,
}

impl std::ops::AddAssign for TextCounts {
    fn add_assign(&mut self, other: Self) {
        self.words += other.words;
        self.verses += other.verses;
    }
}

#[derive(Debug, Default, Deserialize)]
struct TextResponse {
    /// Hebrew text: a list of verses, or a bare string for a single verse.
    #[serde(default)]
    he: serde_json::Value,
}

/// Counts whitespace-separated words, ignoring editorial markers like `{פ}`.
pub fn count_hebrew_words(text: &str) -> u64 {
    let mut stripped = String::with_capacity(text.len());
    let mut in_marker = false;
    for c in text.chars() {
        match c {
            '{' => in_marker = true,
            '}' if in_marker => in_marker = false,
            _ if in_marker => {}
            _ => stripped.push(c),
        }
    }
    stripped.split_whitespace().count() as u64
}

/// Tallies a Sefaria `he` payload.
pub fn count_text(he: &serde_json::Value) -> TextCounts {
    match he {
        serde_json::Value::Array(verses) => TextCounts {
            words: verses
                .iter()
                .filter_map(|v| v.as_str())
                .map(count_hebrew_words)
                .sum(),
            verses: verses.len() as u64,
        },
        serde_json::Value::String(verse) => TextCounts {
            words: count_hebrew_words(verse),
            verses: 1,
        },
        _ => TextCounts::default(),
    }
}

fn text_ref(book: &str, chapter: u32, start_verse: u32, end_verse: u32) -> String {
    if start_verse == end_verse {
        format!("{book}.{chapter}.{start_verse}")
    } else {
        format!("{book}.{chapter}.{start_verse}-{end_verse}")
    }
}

pub struct SefariaClient {
    client: Client,
    base_url: String,
}

impl SefariaClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_span(
        &self,
        book: &str,
        chapter: u32,
        start_verse: u32,
        end_verse: u32,
    ) -> Result<TextCounts> {
        let reference = text_ref(book, chapter, start_verse, end_verse);
        let url = format!("{}/{reference}", self.base_url);
        let body: TextResponse = self
            .client
            .get(&url)
            .query(&[("context", "0")])
            .send()
            .await
            .with_context(|| format!("Failed to fetch {reference}"))?
            .error_for_status()
            .with_context(|| format!("Sefaria rejected {reference}"))?
            .json()
            .await
            .with_context(|| format!("Failed to decode {reference}"))?;
        Ok(count_text(&body.he))
    }

    /// Counts an aliyah one chapter at a time.
    ///
    /// A range inside one chapter counts as zero if its request fails. For a
    /// range spanning chapters, a failed chapter is skipped and the rest still
    /// count.
    pub async fn count_aliyah(&self, range: &VerseRange) -> TextCounts {
        let spans = range.chapter_spans();
        let single_chapter = spans.len() == 1;
        let mut total = TextCounts::default();

        for (chapter, start, end) in spans {
            let end = end.unwrap_or(END_OF_CHAPTER);
            match self.fetch_span(&range.book, chapter, start, end).await {
                Ok(counts) => total += counts,
                Err(e) => {
                    tracing::warn!(range = %range, chapter, error = %format!("{e:#}"), "Count failed");
                    if single_chapter {
                        return TextCounts::default();
                    }
                }
            }
            tokio::time::sleep(REQUEST_DELAY).await;
        }

        total
    }
}
