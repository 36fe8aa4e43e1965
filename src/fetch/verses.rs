use std::fmt;
use thiserror::Error;

/// A contiguous span of verses, e.g. `Genesis 1:1-2:3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRange {
    pub book: String,
    pub start_chapter: u32,
    pub start_verse: u32,
    pub end_chapter: u32,
    pub end_verse: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not parse verse range: {0}")]
pub struct VerseRangeError(pub String);

impl VerseRange {
    /// Chapters touched by the range, each with the verse span to request.
    /// `None` as the end verse means "to the end of the chapter".
    pub fn chapter_spans(&self) -> Vec<(u32, u32, Option<u32>)> {
        if self.start_chapter == self.end_chapter {
            return vec![(self.start_chapter, self.start_verse, Some(self.end_verse))];
        }

        let mut spans = vec![(self.start_chapter, self.start_verse, None)];
        for chapter in self.start_chapter + 1..self.end_chapter {
            spans.push((chapter, 1, None));
        }
        spans.push((self.end_chapter, 1, Some(self.end_verse)));
        spans
    }
}

impl fmt::Display for VerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{}-{}:{}",
            self.book, self.start_chapter, self.start_verse, self.end_chapter, self.end_verse
        )
    }
}

/// Parses `Book C:V-C:V`.
///
/// Anything after `|`, `;` or `,` is dropped, so combined or annotated
/// readings keep only their first span.
pub fn parse_verse_range(input: &str) -> Result<VerseRange, VerseRangeError> {
    let err = || VerseRangeError(input.to_string());

    let first = input
        .split(['|', ';', ','])
        .next()
        .map(str::trim)
        .unwrap_or_default();

    let (book, span) = first.rsplit_once(char::is_whitespace).ok_or_else(err)?;
    let book = book.trim();
    if book.is_empty() {
        return Err(err());
    }

    let (start, end) = span.split_once('-').ok_or_else(err)?;
    let (start_chapter, start_verse) = chapter_and_verse(start).ok_or_else(err)?;
    let (end_chapter, end_verse) = chapter_and_verse(end).ok_or_else(err)?;

    Ok(VerseRange {
        book: book.to_string(),
        start_chapter,
        start_verse,
        end_chapter,
        end_verse,
    })
}

fn chapter_and_verse(s: &str) -> Option<(u32, u32)> {
    let (chapter, verse) = s.split_once(':')?;
    let digits = |part: &str| {
        if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };
    Some((digits(chapter)?, digits(verse)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_range() {
        let range = parse_verse_range("Exodus 1:1-1:17").unwrap();
        assert_eq!(
            range,
            VerseRange {
                book: "Exodus".to_string(),
                start_chapter: 1,
                start_verse: 1,
                end_chapter: 1,
                end_verse: 17,
            }
        );
        assert_eq!(range.to_string(), "Exodus 1:1-1:17");
    }

    #[test]
    fn test_parse_drops_trailing_annotations() {
        let range = parse_verse_range("Numbers 28:9-28:15 | Shabbat Rosh Chodesh").unwrap();
        assert_eq!(range.end_verse, 15);

        let range = parse_verse_range("Deuteronomy 29:9-29:11; 30:1-30:6").unwrap();
        assert_eq!((range.start_chapter, range.end_chapter), (29, 29));

        let range = parse_verse_range("Leviticus 12:1-12:8, 13:1-13:5").unwrap();
        assert_eq!(range.end_verse, 8);
    }

    #[test]
    fn test_parse_multi_word_book() {
        let range = parse_verse_range("I Samuel 20:18-20:42").unwrap();
        assert_eq!(range.book, "I Samuel");
    }

    #[test]
    fn test_parse_rejects_malformed_ranges() {
        for input in ["", "Genesis", "Genesis 1:1", "Genesis 1-2", "Genesis a:1-1:2", "1:1-1:2"] {
            assert!(parse_verse_range(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_chapter_spans() {
        let single = parse_verse_range("Genesis 2:4-2:19").unwrap();
        assert_eq!(single.chapter_spans(), vec![(2, 4, Some(19))]);

        let multi = parse_verse_range("Genesis 1:1-4:3").unwrap();
        assert_eq!(
            multi.chapter_spans(),
            vec![(1, 1, None), (2, 1, None), (3, 1, None), (4, 1, Some(3))]
        );
    }
}
