//! Completion rollups over parshiot.
//!
//! Every function here is pure and total: empty input and zero totals yield
//! zero percentages, never a division error. Nothing is cached; callers
//! recompute from the freshly fetched collection whenever they need a value.

use super::book::Book;
use super::parsha::Parsha;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Word, verse and aliyah counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub words: u64,
    pub verses: u64,
    pub aliyot: u64,
}

/// Whole-number percentages, one per tally dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    pub words: u32,
    pub verses: u32,
    pub aliyot: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub completed: Tally,
    pub total: Tally,
    pub percentage: Percentages,
}

/// Per-parsha figures shown on overview cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParshaStats {
    pub completed_aliyot: u64,
    pub total_aliyot: u64,
    /// `completed_aliyot / total_aliyot`, in `[0, 1]`.
    pub completion_fraction: f64,
    /// Share of the book's words, percent with one decimal.
    pub word_share_of_book: f64,
    /// Share of the book's verses, percent with one decimal.
    pub verse_share_of_book: f64,
}

/// `round(100 * completed / total)`, or 0 when `total` is 0.
pub fn percent(completed: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round() as u32
}

/// `part / whole` as a percentage rounded to one decimal, or 0 when `whole` is 0.
pub fn share_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

impl AggregateStats {
    pub fn from_tallies(completed: Tally, total: Tally) -> Self {
        Self {
            completed,
            total,
            percentage: Percentages {
                words: percent(completed.words, total.words),
                verses: percent(completed.verses, total.verses),
                aliyot: percent(completed.aliyot, total.aliyot),
            },
        }
    }
}

/// Sums words, verses and aliyot across every aliyah, split by completion.
pub fn global_stats<'a, I>(parshiot: I) -> AggregateStats
where
    I: IntoIterator<Item = &'a Parsha>,
{
    let mut completed = Tally::default();
    let mut total = Tally::default();

    for aliyah in parshiot.into_iter().flat_map(|p| p.aliyot.iter()) {
        total.words += aliyah.word_count;
        total.verses += aliyah.verse_count;
        total.aliyot += 1;

        if aliyah.is_complete {
            completed.words += aliyah.word_count;
            completed.verses += aliyah.verse_count;
            completed.aliyot += 1;
        }
    }

    AggregateStats::from_tallies(completed, total)
}

/// The same rollup as [`global_stats`], restricted to one book's parshiot.
pub fn book_stats<'a, I>(parshiot_in_book: I) -> AggregateStats
where
    I: IntoIterator<Item = &'a Parsha>,
{
    global_stats(parshiot_in_book)
}

/// Per-parsha completion plus its share of the enclosing book's totals.
pub fn parsha_stats(parsha: &Parsha, book_total: &Tally) -> ParshaStats {
    let own = global_stats(std::iter::once(parsha));

    let completion_fraction = if own.total.aliyot == 0 {
        0.0
    } else {
        own.completed.aliyot as f64 / own.total.aliyot as f64
    };

    ParshaStats {
        completed_aliyot: own.completed.aliyot,
        total_aliyot: own.total.aliyot,
        completion_fraction,
        word_share_of_book: share_of(own.total.words, book_total.words),
        verse_share_of_book: share_of(own.total.verses, book_total.verses),
    }
}

/// Parshiot grouped by book, keyed in reading order.
#[derive(Debug, Clone, Default)]
pub struct BookGroups<'a> {
    groups: BTreeMap<Book, Vec<&'a Parsha>>,
}

impl<'a> BookGroups<'a> {
    pub fn get(&self, book: Book) -> Option<&[&'a Parsha]> {
        self.groups.get(&book).map(Vec::as_slice)
    }

    /// Every book present, including `Unknown`, in reading order.
    pub fn iter(&self) -> impl Iterator<Item = (Book, &[&'a Parsha])> {
        self.groups.iter().map(|(book, parshiot)| (*book, parshiot.as_slice()))
    }

    /// The display sequence: known books only, in reading order.
    pub fn canonical(&self) -> impl Iterator<Item = (Book, &[&'a Parsha])> {
        self.iter().filter(|(book, _)| book.is_known())
    }

    pub fn books(&self) -> Vec<Book> {
        self.groups.keys().copied().collect()
    }
}

/// Groups parshiot by book, preserving input order within each book.
pub fn group_by_book(parshiot: &[Parsha]) -> BookGroups<'_> {
    let mut groups: BTreeMap<Book, Vec<&Parsha>> = BTreeMap::new();
    for parsha in parshiot {
        groups.entry(parsha.book).or_default().push(parsha);
    }
    BookGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Aliyah;
    use pretty_assertions::assert_eq;

    fn aliyah(number: u32, words: u64, verses: u64, complete: bool) -> Aliyah {
        let mut a = Aliyah::new(number, format!("{number}:1-{number}:9"), words, verses);
        a.is_complete = complete;
        a
    }

    fn parsha(title: &str, book: Book, aliyot: Vec<Aliyah>) -> Parsha {
        Parsha {
            title: title.to_string(),
            name: String::new(),
            book,
            torah_portion: String::new(),
            aliyot,
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let stats = global_stats(&Vec::<Parsha>::new());
        assert_eq!(stats, AggregateStats::default());
    }

    #[test]
    fn test_zero_word_totals_give_zero_percent() {
        let parshiot = vec![parsha(
            "Genesis-0",
            Book::Genesis,
            vec![aliyah(1, 0, 0, true), aliyah(2, 0, 0, false)],
        )];
        let stats = global_stats(&parshiot);
        assert_eq!(stats.total.words, 0);
        assert_eq!(stats.percentage.words, 0);
        assert_eq!(stats.percentage.verses, 0);
        assert_eq!(stats.percentage.aliyot, 50);
    }

    #[test]
    fn test_genesis_scenario_rollup() {
        let unit = parsha(
            "Genesis-1",
            Book::Genesis,
            vec![
                aliyah(1, 100, 10, true),
                aliyah(2, 150, 12, true),
                aliyah(3, 200, 14, false),
            ],
        );

        let stats = global_stats(std::iter::once(&unit));
        assert_eq!(stats.completed.words, 250);
        assert_eq!(stats.total.words, 450);
        assert_eq!(stats.percentage.words, 56);

        let per_parsha = parsha_stats(&unit, &stats.total);
        assert_eq!(per_parsha.completed_aliyot, 2);
        assert_eq!(per_parsha.total_aliyot, 3);
        assert!((per_parsha.completion_fraction - 0.6667).abs() < 1e-4);
        assert_eq!(per_parsha.word_share_of_book, 100.0);
    }

    #[test]
    fn test_completion_fraction_is_one_only_when_all_complete() {
        let done = parsha("A", Book::Exodus, vec![aliyah(1, 5, 1, true), aliyah(2, 5, 1, true)]);
        let partial = parsha("B", Book::Exodus, vec![aliyah(1, 5, 1, true), aliyah(2, 5, 1, false)]);
        let empty = parsha("C", Book::Exodus, vec![]);
        let total = Tally::default();

        assert_eq!(parsha_stats(&done, &total).completion_fraction, 1.0);
        let partial_fraction = parsha_stats(&partial, &total).completion_fraction;
        assert!(partial_fraction < 1.0 && partial_fraction > 0.0);
        assert_eq!(parsha_stats(&empty, &total).completion_fraction, 0.0);
    }

    #[test]
    fn test_share_of_book_rounds_to_one_decimal() {
        let a = parsha("A", Book::Numbers, vec![aliyah(1, 1, 1, false)]);
        let b = parsha("B", Book::Numbers, vec![aliyah(1, 2, 5, false)]);
        let parshiot = vec![a, b];
        let book = book_stats(&parshiot);

        let first = parsha_stats(&parshiot[0], &book.total);
        assert_eq!(first.word_share_of_book, 33.3);
        assert_eq!(first.verse_share_of_book, 16.7);

        let zero_book = parsha_stats(&parshiot[0], &Tally::default());
        assert_eq!(zero_book.word_share_of_book, 0.0);
        assert_eq!(zero_book.verse_share_of_book, 0.0);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(7, 7), 100);
    }

    #[test]
    fn test_group_by_book_canonical_order_excludes_unknown() {
        let parshiot = vec![
            parsha("Deuteronomy-1", Book::Deuteronomy, vec![]),
            parsha("Mystery", Book::Unknown, vec![aliyah(1, 10, 1, true)]),
            parsha("Exodus-1", Book::Exodus, vec![]),
            parsha("Genesis-1", Book::Genesis, vec![]),
            parsha("Numbers-1", Book::Numbers, vec![]),
            parsha("Leviticus-1", Book::Leviticus, vec![]),
            parsha("Genesis-2", Book::Genesis, vec![]),
        ];

        let groups = group_by_book(&parshiot);
        let canonical: Vec<Book> = groups.canonical().map(|(book, _)| book).collect();
        assert_eq!(canonical, Book::CANONICAL.to_vec());

        // Unknown parshiot are still grouped, only the display sequence skips them.
        let unknown = groups.get(Book::Unknown).unwrap();
        assert_eq!(unknown.len(), 1);
        assert_eq!(book_stats(unknown.iter().copied()).completed.words, 10);

        let genesis: Vec<&str> = groups
            .get(Book::Genesis)
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(genesis, vec!["Genesis-1", "Genesis-2"]);
    }

    #[test]
    fn test_group_by_book_only_lists_present_books() {
        let parshiot = vec![parsha("Numbers-1", Book::Numbers, vec![])];
        let groups = group_by_book(&parshiot);
        assert_eq!(groups.books(), vec![Book::Numbers]);
        assert!(groups.get(Book::Genesis).is_none());
    }

    #[test]
    fn test_book_stats_matches_global_over_same_input() {
        let parshiot = vec![
            parsha("A", Book::Leviticus, vec![aliyah(1, 30, 3, true), aliyah(2, 70, 7, false)]),
            parsha("B", Book::Leviticus, vec![aliyah(1, 100, 10, true)]),
        ];
        assert_eq!(book_stats(&parshiot), global_stats(&parshiot));
        let stats = book_stats(&parshiot);
        assert_eq!(stats.completed, Tally { words: 130, verses: 13, aliyot: 2 });
        assert_eq!(stats.percentage, Percentages { words: 65, verses: 65, aliyot: 67 });
    }
}
