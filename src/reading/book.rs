use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One of the five books of the Torah.
///
/// The derived ordering is the reading order; `Unknown` sorts last and is
/// never part of the canonical display sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Book {
    Genesis,
    Exodus,
    Leviticus,
    Numbers,
    Deuteronomy,
    #[default]
    Unknown,
}

impl Book {
    /// The known books in reading order.
    pub const CANONICAL: [Book; 5] = [
        Book::Genesis,
        Book::Exodus,
        Book::Leviticus,
        Book::Numbers,
        Book::Deuteronomy,
    ];

    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Genesis" => Book::Genesis,
            "Exodus" => Book::Exodus,
            "Leviticus" => Book::Leviticus,
            "Numbers" => Book::Numbers,
            "Deuteronomy" => Book::Deuteronomy,
            _ => Book::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Book::Genesis => "Genesis",
            Book::Exodus => "Exodus",
            Book::Leviticus => "Leviticus",
            Book::Numbers => "Numbers",
            Book::Deuteronomy => "Deuteronomy",
            Book::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Book::Unknown
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Book {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything other than a known book name (null, numbers, typos) groups under Unknown.
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Book::from_name).unwrap_or(Book::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_order_follows_reading_order() {
        let mut books = vec![
            Book::Unknown,
            Book::Deuteronomy,
            Book::Genesis,
            Book::Numbers,
            Book::Exodus,
            Book::Leviticus,
        ];
        books.sort();
        assert_eq!(
            books,
            vec![
                Book::Genesis,
                Book::Exodus,
                Book::Leviticus,
                Book::Numbers,
                Book::Deuteronomy,
                Book::Unknown,
            ]
        );
    }

    #[test]
    fn test_unrecognized_names_become_unknown() {
        assert_eq!(Book::from_name("Genesis"), Book::Genesis);
        assert_eq!(Book::from_name(" Exodus "), Book::Exodus);
        assert_eq!(Book::from_name("genesis"), Book::Unknown);
        assert_eq!(Book::from_name(""), Book::Unknown);
    }

    #[test]
    fn test_deserialize_tolerates_null_and_garbage() {
        let book: Book = serde_json::from_str("\"Numbers\"").unwrap();
        assert_eq!(book, Book::Numbers);

        let book: Book = serde_json::from_str("null").unwrap();
        assert_eq!(book, Book::Unknown);

        let book: Book = serde_json::from_str("7").unwrap();
        assert_eq!(book, Book::Unknown);
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Book::Leviticus).unwrap(), "\"Leviticus\"");
    }
}
