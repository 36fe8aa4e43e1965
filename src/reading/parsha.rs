use super::book::Book;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One weekly Torah portion and its aliyot.
///
/// `title` is the identity key. A parsha is never patched in place; every
/// refresh replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parsha {
    pub title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub book: Book,
    #[serde(default)]
    pub torah_portion: String,
    #[serde(default)]
    pub aliyot: Vec<Aliyah>,
}

/// A numbered subdivision of a parsha; the unit of completion tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aliyah {
    pub number: u32,
    #[serde(default)]
    pub verses: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub word_count: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub verse_count: u64,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_completed: Option<DateTime<Utc>>,
}

impl Parsha {
    /// Title without the "Parashat " prefix, as shown on overview cards.
    pub fn short_title(&self) -> &str {
        self.title
            .strip_prefix("Parashat ")
            .unwrap_or(&self.title)
    }

    pub fn aliyah(&self, number: u32) -> Option<&Aliyah> {
        self.aliyot.iter().find(|a| a.number == number)
    }

    /// Aliyot sorted by `number`, independent of storage order.
    pub fn aliyot_in_order(&self) -> Vec<&Aliyah> {
        let mut aliyot: Vec<&Aliyah> = self.aliyot.iter().collect();
        aliyot.sort_by_key(|a| a.number);
        aliyot
    }

    pub fn completed_aliyot(&self) -> usize {
        self.aliyot.iter().filter(|a| a.is_complete).count()
    }

    /// True when every aliyah is complete (vacuously true for an empty parsha).
    pub fn is_complete(&self) -> bool {
        self.aliyot.iter().all(|a| a.is_complete)
    }
}

impl Aliyah {
    pub fn new(number: u32, verses: impl Into<String>, word_count: u64, verse_count: u64) -> Self {
        Self {
            number,
            verses: verses.into(),
            word_count,
            verse_count,
            is_complete: false,
            date_completed: None,
        }
    }
}

/// Word and verse counts that are missing, null, negative or non-numeric count as zero.
fn count_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    })
}

/// Accepts RFC 3339 or a naive ISO-8601 timestamp (taken as UTC); anything else is `None`.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
