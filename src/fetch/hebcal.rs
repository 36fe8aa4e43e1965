//! Aliyah structure from the Hebcal calendar API.

use super::verses::parse_verse_range;
use super::{COMBINED_PARSHIOT, PARSHIOT};
use crate::reading::{Aliyah, Book, Parsha};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

pub const HEBCAL_URL: &str = "https://www.hebcal.com/hebcal";

#[derive(Debug, Default, Deserialize)]
pub struct Calendar {
    #[serde(default)]
    pub items: Vec<CalendarItem>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarItem {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hebrew: Option<String>,
    /// Aliyah number ("1".."7", "M") to verse range, plus "torah" and others.
    /// Some values are nested objects, hence `Value`.
    #[serde(default)]
    pub leyning: Option<HashMap<String, serde_json::Value>>,
}

/// Extracts the individual parshiot of one calendar year.
///
/// Combined readings, titles outside the 54 and parshiot already in `found`
/// are skipped. Only aliyot 1-7 are taken (no maftir); a parsha whose ranges
/// all fail to parse is dropped.
pub fn collect_parshiot(calendar: &Calendar, found: &mut HashMap<String, Parsha>) {
    for item in &calendar.items {
        if item.category.as_deref() != Some("parashat") {
            continue;
        }
        let (Some(title), Some(leyning)) = (item.title.as_deref(), item.leyning.as_ref()) else {
            continue;
        };
        if COMBINED_PARSHIOT.contains(&title)
            || !PARSHIOT.contains(&title)
            || found.contains_key(title)
        {
            continue;
        }

        let mut aliyot = Vec::new();
        let mut book = None;
        for number in 1..=7u32 {
            let Some(verses) = leyning.get(&number.to_string()).and_then(|v| v.as_str()) else {
                continue;
            };
            match parse_verse_range(verses) {
                Ok(range) => {
                    book.get_or_insert_with(|| Book::from_name(&range.book));
                    aliyot.push(Aliyah::new(number, verses, 0, 0));
                }
                Err(e) => tracing::warn!(title, error = %e, "Skipping aliyah"),
            }
        }

        let Some(book) = book else {
            continue;
        };

        found.insert(
            title.to_string(),
            Parsha {
                title: title.to_string(),
                name: item.hebrew.clone().unwrap_or_else(|| title.to_string()),
                book,
                torah_portion: leyning
                    .get("torah")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                aliyot,
            },
        );
    }
}

pub async fn fetch_calendar(client: &Client, base_url: &str, year: i32) -> Result<Calendar> {
    let year = year.to_string();
    let response = client
        .get(base_url)
        .query(&[("v", "1"), ("cfg", "json"), ("s", "on"), ("year", year.as_str())])
        .send()
        .await
        .with_context(|| format!("Failed to fetch Hebcal calendar for {year}"))?
        .error_for_status()
        .with_context(|| format!("Hebcal rejected the request for {year}"))?;

    response
        .json()
        .await
        .with_context(|| format!("Failed to decode Hebcal calendar for {year}"))
}

/// Collects parshiot over several years, since a single year never contains
/// all of them separately.
pub async fn fetch_parshiot(
    client: &Client,
    base_url: &str,
    years: impl IntoIterator<Item = i32>,
) -> Result<HashMap<String, Parsha>> {
    let mut found = HashMap::new();
    for year in years {
        let calendar = fetch_calendar(client, base_url, year).await?;
        collect_parshiot(&calendar, &mut found);
        tracing::debug!(year, found = found.len(), "Fetched Hebcal year");
        if found.len() + 1 >= PARSHIOT.len() {
            // Only V'Zot HaBerachah is left, and the calendar never has it.
            break;
        }
    }
    Ok(found)
}
