//! Builds the readings file: aliyah structure from Hebcal, word and verse
//! counts from Sefaria, and V'Zot HaBerachah added by hand.

pub mod hebcal;
pub mod sefaria;
pub mod verses;

use crate::reading::{Aliyah, Book, Parsha};
use anyhow::{Context, Result};
use reqwest::Client;
use sefaria::SefariaClient;
use std::collections::HashMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

pub use hebcal::HEBCAL_URL;
pub use sefaria::SEFARIA_URL;

/// Calendar years scanned by default; no single year reads every parsha separately.
pub const DEFAULT_YEARS: RangeInclusive<i32> = 2014..=2030;

/// The 54 parshiot in reading order.
pub const PARSHIOT: [&str; 54] = [
    // Genesis
    "Parashat Bereshit",
    "Parashat Noach",
    "Parashat Lech-Lecha",
    "Parashat Vayera",
    "Parashat Chayei Sara",
    "Parashat Toldot",
    "Parashat Vayetzei",
    "Parashat Vayishlach",
    "Parashat Vayeshev",
    "Parashat Miketz",
    "Parashat Vayigash",
    "Parashat Vayechi",
    // Exodus
    "Parashat Shemot",
    "Parashat Vaera",
    "Parashat Bo",
    "Parashat Beshalach",
    "Parashat Yitro",
    "Parashat Mishpatim",
    "Parashat Terumah",
    "Parashat Tetzaveh",
    "Parashat Ki Tisa",
    "Parashat Vayakhel",
    "Parashat Pekudei",
    // Leviticus
    "Parashat Vayikra",
    "Parashat Tzav",
    "Parashat Shmini",
    "Parashat Tazria",
    "Parashat Metzora",
    "Parashat Achrei Mot",
    "Parashat Kedoshim",
    "Parashat Emor",
    "Parashat Behar",
    "Parashat Bechukotai",
    // Numbers
    "Parashat Bamidbar",
    "Parashat Nasso",
    "Parashat Beha'alotcha",
    "Parashat Sh'lach",
    "Parashat Korach",
    "Parashat Chukat",
    "Parashat Balak",
    "Parashat Pinchas",
    "Parashat Matot",
    "Parashat Masei",
    // Deuteronomy
    "Parashat Devarim",
    "Parashat Vaetchanan",
    "Parashat Eikev",
    "Parashat Re'eh",
    "Parashat Shoftim",
    "Parashat Ki Teitzei",
    "Parashat Ki Tavo",
    "Parashat Nitzavim",
    "Parashat Vayeilech",
    "Parashat Ha'azinu",
    "Parashat V'Zot HaBerachah",
];

/// Double readings some years combine; only the separate readings are kept.
pub const COMBINED_PARSHIOT: [&str; 7] = [
    "Parashat Vayakhel-Pekudei",
    "Parashat Tazria-Metzora",
    "Parashat Achrei Mot-Kedoshim",
    "Parashat Behar-Bechukotai",
    "Parashat Chukat-Balak",
    "Parashat Matot-Masei",
    "Parashat Nitzavim-Vayeilech",
];

const VZOT_HABERACHAH: &str = "Parashat V'Zot HaBerachah";

/// Read on Simchat Torah rather than a Shabbat, so the calendar never lists it.
pub fn vzot_haberachah() -> Parsha {
    let aliyot = [
        "Deuteronomy 33:1-33:7",
        "Deuteronomy 33:8-33:12",
        "Deuteronomy 33:13-33:17",
        "Deuteronomy 33:18-33:21",
        "Deuteronomy 33:22-33:26",
        "Deuteronomy 33:27-33:29",
        "Deuteronomy 34:1-34:12",
    ];

    Parsha {
        title: VZOT_HABERACHAH.to_string(),
        name: "וזאת הברכה".to_string(),
        book: Book::Deuteronomy,
        torah_portion: "Deuteronomy 33:1-34:12".to_string(),
        aliyot: aliyot
            .iter()
            .zip(1..)
            .map(|(verses, number)| Aliyah::new(number, *verses, 0, 0))
            .collect(),
    }
}

/// Lays out the found parshiot in reading order. Missing titles are logged
/// and skipped; titles outside the 54 are dropped.
pub fn order_canonically(mut found: HashMap<String, Parsha>) -> Vec<Parsha> {
    PARSHIOT
        .iter()
        .filter_map(|title| {
            let parsha = found.remove(*title);
            if parsha.is_none() {
                tracing::warn!(title, "Parsha still missing");
            }
            parsha
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitSummary {
    pub parshiot: usize,
    pub aliyot: usize,
    /// Aliyot whose word count came back as zero.
    pub uncounted: usize,
}

impl InitSummary {
    pub fn of(parshiot: &[Parsha]) -> Self {
        let aliyot = parshiot.iter().flat_map(|p| &p.aliyot);
        Self {
            parshiot: parshiot.len(),
            aliyot: aliyot.clone().count(),
            uncounted: aliyot.filter(|a| a.word_count == 0).count(),
        }
    }
}

/// Fetches the aliyah structure over `years`, adds V'Zot HaBerachah, orders
/// the result and fills in every aliyah's word and verse counts.
///
/// Only a Hebcal failure is an error. A count that cannot be fetched is left
/// at zero.
pub async fn initialize(
    client: &Client,
    hebcal_url: &str,
    sefaria_url: &str,
    years: impl IntoIterator<Item = i32>,
) -> Result<Vec<Parsha>> {
    let mut found = hebcal::fetch_parshiot(client, hebcal_url, years).await?;
    tracing::info!(found = found.len(), "Fetched aliyah structure");

    found
        .entry(VZOT_HABERACHAH.to_string())
        .or_insert_with(vzot_haberachah);
    let mut parshiot = order_canonically(found);

    let sefaria = SefariaClient::new(client.clone(), sefaria_url);
    for parsha in &mut parshiot {
        for aliyah in &mut parsha.aliyot {
            let counts = match verses::parse_verse_range(&aliyah.verses) {
                Ok(range) => sefaria.count_aliyah(&range).await,
                Err(e) => {
                    tracing::warn!(title = %parsha.title, error = %e, "Cannot count aliyah");
                    continue;
                }
            };
            aliyah.word_count = counts.words;
            aliyah.verse_count = counts.verses;
        }
        tracing::debug!(title = %parsha.title, "Counted parsha");
    }

    Ok(parshiot)
}

/// Writes the readings file, creating its directory if needed.
pub fn write_readings(path: &Path, parshiot: &[Parsha]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(parshiot)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
