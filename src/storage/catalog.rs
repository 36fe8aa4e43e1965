use super::database::{ProgressMap, ProgressStore};
use crate::reading::{AggregateStats, Aliyah, Parsha, global_stats};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Parsha not found: {0}")]
    ParshaNotFound(String),
    #[error("Aliyah {number} not found in {title}")]
    AliyahNotFound { title: String, number: u32 },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Torah readings merged with reading progress.
///
/// The readings are loaded once and never change while running; progress is
/// read fresh on every call so every response reflects the latest updates.
#[derive(Debug)]
pub struct Catalog {
    readings: Vec<Parsha>,
    store: ProgressStore,
}

impl Catalog {
    pub fn new(readings: Vec<Parsha>, store: ProgressStore) -> Self {
        Self { readings, store }
    }

    /// Loads readings from a JSON file. A missing file means no data has been
    /// initialized yet and yields an empty catalog.
    pub fn open(data_file: &Path, store: ProgressStore) -> Result<Self> {
        let readings = load_readings(data_file)?;
        tracing::info!(
            parshiot = readings.len(),
            data_file = %data_file.display(),
            "Loaded Torah readings"
        );
        Ok(Self::new(readings, store))
    }

    pub fn is_initialized(&self) -> bool {
        !self.readings.is_empty()
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn parshiot(&self) -> Result<Vec<Parsha>> {
        let progress = self.store.load_progress()?;
        Ok(merge_progress(&self.readings, &progress))
    }

    pub fn parsha(&self, title: &str) -> Result<Parsha, CatalogError> {
        self.parshiot()?
            .into_iter()
            .find(|p| p.title == title)
            .ok_or_else(|| CatalogError::ParshaNotFound(title.to_string()))
    }

    /// Persists one aliyah's completion flag and returns the merged result.
    pub fn set_aliyah(
        &self,
        title: &str,
        number: u32,
        is_complete: bool,
    ) -> Result<Aliyah, CatalogError> {
        let parsha = self
            .readings
            .iter()
            .find(|p| p.title == title)
            .ok_or_else(|| CatalogError::ParshaNotFound(title.to_string()))?;

        if parsha.aliyah(number).is_none() {
            return Err(CatalogError::AliyahNotFound {
                title: title.to_string(),
                number,
            });
        }

        self.store.set_complete(title, number, is_complete)?;
        tracing::debug!(title, number, is_complete, "Aliyah progress saved");

        self.parsha(title)?
            .aliyot
            .into_iter()
            .find(|a| a.number == number)
            .ok_or_else(|| CatalogError::AliyahNotFound {
                title: title.to_string(),
                number,
            })
    }

    pub fn stats(&self) -> Result<AggregateStats> {
        Ok(global_stats(&self.parshiot()?))
    }
}

pub fn load_readings(data_file: &Path) -> Result<Vec<Parsha>> {
    if !data_file.exists() {
        tracing::warn!(data_file = %data_file.display(), "Readings file not found, starting empty");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(data_file)
        .with_context(|| format!("Failed to read {data_file:?}"))?;
    let readings: Vec<Parsha> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse readings in {data_file:?}"))?;
    Ok(readings)
}

/// Overlays progress onto readings. Aliyot without a progress row are incomplete.
pub fn merge_progress(readings: &[Parsha], progress: &ProgressMap) -> Vec<Parsha> {
    readings
        .iter()
        .map(|parsha| {
            let mut merged = parsha.clone();
            for aliyah in &mut merged.aliyot {
                match progress.get(&(parsha.title.clone(), aliyah.number)) {
                    Some(entry) => {
                        aliyah.is_complete = entry.is_complete;
                        aliyah.date_completed = entry.date_completed;
                    }
                    None => {
                        aliyah.is_complete = false;
                        aliyah.date_completed = None;
                    }
                }
            }
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Book;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_readings() -> Vec<Parsha> {
        vec![
            Parsha {
                title: "Parashat Bereshit".to_string(),
                name: "בראשית".to_string(),
                book: Book::Genesis,
                torah_portion: "Genesis 1:1-6:8".to_string(),
                aliyot: vec![
                    Aliyah::new(1, "Genesis 1:1-2:3", 469, 34),
                    Aliyah::new(2, "Genesis 2:4-2:19", 233, 16),
                ],
            },
            Parsha {
                title: "Parashat Shemot".to_string(),
                name: "שמות".to_string(),
                book: Book::Exodus,
                torah_portion: "Exodus 1:1-6:1".to_string(),
                aliyot: vec![Aliyah::new(1, "Exodus 1:1-1:17", 300, 17)],
            },
        ]
    }

    fn setup_catalog() -> (TempDir, Catalog) {
        let temp_dir = TempDir::new().unwrap();
        let store = ProgressStore::open(temp_dir.path().join("progress.db")).unwrap();
        (temp_dir, Catalog::new(sample_readings(), store))
    }

    #[test]
    fn test_fresh_catalog_is_all_incomplete() {
        let (_dir, catalog) = setup_catalog();
        let parshiot = catalog.parshiot().unwrap();
        assert_eq!(parshiot.len(), 2);
        assert!(parshiot.iter().flat_map(|p| &p.aliyot).all(|a| !a.is_complete));
    }

    #[test]
    fn test_set_aliyah_returns_merged_aliyah() {
        let (_dir, catalog) = setup_catalog();
        let aliyah = catalog.set_aliyah("Parashat Bereshit", 2, true).unwrap();
        assert_eq!(aliyah.number, 2);
        assert!(aliyah.is_complete);
        assert!(aliyah.date_completed.is_some());

        let stats = catalog.stats().unwrap();
        assert_eq!(stats.completed.words, 233);
        assert_eq!(stats.completed.aliyot, 1);
        assert_eq!(stats.total.aliyot, 3);
    }

    #[test]
    fn test_set_aliyah_rejects_unknown_targets() {
        let (_dir, catalog) = setup_catalog();
        assert!(matches!(
            catalog.set_aliyah("Parashat Nowhere", 1, true),
            Err(CatalogError::ParshaNotFound(_))
        ));
        assert!(matches!(
            catalog.set_aliyah("Parashat Shemot", 9, true),
            Err(CatalogError::AliyahNotFound { number: 9, .. })
        ));
        assert!(catalog.store().load_progress().unwrap().is_empty());
    }

    #[test]
    fn test_parsha_lookup() {
        let (_dir, catalog) = setup_catalog();
        assert_eq!(catalog.parsha("Parashat Shemot").unwrap().book, Book::Exodus);
        assert!(matches!(
            catalog.parsha("Parashat Nowhere"),
            Err(CatalogError::ParshaNotFound(_))
        ));
    }

    #[test]
    fn test_missing_data_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let readings = load_readings(&temp_dir.path().join("missing.json")).unwrap();
        assert!(readings.is_empty());
    }

    #[test]
    fn test_open_reads_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_file = temp_dir.path().join("readings.json");
        fs::write(&data_file, serde_json::to_string(&sample_readings()).unwrap()).unwrap();

        let store = ProgressStore::open(temp_dir.path().join("progress.db")).unwrap();
        let catalog = Catalog::open(&data_file, store).unwrap();
        assert!(catalog.is_initialized());
        assert_eq!(catalog.parshiot().unwrap(), sample_readings());
    }
}
