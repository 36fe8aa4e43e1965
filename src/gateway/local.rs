use super::{Gateway, TransportError};
use crate::reading::{AggregateStats, Aliyah, Parsha};
use crate::storage::{Catalog, CatalogError};
use async_trait::async_trait;
use std::sync::Arc;

/// In-process gateway reading straight from the catalog, for offline use.
#[derive(Clone, Debug)]
pub struct LocalGateway {
    catalog: Arc<Catalog>,
}

impl LocalGateway {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

impl From<CatalogError> for TransportError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ParshaNotFound(_) | CatalogError::AliyahNotFound { .. } => {
                TransportError::NotFound(err.to_string())
            }
            CatalogError::Storage(e) => TransportError::Storage(format!("{e:#}")),
        }
    }
}

fn storage_error(e: anyhow::Error) -> TransportError {
    TransportError::Storage(format!("{e:#}"))
}

#[async_trait]
impl Gateway for LocalGateway {
    async fn fetch_parshiot(&self) -> Result<Vec<Parsha>, TransportError> {
        self.catalog.parshiot().map_err(storage_error)
    }

    async fn fetch_parsha(&self, title: &str) -> Result<Parsha, TransportError> {
        Ok(self.catalog.parsha(title)?)
    }

    async fn update_aliyah(
        &self,
        title: &str,
        number: u32,
        is_complete: bool,
    ) -> Result<Aliyah, TransportError> {
        Ok(self.catalog.set_aliyah(title, number, is_complete)?)
    }

    async fn fetch_stats(&self) -> Result<AggregateStats, TransportError> {
        self.catalog.stats().map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Book;
    use crate::storage::ProgressStore;
    use tempfile::TempDir;

    fn setup_gateway() -> (TempDir, LocalGateway) {
        let temp_dir = TempDir::new().unwrap();
        let store = ProgressStore::open(temp_dir.path().join("progress.db")).unwrap();
        let readings = vec![Parsha {
            title: "Parashat Vayikra".to_string(),
            name: "ויקרא".to_string(),
            book: Book::Leviticus,
            torah_portion: "Leviticus 1:1-5:26".to_string(),
            aliyot: vec![
                Aliyah::new(1, "Leviticus 1:1-1:13", 250, 13),
                Aliyah::new(2, "Leviticus 1:14-2:6", 160, 10),
            ],
        }];
        (temp_dir, LocalGateway::new(Arc::new(Catalog::new(readings, store))))
    }

    #[tokio::test]
    async fn test_update_then_fetch_reflects_change() {
        let (_dir, gateway) = setup_gateway();
        let aliyah = gateway.update_aliyah("Parashat Vayikra", 1, true).await.unwrap();
        assert!(aliyah.is_complete);

        let parsha = gateway.fetch_parsha("Parashat Vayikra").await.unwrap();
        assert!(parsha.aliyot[0].is_complete);
        assert!(!parsha.aliyot[1].is_complete);

        let stats = gateway.fetch_stats().await.unwrap();
        assert_eq!(stats.completed.verses, 13);
        assert_eq!(stats.percentage.aliyot, 50);
    }

    #[tokio::test]
    async fn test_unknown_targets_are_not_found() {
        let (_dir, gateway) = setup_gateway();
        assert!(matches!(
            gateway.fetch_parsha("Parashat Tzav").await,
            Err(TransportError::NotFound(_))
        ));
        assert!(matches!(
            gateway.update_aliyah("Parashat Vayikra", 8, true).await,
            Err(TransportError::NotFound(_))
        ));
    }
}
