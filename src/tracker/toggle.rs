use super::selection::Selection;
use crate::gateway::{Gateway, TransportError};
use crate::reading::Parsha;
use std::sync::Arc;

/// The updates a "mark all" will issue, decided before any of them runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePlan {
    /// `false` when every aliyah is already complete, `true` otherwise.
    pub target: bool,
    /// Aliyah numbers in ascending order.
    pub numbers: Vec<u32>,
}

pub fn plan_toggle_all(parsha: &Parsha) -> TogglePlan {
    TogglePlan {
        target: !parsha.is_complete(),
        numbers: parsha.aliyot_in_order().iter().map(|a| a.number).collect(),
    }
}

/// Drives completion updates through a gateway and keeps the selection in
/// sync with what the gateway reports afterwards.
///
/// State is never changed optimistically: the collection only changes after
/// a successful reload.
pub struct Tracker {
    gateway: Arc<dyn Gateway>,
    selection: Selection,
}

impl Tracker {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            selection: Selection::new(),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Fetches the full collection and loads it into the selection.
    pub async fn refresh(&mut self) -> Result<(), TransportError> {
        let parshiot = self.gateway.fetch_parshiot().await?;
        tracing::debug!(parshiot = parshiot.len(), "Reloaded parshiot");
        self.selection.load(parshiot);
        Ok(())
    }

    /// Flips one aliyah, then reloads.
    pub async fn toggle_one(
        &mut self,
        title: &str,
        number: u32,
        current: bool,
    ) -> Result<(), TransportError> {
        tracing::info!(title, number, is_complete = !current, "Updating aliyah");
        self.gateway.update_aliyah(title, number, !current).await?;
        self.refresh().await
    }

    /// Marks every aliyah complete, or incomplete if all already are.
    ///
    /// Updates are issued one at a time in aliyah order. The first failure
    /// stops the batch and skips the reload; earlier updates stay applied.
    /// Returns the target state that was applied.
    pub async fn toggle_all(&mut self, parsha: &Parsha) -> Result<bool, TransportError> {
        let plan = plan_toggle_all(parsha);
        tracing::info!(
            title = %parsha.title,
            target = plan.target,
            aliyot = plan.numbers.len(),
            "Toggling all aliyot"
        );

        for (applied, number) in plan.numbers.iter().enumerate() {
            if let Err(e) = self
                .gateway
                .update_aliyah(&parsha.title, *number, plan.target)
                .await
            {
                tracing::warn!(
                    title = %parsha.title,
                    number,
                    applied,
                    error = %e,
                    "Bulk toggle stopped"
                );
                return Err(e);
            }
        }

        self.refresh().await?;
        Ok(plan.target)
    }

    /// [`Tracker::toggle_all`] on the current selection; `Ok(None)` when nothing is selected.
    pub async fn toggle_selected_all(&mut self) -> Result<Option<bool>, TransportError> {
        let Some(parsha) = self.selection.selected().cloned() else {
            return Ok(None);
        };
        self.toggle_all(&parsha).await.map(Some)
    }
}
