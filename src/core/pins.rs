//! Pinned trigger bookkeeping.
//!
//! Pins are an ordered set of trigger ids. Order only matters for display.

use serde::{Deserialize, Serialize};

use crate::gcloud::Trigger;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pins(Vec<String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinStats {
    pub total: usize,
    pub pinned: usize,
    pub unpinned: usize,
}

impl Pins {
    pub fn is_pinned(&self, trigger_id: &str) -> bool {
        self.0.iter().any(|id| id == trigger_id)
    }

    /// Returns false when the trigger was already pinned.
    pub fn pin(&mut self, trigger_id: &str) -> bool {
        if self.is_pinned(trigger_id) {
            return false;
        }
        self.0.push(trigger_id.to_string());
        true
    }

    /// Returns false when the trigger was not pinned.
    pub fn unpin(&mut self, trigger_id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != trigger_id);
        self.0.len() != before
    }

    /// Flip the pin and return the new state.
    pub fn toggle(&mut self, trigger_id: &str) -> bool {
        if self.unpin(trigger_id) {
            false
        } else {
            self.pin(trigger_id)
        }
    }

    /// Remove every pin, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.0.len();
        self.0.clear();
        count
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split triggers into (pinned, unpinned), keeping listing order.
    pub fn partition<'a>(&self, triggers: &'a [Trigger]) -> (Vec<&'a Trigger>, Vec<&'a Trigger>) {
        triggers.iter().partition(|t| self.is_pinned(&t.id))
    }

    pub fn stats(&self, triggers: &[Trigger]) -> PinStats {
        let pinned = triggers.iter().filter(|t| self.is_pinned(&t.id)).count();
        PinStats {
            total: triggers.len(),
            pinned,
            unpinned: triggers.len() - pinned,
        }
    }
}
