use crate::model::{non_blank, PantryItem};
use crate::storage::Persistence;
use log::{debug, info};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const PANTRY_KEY: &str = "inventory";

const DEFAULT_QUANTITY: &str = "1";

/// Ingredients the user has at home
pub struct Pantry {
    persistence: Arc<Persistence>,
}

impl Pantry {
    pub fn new(persistence: Arc<Persistence>) -> Self {
        Self { persistence }
    }

    pub fn items(&self) -> Vec<PantryItem> {
        self.persistence.read(PANTRY_KEY, Vec::new())
    }

    /// Append an item. A blank name adds nothing and returns `None`.
    pub fn add(&self, name: &str, quantity: &str, unit: &str) -> Option<PantryItem> {
        let Some(name) = non_blank(Some(name)) else {
            debug!("Ignoring pantry item without a name");
            return None;
        };

        let mut items = self.items();
        let item = PantryItem {
            id: next_id(&items),
            name: name.to_string(),
            quantity: non_blank(Some(quantity)).unwrap_or(DEFAULT_QUANTITY).to_string(),
            unit: unit.trim().to_string(),
        };
        items.push(item.clone());

        self.persistence.write(PANTRY_KEY, &items);
        info!("Added '{}' to the pantry", item.name);
        Some(item)
    }

    /// Returns whether an item was removed
    pub fn remove(&self, id: &str) -> bool {
        let mut items = self.items();
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return false;
        }

        self.persistence.write(PANTRY_KEY, &items);
        true
    }

    /// Rename an item and change its quantity; the unit is kept. A blank
    /// name or unknown id changes nothing.
    pub fn edit(&self, id: &str, name: &str, quantity: &str) -> Option<PantryItem> {
        let Some(name) = non_blank(Some(name)) else {
            return None;
        };

        let mut items = self.items();
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            debug!("No pantry item with id {}", id);
            return None;
        };
        item.name = name.to_string();
        item.quantity = non_blank(Some(quantity)).unwrap_or(DEFAULT_QUANTITY).to_string();
        let edited = item.clone();

        self.persistence.write(PANTRY_KEY, &items);
        Some(edited)
    }

    /// Items whose name contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Vec<PantryItem> {
        let term = term.trim().to_lowercase();
        self.items()
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&term))
            .collect()
    }

    /// "<quantity> <name>" for every item, comma separated
    pub fn ingredient_summary(&self) -> String {
        self.items()
            .iter()
            .map(|item| format!("{} {}", item.quantity, item.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// Millisecond timestamp, bumped past any id already in use
fn next_id(items: &[PantryItem]) -> String {
    let mut candidate = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    while items.iter().any(|item| item.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
