use crate::model::RecipeId;
use crate::storage::Persistence;
use log::info;
use std::sync::Arc;

pub const FAVORITES_KEY: &str = "favoriteRecipes";

/// The user's favorite recipe ids, in the order they were added
pub struct FavoriteSet {
    persistence: Arc<Persistence>,
}

impl FavoriteSet {
    pub fn new(persistence: Arc<Persistence>) -> Self {
        Self { persistence }
    }

    pub fn ids(&self) -> Vec<RecipeId> {
        self.persistence.read(FAVORITES_KEY, Vec::new())
    }

    pub fn contains(&self, id: &RecipeId) -> bool {
        self.ids().contains(id)
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now a
    /// favorite.
    pub fn toggle(&self, id: &RecipeId) -> bool {
        let mut ids = self.ids();
        let now_favorite = match ids.iter().position(|existing| existing == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id.clone());
                true
            }
        };

        self.persistence.write(FAVORITES_KEY, &ids);
        info!(
            "Recipe {} {} favorites",
            id,
            if now_favorite { "added to" } else { "removed from" }
        );
        now_favorite
    }

    /// Returns whether `id` was a favorite
    pub fn remove(&self, id: &RecipeId) -> bool {
        let mut ids = self.ids();
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() == before {
            return false;
        }

        self.persistence.write(FAVORITES_KEY, &ids);
        true
    }
}
