use crate::error::{Error, Result};
use crate::ledger::{Ledger, LedgerRow};
use crate::recipe_db::RecipeDB;
use crate::types::{Recipe, RecipeId, SimilarityResult};

/// Per-user request context: who is acting and which recipe they picked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    selected: Option<RecipeId>,
}

fn find(catalog: &[Recipe], id: RecipeId) -> Result<&Recipe> {
    catalog
        .iter()
        .find(|r| r.id == id)
        .ok_or(Error::UnknownRecipeId(id))
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            selected: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn selected(&self) -> Option<RecipeId> {
        self.selected
    }

    /// Selects a recipe from the raw catalog; no feature index is needed.
    pub fn select<'a>(&mut self, catalog: &'a [Recipe], id: RecipeId) -> Result<&'a Recipe> {
        let recipe = find(catalog, id)?;
        self.selected = Some(id);
        Ok(recipe)
    }

    /// Recommendations for the selected recipe; empty when nothing is
    /// selected.
    pub fn recommendations(&self, db: &RecipeDB, k: usize) -> Result<Vec<SimilarityResult>> {
        match self.selected {
            Some(id) => db.top_similar(id, k),
            None => Ok(Vec::new()),
        }
    }

    /// Records one serving of the selected recipe in the ledger.
    pub fn consume_selected(&self, catalog: &[Recipe], ledger: &Ledger) -> Result<Option<LedgerRow>> {
        let Some(id) = self.selected else {
            return Ok(None);
        };
        let recipe = find(catalog, id)?;
        ledger.consume(&self.user_id, &recipe.macros()).map(Some)
    }
}
