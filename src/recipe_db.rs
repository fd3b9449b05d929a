use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::cache::Fingerprint;
use crate::error::{Error, Result};
use crate::metrics::cosine_similarity;
use crate::params::Params;
use crate::storage::IndexSnapshot;
use crate::tfidf::FeatureIndex;
use crate::types::{Recipe, RecipeId, SimilarityResult};

/// An immutable recipe catalog together with its TF-IDF feature index.
pub struct RecipeDB {
    entries: Vec<Recipe>,
    ids: HashMap<RecipeId, usize>,
    index: FeatureIndex,
    fingerprint: Fingerprint,
    params: Params,
}

impl RecipeDB {
    pub fn build(catalog: Vec<Recipe>) -> Result<Self> {
        Self::build_with_params(catalog, Params::default())
    }

    pub fn build_with_params(catalog: Vec<Recipe>, params: Params) -> Result<Self> {
        let ids = id_positions(&catalog)?;
        let fingerprint = Fingerprint::of(&catalog, &params);
        let corpus: Vec<&str> = catalog.iter().map(|r| r.ingredients.as_str()).collect();
        let index = FeatureIndex::build(&corpus, &params);
        debug!(
            recipes = catalog.len(),
            vocabulary = index.vocabulary().len(),
            "built feature index"
        );
        Ok(Self {
            entries: catalog,
            ids,
            index,
            fingerprint,
            params,
        })
    }

    /// Reuses a persisted index. Fails with `StaleSnapshot` when the snapshot
    /// was built from a different catalog or params, or does not hold one
    /// vector per recipe.
    pub fn from_snapshot(catalog: Vec<Recipe>, params: Params, snapshot: IndexSnapshot) -> Result<Self> {
        let fingerprint = Fingerprint::of(&catalog, &params);
        if snapshot.fingerprint != fingerprint {
            return Err(Error::StaleSnapshot(format!(
                "snapshot {} does not match catalog {}",
                snapshot.fingerprint, fingerprint
            )));
        }
        if snapshot.index.len() != catalog.len() {
            return Err(Error::StaleSnapshot(format!(
                "snapshot holds {} vectors for {} recipes",
                snapshot.index.len(),
                catalog.len()
            )));
        }
        let ids = id_positions(&catalog)?;
        Ok(Self {
            entries: catalog,
            ids,
            index: snapshot.index,
            fingerprint,
            params,
        })
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            fingerprint: self.fingerprint,
            index: self.index.clone(),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.entries
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.ids.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.ids.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn position(&self, id: RecipeId) -> Result<usize> {
        self.ids.get(&id).copied().ok_or(Error::UnknownRecipeId(id))
    }

    pub fn similarity(&self, a: RecipeId, b: RecipeId) -> Result<f64> {
        let va = &self.index.vectors()[self.position(a)?];
        let vb = &self.index.vectors()[self.position(b)?];
        Ok(cosine_similarity(va, vb))
    }

    /// The `k` recipes most similar to `id`, never including `id` itself.
    /// Ties keep catalog order.
    pub fn top_similar(&self, id: RecipeId, k: usize) -> Result<Vec<SimilarityResult>> {
        self.rank(id, k, |_| true)
    }

    /// Same as [`top_similar`](Self::top_similar) with candidates restricted
    /// to `allowed`.
    pub fn top_similar_within(
        &self,
        id: RecipeId,
        k: usize,
        allowed: &[RecipeId],
    ) -> Result<Vec<SimilarityResult>> {
        let allowed: HashSet<RecipeId> = allowed.iter().copied().collect();
        self.rank(id, k, |r| allowed.contains(&r.id))
    }

    pub fn top_similar_batch(&self, ids: &[RecipeId], k: usize) -> Result<Vec<Vec<SimilarityResult>>> {
        ids.par_iter().map(|&id| self.top_similar(id, k)).collect()
    }

    fn rank<F>(&self, id: RecipeId, k: usize, keep: F) -> Result<Vec<SimilarityResult>>
    where
        F: Fn(&Recipe) -> bool,
    {
        let query_pos = self.position(id)?;
        let query = &self.index.vectors()[query_pos];
        let mut scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|&(pos, r)| pos != query_pos && keep(r))
            .map(|(pos, _)| (pos, cosine_similarity(query, &self.index.vectors()[pos])))
            .collect();
        // stable: equal scores stay in catalog order
        scored.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(pos, score)| {
                let entry = &self.entries[pos];
                SimilarityResult {
                    id: entry.id,
                    score,
                    label: entry.label.clone(),
                }
            })
            .collect())
    }
}

fn id_positions(catalog: &[Recipe]) -> Result<HashMap<RecipeId, usize>> {
    let mut ids = HashMap::with_capacity(catalog.len());
    for (pos, r) in catalog.iter().enumerate() {
        if ids.insert(r.id, pos).is_some() {
            return Err(Error::DataUnavailable(format!("duplicate recipe id {}", r.id)));
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: RecipeId, ingredients: &str) -> Recipe {
        Recipe {
            id,
            label: format!("recipe {id}"),
            ingredients: ingredients.into(),
            ingredient_lines: ingredients.into(),
            proteins_per_serving: 10.0,
            calories_per_serving: 300.0,
            fats_per_serving: 5.0,
            carbs_per_serving: 40.0,
            url: String::new(),
        }
    }

    #[test]
    fn shared_terms_rank_first() -> anyhow::Result<()> {
        let db = RecipeDB::build(vec![
            recipe(1, "chicken rice broccoli"),
            recipe(2, "chicken rice peas"),
            recipe(3, "chocolate sugar flour"),
        ])?;
        let results = db.top_similar(1, 2)?;
        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[1].score, 0.0);
        Ok(())
    }

    #[test]
    fn ties_keep_catalog_order() -> anyhow::Result<()> {
        let db = RecipeDB::build(vec![
            recipe(10, "egg"),
            recipe(4, "flour"),
            recipe(8, "sugar"),
            recipe(2, ""),
        ])?;
        let ids: Vec<_> = db.top_similar(10, 5)?.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 8, 2]);
        Ok(())
    }

    #[test]
    fn unknown_id() -> anyhow::Result<()> {
        let db = RecipeDB::build(vec![recipe(1, "egg")])?;
        assert!(matches!(db.top_similar(9, 5), Err(Error::UnknownRecipeId(9))));
        Ok(())
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = RecipeDB::build(vec![recipe(1, "egg"), recipe(1, "ham")]);
        assert!(matches!(err, Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn within_restricts_candidates() -> anyhow::Result<()> {
        let db = RecipeDB::build(vec![
            recipe(1, "chicken rice"),
            recipe(2, "chicken rice peas"),
            recipe(3, "chicken noodles"),
        ])?;
        let ids: Vec<_> = db
            .top_similar_within(1, 5, &[1, 3])?
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3]);
        Ok(())
    }
}
