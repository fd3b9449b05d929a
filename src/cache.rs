use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::params::Params;
use crate::recipe_db::RecipeDB;
use crate::storage::IndexSnapshot;
use crate::types::Recipe;

/// SHA-256 over the catalog contents and the index params.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(catalog: &[Recipe], params: &Params) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((params.min_token_len as u64).to_le_bytes());
        hasher.update((catalog.len() as u64).to_le_bytes());
        for r in catalog {
            hasher.update(r.id.to_le_bytes());
            for s in [&r.label, &r.ingredients, &r.ingredient_lines, &r.url] {
                hasher.update((s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
            for v in [
                r.proteins_per_serving,
                r.calories_per_serving,
                r.fats_per_serving,
                r.carbs_per_serving,
            ] {
                hasher.update(v.to_bits().to_le_bytes());
            }
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Holds the most recently built [`RecipeDB`] and rebuilds it only when the
/// catalog fingerprint changes.
pub struct IndexCache {
    params: Params,
    current: Option<RecipeDB>,
    builds: usize,
}

impl IndexCache {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            current: None,
            builds: 0,
        }
    }

    pub fn get_or_build(&mut self, catalog: &[Recipe]) -> Result<&RecipeDB> {
        let fingerprint = Fingerprint::of(catalog, &self.params);
        if self.is_fresh(&fingerprint) {
            debug!(%fingerprint, "index cache hit");
        } else {
            info!(%fingerprint, recipes = catalog.len(), "building feature index");
            let db = RecipeDB::build_with_params(catalog.to_vec(), self.params)?;
            self.builds += 1;
            self.current = Some(db);
        }
        self.current()
    }

    /// Like [`get_or_build`](Self::get_or_build), but tries the on-disk
    /// snapshot before building and writes a new snapshot after a build.
    pub fn get_or_load<P: AsRef<Path>>(
        &mut self,
        catalog: &[Recipe],
        snapshot: P,
    ) -> Result<&RecipeDB> {
        let fingerprint = Fingerprint::of(catalog, &self.params);
        if self.is_fresh(&fingerprint) {
            debug!(%fingerprint, "index cache hit");
            return self.current();
        }
        let path = snapshot.as_ref();
        if path.exists() {
            match IndexSnapshot::load(path)
                .and_then(|s| RecipeDB::from_snapshot(catalog.to_vec(), self.params, s))
            {
                Ok(db) => {
                    info!(%fingerprint, path = %path.display(), "loaded index snapshot");
                    self.current = Some(db);
                    return self.current();
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring index snapshot"),
            }
        }
        self.get_or_build(catalog)?;
        if let Some(db) = &self.current {
            db.snapshot().save(path)?;
        }
        self.current()
    }

    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Number of index builds performed by this cache.
    pub fn builds(&self) -> usize {
        self.builds
    }

    fn is_fresh(&self, fingerprint: &Fingerprint) -> bool {
        self.current
            .as_ref()
            .map_or(false, |db| db.fingerprint() == fingerprint)
    }

    fn current(&self) -> Result<&RecipeDB> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::DataUnavailable("index not built".into()))
    }
}
