use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::storage;
use crate::types::Macros;

/// Accumulated consumption for one user. The `_left` column names are kept
/// from the tracking file format; the values are amounts consumed so far.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct LedgerRow {
    pub user_id: String,
    pub calories_left: f64,
    pub proteins_left: f64,
    pub fats_left: f64,
    pub carbs_left: f64,
}

impl LedgerRow {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            calories_left: 0.0,
            proteins_left: 0.0,
            fats_left: 0.0,
            carbs_left: 0.0,
        }
    }

    pub fn consumed(&self) -> Macros {
        Macros {
            calories: self.calories_left,
            proteins: self.proteins_left,
            fats: self.fats_left,
            carbs: self.carbs_left,
        }
    }

    fn add(&mut self, m: &Macros) {
        self.calories_left += m.calories;
        self.proteins_left += m.proteins;
        self.fats_left += m.fats;
        self.carbs_left += m.carbs;
    }
}

pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn rows(&self) -> Result<Vec<LedgerRow>> {
        storage::read_rows(&self.path)
    }

    /// The user's row, or zeros when nothing has been consumed yet.
    pub fn get(&self, user_id: &str) -> Result<LedgerRow> {
        Ok(self
            .rows()?
            .into_iter()
            .find(|r| r.user_id == user_id)
            .unwrap_or_else(|| LedgerRow::empty(user_id)))
    }

    /// Adds `macros` to the user's row, creating it if needed, and rewrites
    /// the file.
    pub fn consume(&self, user_id: &str, macros: &Macros) -> Result<LedgerRow> {
        let mut rows = self.rows()?;
        let pos = match rows.iter().position(|r| r.user_id == user_id) {
            Some(pos) => pos,
            None => {
                rows.push(LedgerRow::empty(user_id));
                rows.len() - 1
            }
        };
        rows[pos].add(macros);
        storage::write_rows(&self.path, &rows)?;
        debug!(user = user_id, calories = rows[pos].calories_left, "updated ledger");
        Ok(rows[pos].clone())
    }
}
