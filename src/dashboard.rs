use serde::Serialize;
use std::fmt;

use crate::ledger::LedgerRow;
use crate::nutrition::UserProfile;
use crate::types::Nutrient;

const BAR_WIDTH: usize = 30;

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct NutrientProgress {
    pub nutrient: Nutrient,
    pub consumed: f64,
    pub goal: f64,
    pub left: f64,
    /// Share of the goal reached, capped at 100.
    pub percent: f64,
}

impl NutrientProgress {
    pub fn new(nutrient: Nutrient, consumed: f64, goal: f64) -> Self {
        let percent = if goal <= 0.0 {
            0.0
        } else if consumed < goal {
            consumed / goal * 100.0
        } else {
            100.0
        };
        Self {
            nutrient,
            consumed,
            goal,
            left: goal - consumed,
            percent,
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Dashboard {
    pub user_id: String,
    pub name: String,
    pub progress: Vec<NutrientProgress>,
}

impl Dashboard {
    pub fn new(profile: &UserProfile, row: &LedgerRow) -> Self {
        let goals = profile.goals();
        let consumed = row.consumed();
        Self {
            user_id: profile.user_id.clone(),
            name: profile.name.clone(),
            progress: Nutrient::ALL
                .iter()
                .map(|&n| NutrientProgress::new(n, consumed.get(n), goals.get(n)))
                .collect(),
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<&NutrientProgress> {
        self.progress.iter().find(|p| p.nutrient == nutrient)
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.name, self.user_id)?;
        for p in &self.progress {
            let filled = ((p.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
            writeln!(
                f,
                "{:<9} [{}{}] {:>5.1}%  {:.0} left of {:.0}",
                p.nutrient.name(),
                "#".repeat(filled.min(BAR_WIDTH)),
                " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
                p.percent,
                p.left,
                p.goal
            )?;
        }
        Ok(())
    }
}
