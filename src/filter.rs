use serde::{Deserialize, Serialize};

use crate::types::{Macros, Nutrient, Recipe};

/// Closed interval `[lo, hi]`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct MacroBounds {
    pub calories: Range,
    pub proteins: Range,
    pub fats: Range,
    pub carbs: Range,
}

impl Default for MacroBounds {
    fn default() -> Self {
        Self {
            calories: Range::unbounded(),
            proteins: Range::unbounded(),
            fats: Range::unbounded(),
            carbs: Range::unbounded(),
        }
    }
}

impl MacroBounds {
    /// Bounds spanning every value observed in `catalog`.
    pub fn full_range(catalog: &[Recipe]) -> Self {
        let mut bounds = Self::default();
        for nutrient in Nutrient::ALL {
            let values = catalog.iter().map(|r| r.macros().get(nutrient));
            let lo = values.clone().fold(f64::INFINITY, f64::min);
            let hi = values.fold(f64::NEG_INFINITY, f64::max);
            if lo <= hi {
                bounds = bounds.with(nutrient, Range::new(lo, hi));
            }
        }
        bounds
    }

    pub fn with(mut self, nutrient: Nutrient, range: Range) -> Self {
        match nutrient {
            Nutrient::Calories => self.calories = range,
            Nutrient::Proteins => self.proteins = range,
            Nutrient::Fats => self.fats = range,
            Nutrient::Carbs => self.carbs = range,
        }
        self
    }

    pub fn get(&self, nutrient: Nutrient) -> Range {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Proteins => self.proteins,
            Nutrient::Fats => self.fats,
            Nutrient::Carbs => self.carbs,
        }
    }

    pub fn admits(&self, macros: &Macros) -> bool {
        Nutrient::ALL
            .iter()
            .all(|&n| self.get(n).contains(macros.get(n)))
    }
}

/// Splits a comma-separated ingredient list into lowercase terms, dropping
/// blanks.
pub fn parse_include_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// True when `terms` is empty or any term occurs in `ingredients`, ignoring
/// case.
pub fn matches_terms<S: AsRef<str>>(ingredients: &str, terms: &[S]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let haystack = ingredients.to_lowercase();
    terms
        .iter()
        .any(|t| haystack.contains(&t.as_ref().to_lowercase()))
}

pub fn filter_recipes<'a, S: AsRef<str>>(
    catalog: &'a [Recipe],
    bounds: &MacroBounds,
    include_terms: &[S],
) -> Vec<&'a Recipe> {
    catalog
        .iter()
        .filter(|r| bounds.admits(&r.macros()) && matches_terms(&r.ingredients, include_terms))
        .collect()
}
