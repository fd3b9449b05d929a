use serde::{Deserialize, Serialize};
use std::fmt;

pub type RecipeId = u64;

/// One row of the recipe catalog.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub label: String,
    pub ingredients: String,
    pub ingredient_lines: String,
    pub proteins_per_serving: f64,
    pub calories_per_serving: f64,
    pub fats_per_serving: f64,
    pub carbs_per_serving: f64,
    pub url: String,
}

impl Recipe {
    pub fn macros(&self) -> Macros {
        Macros {
            calories: self.calories_per_serving,
            proteins: self.proteins_per_serving,
            fats: self.fats_per_serving,
            carbs: self.carbs_per_serving,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Proteins,
    Fats,
    Carbs,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Proteins,
        Nutrient::Fats,
        Nutrient::Carbs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Proteins => "proteins",
            Nutrient::Fats => "fats",
            Nutrient::Carbs => "carbs",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-serving (or accumulated) amounts of the four tracked nutrients.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Macros {
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl Macros {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Proteins => self.proteins,
            Nutrient::Fats => self.fats,
            Nutrient::Carbs => self.carbs,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SimilarityResult {
    pub id: RecipeId,
    pub score: f64,
    pub label: String,
}
