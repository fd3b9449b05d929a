//! Daily nutrient goals derived from a user's body measurements and goals.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::Macros;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum WeightGoal {
    #[serde(rename = "Lose Weight (High Priority)")]
    LoseWeightHighPriority,
    #[serde(rename = "Lose Weight")]
    LoseWeight,
    #[serde(rename = "Maintain Weight")]
    MaintainWeight,
    #[serde(rename = "Gain Weight")]
    GainWeight,
    #[serde(rename = "Gain Weight (Muscle)")]
    GainMuscle,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Intensity {
    Low,
    Medium,
    Moderate,
    High,
}

impl WeightGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightGoal::LoseWeightHighPriority => "Lose Weight (High Priority)",
            WeightGoal::LoseWeight => "Lose Weight",
            WeightGoal::MaintainWeight => "Maintain Weight",
            WeightGoal::GainWeight => "Gain Weight",
            WeightGoal::GainMuscle => "Gain Weight (Muscle)",
        }
    }
}

impl fmt::Display for WeightGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(Error::InvalidProfile(format!("unknown gender {other:?}"))),
        }
    }
}

impl FromStr for WeightGoal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        [
            WeightGoal::LoseWeightHighPriority,
            WeightGoal::LoseWeight,
            WeightGoal::MaintainWeight,
            WeightGoal::GainWeight,
            WeightGoal::GainMuscle,
        ]
        .into_iter()
        .find(|g| g.as_str().to_lowercase() == wanted)
        .ok_or_else(|| Error::InvalidProfile(format!("unknown weight goal {s:?}")))
    }
}

impl FromStr for Intensity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "moderate" => Ok(Intensity::Moderate),
            "high" => Ok(Intensity::High),
            other => Err(Error::InvalidProfile(format!("unknown intensity {other:?}"))),
        }
    }
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    if height_cm <= 0.0 || !height_cm.is_finite() {
        return Err(Error::InvalidProfile(format!("height must be positive, got {height_cm}")));
    }
    Ok(weight_kg / (height_cm / 100.0).powi(2))
}

/// Basal metabolic rate (revised Harris-Benedict).
pub fn bmr(gender: Gender, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let age = age as f64;
    match gender {
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
    }
}

/// Branches are checked in order; the first match wins. `Medium` has no
/// branch of its own and is decided by the day ranges alone.
pub fn activity_multiplier(workout_days: u8, intensity: Intensity) -> f64 {
    if intensity == Intensity::Low && workout_days == 0 {
        1.2
    } else if intensity == Intensity::Low || (1..=3).contains(&workout_days) {
        1.375
    } else if intensity == Intensity::Moderate || (3..=5).contains(&workout_days) {
        1.55
    } else if intensity == Intensity::High && workout_days == 7 {
        1.9
    } else {
        1.725
    }
}

pub fn tdee(bmr: f64, workout_days: u8, intensity: Intensity) -> f64 {
    bmr * activity_multiplier(workout_days, intensity)
}

/// Grams of protein, carbs and fat per day.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct MacroGoals {
    pub protein: f64,
    pub carb: f64,
    pub fat: f64,
}

pub fn macro_goals(weight_goal: WeightGoal, muscle_gain: bool, tdee: f64) -> MacroGoals {
    let (mut protein, mut carb, mut fat) = (0.25, 0.4, 0.35);
    if muscle_gain {
        protein += 0.15;
        carb -= 0.1;
        fat -= 0.05;
    }
    let (dp, dc, df) = match weight_goal {
        WeightGoal::LoseWeightHighPriority => (-0.05, -0.1, 0.15),
        WeightGoal::LoseWeight => (-0.05, -0.1, 0.05),
        WeightGoal::GainWeight => (0.05, 0.1, 0.1),
        WeightGoal::MaintainWeight | WeightGoal::GainMuscle => (0.0, 0.0, 0.0),
    };
    protein += dp;
    carb += dc;
    fat += df;
    MacroGoals {
        protein: protein * tdee / 4.0,
        carb: carb * tdee / 4.0,
        fat: fat * tdee / 9.0,
    }
}

/// What a user enters at registration.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileInput {
    pub user_id: String,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
    pub muscle_gain: bool,
    pub weight_goal: WeightGoal,
    pub workout_days_per_week: u8,
    pub workload_intensity: Intensity,
}

/// A registered user with derived goals; one row of the users file.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub user_id: String,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub bmi: f64,
    pub gender: Gender,
    #[serde(with = "yes_no")]
    pub muscle_gain_goal: bool,
    pub weight_goal: WeightGoal,
    pub workout_days_per_week: u8,
    pub workload_intensity: Intensity,
    pub bmr: f64,
    pub tdee: f64,
    pub protein: f64,
    pub carb: f64,
    pub fat: f64,
}

impl UserProfile {
    pub fn new(input: ProfileInput) -> Result<Self> {
        if input.user_id.trim().is_empty() {
            return Err(Error::InvalidProfile("user id must not be empty".into()));
        }
        if input.workout_days_per_week > 7 {
            return Err(Error::InvalidProfile(format!(
                "workout days must be 0..=7, got {}",
                input.workout_days_per_week
            )));
        }
        if input.weight <= 0.0 || !input.weight.is_finite() {
            return Err(Error::InvalidProfile(format!("weight must be positive, got {}", input.weight)));
        }
        let bmi = bmi(input.weight, input.height)?;
        let bmr = bmr(input.gender, input.weight, input.height, input.age);
        let tdee = tdee(bmr, input.workout_days_per_week, input.workload_intensity);
        let goals = macro_goals(input.weight_goal, input.muscle_gain, tdee);
        Ok(Self {
            name: input.name,
            user_id: input.user_id,
            age: input.age,
            weight: input.weight,
            height: input.height,
            bmi,
            gender: input.gender,
            muscle_gain_goal: input.muscle_gain,
            weight_goal: input.weight_goal,
            workout_days_per_week: input.workout_days_per_week,
            workload_intensity: input.workload_intensity,
            bmr,
            tdee,
            protein: goals.protein,
            carb: goals.carb,
            fat: goals.fat,
        })
    }

    /// Daily targets, with calories set to the TDEE.
    pub fn goals(&self) -> Macros {
        Macros {
            calories: self.tdee,
            proteins: self.protein,
            fats: self.fat,
            carbs: self.carb,
        }
    }
}

mod yes_no {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!("expected Yes or No, got {other:?}"))),
        }
    }
}
