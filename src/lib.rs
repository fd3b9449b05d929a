pub mod cache;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod metrics;
pub mod nutrition;
pub mod params;
pub mod recipe_db;
pub mod session;
pub mod storage;
pub mod tfidf;
pub mod types;
pub mod users;

pub use cache::{Fingerprint, IndexCache};
pub use dashboard::{Dashboard, NutrientProgress};
pub use error::{Error, Result};
pub use filter::{filter_recipes, parse_include_terms, MacroBounds, Range};
pub use ledger::{Ledger, LedgerRow};
pub use metrics::cosine_similarity;
pub use nutrition::{Gender, Intensity, ProfileInput, UserProfile, WeightGoal};
pub use params::Params;
pub use recipe_db::RecipeDB;
pub use session::Session;
pub use storage::{load_catalog, IndexSnapshot};
pub use tfidf::{FeatureIndex, FeatureVector};
pub use types::{Macros, Nutrient, Recipe, RecipeId, SimilarityResult};
pub use users::UserStore;
