use thiserror::Error;

use crate::types::RecipeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("recipe catalog unavailable: {0}")]
    DataUnavailable(String),

    #[error("unknown recipe id {0}")]
    UnknownRecipeId(RecipeId),

    #[error("unknown user {0}")]
    UnknownUser(String),

    #[error("duplicate user id {0}")]
    DuplicateUser(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("stale index snapshot: {0}")]
    StaleSnapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}
