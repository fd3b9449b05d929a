use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::nutrition::{ProfileInput, UserProfile};
use crate::storage;

/// CSV-backed user profiles, one row per user id.
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn profiles(&self) -> Result<Vec<UserProfile>> {
        storage::read_rows(&self.path)
    }

    pub fn get(&self, user_id: &str) -> Result<UserProfile> {
        self.profiles()?
            .into_iter()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| Error::UnknownUser(user_id.to_string()))
    }

    pub fn register(&self, input: ProfileInput) -> Result<UserProfile> {
        let profile = UserProfile::new(input)?;
        if self.profiles()?.iter().any(|p| p.user_id == profile.user_id) {
            return Err(Error::DuplicateUser(profile.user_id));
        }
        storage::append_row(&self.path, &profile)?;
        info!(user = %profile.user_id, tdee = profile.tdee, "registered user");
        Ok(profile)
    }
}
