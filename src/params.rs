use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Params {
    /// Number of recommendations returned for a selected recipe.
    pub top_k: usize,
    /// Shortest token (in characters) kept by the ingredient tokenizer.
    pub min_token_len: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_token_len: 2,
        }
    }
}
