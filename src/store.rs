use std::path::Path;

use crate::error::{Error, Result};
use crate::review::Review;

/// Write `reviews` to `path` as a 2-space indented JSON array, replacing any
/// existing file.
pub fn save_reviews(reviews: &[Review], path: &Path) -> Result<()> {
    let mut content = serde_json::to_string_pretty(reviews).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        message: format!("failed to encode reviews: {e}"),
    })?;
    content.push('\n');

    std::fs::write(path, content).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read a file previously written by [`save_reviews`].
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        message: format!("failed to read reviews: {e}"),
    })?;
    serde_json::from_str(&content).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        message: format!("failed to parse reviews: {e}"),
    })
}
