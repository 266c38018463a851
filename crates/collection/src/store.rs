use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::collection::IssueCollection;
use crate::errors::{CollectionError, Result};

/// Loads the cached collection. A missing file means "nothing cached yet"
/// and yields an empty collection; a file that exists but cannot be read
/// back is fatal.
pub fn load(path: &Path) -> Result<IssueCollection> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no cached collection, starting empty");
            return Ok(IssueCollection::new());
        }
        Err(err) => return Err(corrupt(path, err)),
    };

    let doc: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| corrupt(path, err))?;
    let collection = IssueCollection::from_json(doc).map_err(|err| corrupt(path, err))?;
    info!(
        path = %path.display(),
        issues = collection.issues.len(),
        users = collection.users.len(),
        "loaded cached collection"
    );
    Ok(collection)
}

/// Serializes the whole collection and replaces the cache file atomically.
pub fn save(path: &Path, collection: &IssueCollection) -> Result<()> {
    let doc = collection.as_json()?;
    let bytes = serde_json::to_vec(&doc)?;
    common::fs::write_atomic(path, &bytes)?;
    info!(
        path = %path.display(),
        issues = collection.issues.len(),
        users = collection.users.len(),
        bytes = bytes.len(),
        "saved collection"
    );
    Ok(())
}

fn corrupt(path: &Path, reason: impl ToString) -> CollectionError {
    CollectionError::CorruptCache {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
