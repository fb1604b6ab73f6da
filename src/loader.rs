//! Document Loader
//!
//! Failures are values: callers turn a `DocumentError` into one issue naming
//! the file and carry on with the document treated as absent.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::documents::{AssetRecord, Yaml};
use crate::tree::SpecTree;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File not found")]
    Missing { path: String },

    #[error("Read error: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Parse error: document is empty")]
    Empty { path: String },
}

impl DocumentError {
    pub fn path(&self) -> &str {
        match self {
            DocumentError::Missing { path }
            | DocumentError::Io { path, .. }
            | DocumentError::Parse { path, .. }
            | DocumentError::Empty { path } => path,
        }
    }
}

fn read(tree: &dyn SpecTree, rel_path: &str) -> Result<String, DocumentError> {
    if !tree.exists(rel_path) {
        return Err(DocumentError::Missing { path: rel_path.to_string() });
    }
    tree.read_to_string(rel_path).map_err(|source| DocumentError::Io {
        path: rel_path.to_string(),
        source,
    })
}

/// Load and decode one single-document YAML file.
pub fn load_document<T: DeserializeOwned>(
    tree: &dyn SpecTree,
    rel_path: &str,
) -> Result<T, DocumentError> {
    let text = read(tree, rel_path)?;
    let parse_err = |source| DocumentError::Parse {
        path: rel_path.to_string(),
        source,
    };

    let value: Yaml = serde_yaml::from_str(&text).map_err(parse_err)?;
    if value.is_null() {
        return Err(DocumentError::Empty { path: rel_path.to_string() });
    }
    serde_yaml::from_value(value).map_err(parse_err)
}

/// One entry of the asset catalog, decoded in isolation from its siblings.
#[derive(Debug)]
pub struct AssetEntry {
    /// Position in the flattened stream, nulls included.
    pub index: usize,
    pub record: Result<AssetRecord, serde_yaml::Error>,
}

/// Load the asset catalog.
///
/// Accepts a single YAML sequence, a multi-document stream of records, or a
/// stream of sequences; all flatten to the same entry list. Null documents
/// and null entries are skipped.
pub fn load_asset_entries(
    tree: &dyn SpecTree,
    rel_path: &str,
) -> Result<Vec<AssetEntry>, DocumentError> {
    let text = read(tree, rel_path)?;

    let mut flattened: Vec<Yaml> = vec![];
    for document in serde_yaml::Deserializer::from_str(&text) {
        let value = Yaml::deserialize(document).map_err(|source| DocumentError::Parse {
            path: rel_path.to_string(),
            source,
        })?;
        match value {
            Yaml::Sequence(items) => flattened.extend(items),
            other => flattened.push(other),
        }
    }

    Ok(flattened
        .into_iter()
        .enumerate()
        .filter(|(_, value)| !value.is_null())
        .map(|(index, value)| AssetEntry {
            index,
            record: serde_yaml::from_value(value),
        })
        .collect())
}
