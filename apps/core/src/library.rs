use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::model::Item;

const BUILTIN_LIBRARY: &str = include_str!("../assets/builtin_library.json5");
const LIBRARY_EXTENSIONS: [&str; 2] = ["json", "json5"];

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library path does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read library {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse library {}: {source}", .path.display())]
    Parse { path: PathBuf, source: json5::Error },
    #[error("failed to walk library directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("duplicate item id '{0}'")]
    DuplicateId(String),
    #[error("invalid item: {0}")]
    InvalidItem(String),
}

pub fn builtin_library() -> Result<Vec<Item>, LibraryError> {
    let items = parse_library(BUILTIN_LIBRARY, Path::new("<builtin>"))?;
    validate_library(&items)?;
    Ok(items)
}

/// Loads a library file, or every `.json`/`.json5` file below a directory in
/// file-name order.
pub fn load_library(path: &Path) -> Result<Vec<Item>, LibraryError> {
    let items = if path.is_file() {
        read_library_file(path)?
    } else if path.is_dir() {
        let mut items = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && is_library_file(entry.path()) {
                items.extend(read_library_file(entry.path())?);
            }
        }
        items
    } else {
        return Err(LibraryError::Missing(path.to_path_buf()));
    };

    validate_library(&items)?;
    log::info!("library loaded path={} items={}", path.display(), items.len());
    Ok(items)
}

pub fn parse_library(raw: &str, source: &Path) -> Result<Vec<Item>, LibraryError> {
    json5::from_str::<Vec<Item>>(raw).map_err(|source_error| LibraryError::Parse {
        path: source.to_path_buf(),
        source: source_error,
    })
}

pub fn validate_library(items: &[Item]) -> Result<(), LibraryError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.id.trim().is_empty() {
            return Err(LibraryError::InvalidItem("item id is empty".into()));
        }
        if item.glyph.is_empty() {
            return Err(LibraryError::InvalidItem(format!(
                "item '{}' has an empty glyph",
                item.id
            )));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(LibraryError::DuplicateId(item.id.clone()));
        }
    }
    Ok(())
}

fn read_library_file(path: &Path) -> Result<Vec<Item>, LibraryError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LibraryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_library(&raw, path)
}

fn is_library_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            LIBRARY_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
