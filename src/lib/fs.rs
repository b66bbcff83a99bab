//! Small file helpers for the picker's own state files.

use std::{fs, io, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::lib::errors::StateFileError;

/// Read a JSON state file.
///
/// A missing file is not an error and yields `Ok(None)`.
pub fn read_state_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StateFileError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StateFileError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| StateFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a JSON state file, creating parent directories as needed.
pub fn write_state_file<T: Serialize>(path: &Path, value: &T) -> Result<(), StateFileError> {
    let write_error = |source: io::Error| StateFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let serialized = serde_json::to_string_pretty(value)
        .map_err(|err| write_error(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    fs::write(path, format!("{serialized}\n")).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_state_file_reads_as_none() {
        let temp = tempdir().expect("can create temp directory");
        let value: Option<Value> =
            read_state_file(&temp.path().join("absent.json")).expect("missing file is fine");
        assert!(value.is_none());
    }

    #[test]
    fn write_creates_parent_directories() {
        let temp = tempdir().expect("can create temp directory");
        let path = temp.path().join("nested/dir/selection.json");

        write_state_file(&path, &json!({ "profile": "dev" })).expect("write should succeed");
        let value: Option<Value> = read_state_file(&path).expect("read should succeed");

        assert_eq!(value, Some(json!({ "profile": "dev" })));
    }

    #[test]
    fn corrupt_state_file_is_a_parse_error() {
        let temp = tempdir().expect("can create temp directory");
        let path = temp.path().join("selection.json");
        fs::write(&path, "{not json").expect("can write fixture");

        let error = read_state_file::<Value>(&path).expect_err("should fail to parse");
        assert!(matches!(error, StateFileError::Parse { .. }));
    }
}
