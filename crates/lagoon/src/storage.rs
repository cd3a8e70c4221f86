//! Persisted runtime state.
//!
//! An optional on-disk directory stores immutable constants and public
//! global variables, one binding per line as `name;;;json-value`. Constants
//! load into the root namespace as immutable names at startup and are
//! written back when a top-level `const const` declaration succeeds;
//! globals load as ordinary `var var` variables.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::value::PlainValue;

/// Separator between the name and the serialized value on each line.
const NAME_VALUE_SEP: &str = ";;;";

/// File holding `const const` bindings.
const CONSTANTS_FILE: &str = "constants.txt";

/// File holding public global variables.
const GLOBALS_FILE: &str = "globals.txt";

/// Handle on a runtime storage directory.
#[derive(Debug, Clone)]
pub struct RuntimeStore {
    dir: PathBuf,
}

impl RuntimeStore {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads the persisted constants, if the file exists.
    pub fn load_constants(&self) -> io::Result<Vec<(String, PlainValue)>> {
        load_file(&self.dir.join(CONSTANTS_FILE))
    }

    /// Loads the persisted globals, if the file exists.
    pub fn load_globals(&self) -> io::Result<Vec<(String, PlainValue)>> {
        load_file(&self.dir.join(GLOBALS_FILE))
    }

    /// Writes or replaces one constant, creating the directory on first use.
    pub fn save_constant(&self, name: &str, value: &PlainValue) -> io::Result<()> {
        debug_assert!(value.is_storable(), "opaque values must not reach the store");
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(CONSTANTS_FILE);
        let mut entries = load_file(&path)?;
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing_value)) => *existing_value = value.clone(),
            None => entries.push((name.to_owned(), value.clone())),
        }
        let mut contents = String::new();
        for (entry_name, entry_value) in &entries {
            let serialized = serde_json::to_string(entry_value)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            contents.push_str(entry_name);
            contents.push_str(NAME_VALUE_SEP);
            contents.push_str(&serialized);
            contents.push('\n');
        }
        fs::write(path, contents)
    }
}

fn load_file(path: &Path) -> io::Result<Vec<(String, PlainValue)>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut entries = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((name, serialized)) = line.split_once(NAME_VALUE_SEP) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed runtime store line: {line}"),
            ));
        };
        let value: PlainValue =
            serde_json::from_str(serialized).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        entries.push((name.to_owned(), value));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lagoon-store-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn constants_round_trip() {
        let store = RuntimeStore::new(temp_dir("round-trip"));
        store.save_constant("greeting", &PlainValue::Str("hi".to_owned())).unwrap();
        store.save_constant("answer", &PlainValue::Number(42.0)).unwrap();
        // overwrite keeps one entry per name
        store.save_constant("answer", &PlainValue::Number(43.0)).unwrap();

        let loaded = store.load_constants().unwrap();
        assert_eq!(
            loaded,
            vec![
                ("greeting".to_owned(), PlainValue::Str("hi".to_owned())),
                ("answer".to_owned(), PlainValue::Number(43.0)),
            ]
        );
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn missing_files_load_empty() {
        let store = RuntimeStore::new(temp_dir("missing"));
        assert!(store.load_constants().unwrap().is_empty());
        assert!(store.load_globals().unwrap().is_empty());
    }
}
