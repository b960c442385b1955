//! High score persistence: a single decimal integer in a file.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::{HIGH_SCORE_FILE, home_file};

pub trait HighScoreStore {
    /// The stored high score, or 0 when there is none or it can't be read.
    fn load(&self) -> u64;

    fn save(&self, score: u64) -> io::Result<()>;
}

pub struct FileHighScoreStore {
    path: Option<PathBuf>,
}

impl FileHighScoreStore {
    /// The store in the user's home directory.
    pub fn in_home() -> Self {
        let path = home_file(HIGH_SCORE_FILE);
        if path.is_none() {
            log::warn!("no home directory, high score will not be kept");
        }
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u64 {
        let Some(path) = &self.path else {
            return 0;
        };
        match fs::read_to_string(path) {
            Ok(text) => text.trim().parse().unwrap_or_else(|err| {
                log::warn!("ignoring malformed high score in {}: {err}", path.display());
                0
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
            Err(err) => {
                log::warn!("failed to read high score from {}: {err}", path.display());
                0
            }
        }
    }

    fn save(&self, score: u64) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no home directory"));
        };
        fs::write(path, score.to_string())?;
        log::info!("saved high score {score} to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("term-rex-test-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_fresh_store_loads_zero() {
        let path = temp_path("fresh");
        let _ = fs::remove_file(&path);
        assert_eq!(FileHighScoreStore::at(&path).load(), 0);
    }

    #[test]
    fn test_malformed_file_loads_zero() {
        let path = temp_path("malformed");
        fs::write(&path, "not a number").unwrap();
        assert_eq!(FileHighScoreStore::at(&path).load(), 0);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_trailing_newline_is_accepted() {
        let path = temp_path("newline");
        fs::write(&path, "1234\n").unwrap();
        assert_eq!(FileHighScoreStore::at(&path).load(), 1234);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let store = FileHighScoreStore::at(temp_path("missing-dir").join("nested").join("score"));
        assert!(store.save(5).is_err());
    }

    proptest! {
        #[test]
        fn prop_save_then_load_round_trips(score in any::<u64>()) {
            let path = temp_path("roundtrip");
            let store = FileHighScoreStore::at(&path);
            store.save(score).unwrap();
            prop_assert_eq!(store.load(), score);
            fs::remove_file(&path).unwrap();
        }
    }
}
