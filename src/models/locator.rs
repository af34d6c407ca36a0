//! Model file discovery

use crate::error::{PredictError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// A model file matching the name pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub path: PathBuf,
    /// Creation time, or modification time where creation is not reported
    pub created: SystemTime,
}

/// Finds the most recently created model artifact in a directory
pub struct ModelLocator {
    pattern: String,
    matcher: Regex,
}

impl ModelLocator {
    /// Create a locator for a file name pattern such as `cars_pipe_*.pkl`
    pub fn new(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let matcher = Regex::new(&format!("^{}$", body))
            .map_err(|e| PredictError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    /// Check a bare file name against the pattern
    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }

    /// List matching regular files, sorted by path
    pub fn candidates<P: AsRef<Path>>(&self, models_dir: P) -> Result<Vec<ModelCandidate>> {
        let models_dir = models_dir.as_ref();
        let entries = fs::read_dir(models_dir).map_err(|e| PredictError::io(models_dir, e))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PredictError::io(models_dir, e))?;
            let path = entry.path();

            // Undecodable bytes become U+FFFD, which `*` still matches
            if !self.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let metadata = fs::metadata(&path).map_err(|e| PredictError::io(&path, e))?;
            if !metadata.is_file() {
                continue;
            }

            let created = match metadata.created() {
                Ok(created) => created,
                Err(_) => metadata.modified().map_err(|e| PredictError::io(&path, e))?,
            };
            candidates.push(ModelCandidate { path, created });
        }

        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(
            dir = %models_dir.display(),
            pattern = %self.pattern,
            count = candidates.len(),
            "Scanned for model files"
        );

        Ok(candidates)
    }

    /// Locate the latest model file in a directory
    pub fn locate<P: AsRef<Path>>(&self, models_dir: P) -> Result<PathBuf> {
        let models_dir = models_dir.as_ref();
        let candidates = self.candidates(models_dir)?;

        select_latest(candidates)
            .map(|candidate| candidate.path)
            .ok_or_else(|| PredictError::NoModelFiles {
                dir: models_dir.to_path_buf(),
                pattern: self.pattern.clone(),
            })
    }
}

/// Pick the candidate with the latest timestamp; the first one wins on ties
pub fn select_latest<I>(candidates: I) -> Option<ModelCandidate>
where
    I: IntoIterator<Item = ModelCandidate>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(best) if best.created >= candidate.created => Some(best),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn candidate(name: &str, secs: u64) -> ModelCandidate {
        ModelCandidate {
            path: PathBuf::from(name),
            created: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    #[test]
    fn test_pattern_matching() {
        let locator = ModelLocator::new("cars_pipe_*.pkl").unwrap();
        assert!(locator.matches("cars_pipe_v1.pkl"));
        assert!(locator.matches("cars_pipe_.pkl"));
        assert!(locator.matches("cars_pipe_202401011200.pkl"));
        assert!(!locator.matches("cars_pipe_v1.pkl.bak"));
        assert!(!locator.matches("cars_pipeXv1.pkl"));
        assert!(!locator.matches("old_cars_pipe_v1.pkl"));
    }

    #[test]
    fn test_pattern_escapes_regex_characters() {
        let locator = ModelLocator::new("model+(1).json").unwrap();
        assert!(locator.matches("model+(1).json"));
        assert!(!locator.matches("modelll(1)xjson"));
    }

    #[test]
    fn test_select_latest_picks_max_timestamp() {
        let latest = select_latest(vec![
            candidate("a.pkl", 10),
            candidate("b.pkl", 30),
            candidate("c.pkl", 20),
        ])
        .unwrap();
        assert_eq!(latest.path, PathBuf::from("b.pkl"));
    }

    #[test]
    fn test_select_latest_first_wins_on_tie() {
        let latest = select_latest(vec![
            candidate("a.pkl", 30),
            candidate("b.pkl", 30),
            candidate("c.pkl", 5),
        ])
        .unwrap();
        assert_eq!(latest.path, PathBuf::from("a.pkl"));
    }

    #[test]
    fn test_select_latest_empty() {
        assert!(select_latest(Vec::new()).is_none());
    }

    #[test]
    fn test_locate_without_matches_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("other_model.pkl"), b"x").unwrap();
        fs::create_dir(dir.path().join("cars_pipe_dir.pkl")).unwrap();

        let locator = ModelLocator::new("cars_pipe_*.pkl").unwrap();
        let err = locator.locate(dir.path()).unwrap_err();
        assert!(matches!(err, PredictError::NoModelFiles { .. }));
    }

    #[test]
    fn test_locate_single_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cars_pipe_v1.pkl"), b"{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let locator = ModelLocator::new("cars_pipe_*.pkl").unwrap();
        let path = locator.locate(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cars_pipe_v1.pkl"));
    }

    #[test]
    fn test_locate_picks_newest_file_not_first_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cars_pipe_b.pkl"), b"{}").unwrap();
        // Wide enough for filesystems with one-second timestamps
        std::thread::sleep(Duration::from_millis(1100));
        fs::write(dir.path().join("cars_pipe_a.pkl"), b"{}").unwrap();

        let locator = ModelLocator::new("cars_pipe_*.pkl").unwrap();
        let path = locator.locate(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cars_pipe_a.pkl"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_names_are_candidates() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"cars_pipe_\xff.pkl");
        fs::write(dir.path().join(name), b"{}").unwrap();

        let locator = ModelLocator::new("cars_pipe_*.pkl").unwrap();
        let path = locator.locate(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(name));
    }

    #[test]
    fn test_locate_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ModelLocator::new("cars_pipe_*.pkl").unwrap();
        let err = locator.locate(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PredictError::Io { .. }));
    }
}
