//! Parallel import of files from disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::egg::PhotoEgg;
use crate::pipeline::{Pipeline, PipelineError};

/// Why importing one file failed.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pipeline rejected the file's contents.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Result of importing a single file.
#[derive(Debug)]
pub struct ImportOutcome {
    pub path: PathBuf,
    pub result: Result<PhotoEgg, ImportError>,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Progress callback: `(completed, total, outcome)`, `completed` is 1-based.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize, &ImportOutcome) + Sync);

/// Import one file from disk.
pub fn import_path(
    pipeline: &Pipeline,
    path: &Path,
    cold_preview_box_side: Option<u32>,
) -> Result<PhotoEgg, ImportError> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.file_name().and_then(|n| n.to_str());
    Ok(pipeline.import(&bytes, filename, cold_preview_box_side)?)
}

/// Import many files in parallel.
///
/// Outcomes come back in input order. A file that fails is reported in its
/// outcome and does not stop the others. `progress` is called once per file
/// as it completes, from whichever worker finished it.
pub fn process_paths<P: AsRef<Path> + Sync>(
    pipeline: &Pipeline,
    paths: &[P],
    cold_preview_box_side: Option<u32>,
    progress: Option<ProgressFn<'_>>,
) -> Vec<ImportOutcome> {
    let total = paths.len();
    let completed = AtomicUsize::new(0);

    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let outcome = ImportOutcome {
                path: path.to_path_buf(),
                result: import_path(pipeline, path, cold_preview_box_side),
            };

            match &outcome.result {
                Ok(egg) => debug!(path = %path.display(), hothash = %egg.hothash, "imported"),
                Err(err) => warn!(path = %path.display(), error = %err, "import failed"),
            }

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = progress {
                callback(done, total, &outcome);
            }
            outcome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode_test_jpeg, gradient_raster};
    use std::sync::Mutex;

    #[test]
    fn test_mixed_batch_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.jpg");
        let tiny = dir.path().join("tiny.jpg");
        let missing = dir.path().join("missing.jpg");
        std::fs::write(&good, encode_test_jpeg(&gradient_raster(200, 100))).unwrap();
        std::fs::write(&tiny, encode_test_jpeg(&gradient_raster(2, 2))).unwrap();

        let paths = vec![good.clone(), tiny.clone(), missing.clone()];
        let outcomes = process_paths(&Pipeline::default(), &paths, None, None);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].path, good);
        assert_eq!(outcomes[1].path, tiny);
        assert_eq!(outcomes[2].path, missing);

        let egg = outcomes[0].result.as_ref().unwrap();
        assert_eq!(egg.primary_filename.as_deref(), Some("good.jpg"));
        assert!(matches!(
            outcomes[1].result,
            Err(ImportError::Pipeline(PipelineError::ImageTooSmall { .. }))
        ));
        assert!(matches!(outcomes[2].result, Err(ImportError::Io { .. })));
    }

    #[test]
    fn test_progress_reports_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("{i}.jpg"));
                std::fs::write(&path, encode_test_jpeg(&gradient_raster(40 + i, 30))).unwrap();
                path
            })
            .collect();

        let seen = Mutex::new(Vec::new());
        let record = |done: usize, total: usize, outcome: &ImportOutcome| {
            assert_eq!(total, 4);
            assert!(outcome.is_success());
            seen.lock().unwrap().push(done);
        };
        let outcomes = process_paths(&Pipeline::default(), &paths, Some(300), Some(&record));

        assert!(outcomes.iter().all(ImportOutcome::is_success));
        let mut counts = seen.into_inner().unwrap();
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_batch() {
        let paths: Vec<PathBuf> = Vec::new();
        assert!(process_paths(&Pipeline::default(), &paths, None, None).is_empty());
    }
}
