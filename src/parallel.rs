use std::{
    path::{Path, PathBuf},
    thread,
};

use log::debug;

use crate::{decode_with, DecodeOptions, MetricKind, MetricTable, Result};

/// A metrics file found in a run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFile {
    pub path: PathBuf,
    pub kind: MetricKind,
}

/// The recognised metrics files of one run's `InterOp/` directory.
///
/// Each file decodes independently, so [`RunDirectory::decode_all`] spreads them
/// over threads without any shared state.
///
/// ```rust,no_run
/// use interop::{DecodeOptions, RunDirectory};
///
/// # fn main() -> interop::Result<()> {
/// let run = RunDirectory::scan("/runs/240101_M00001_0001/InterOp")?;
/// let results = run.decode_all(0, &DecodeOptions::default()); // 0 = all cores
/// for (file, table) in run.files().iter().zip(results) {
///     println!("{}: {} records", file.kind, table?.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RunDirectory {
    root: PathBuf,
    files: Vec<MetricFile>,
}
impl RunDirectory {
    /// Lists the files of `dir` whose names match a known metrics file.
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Ok(kind) = MetricKind::from_path(&path) {
                files.push(MetricFile { path, kind });
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("found {} metrics files in {}", files.len(), root.display());
        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[MetricFile] {
        &self.files
    }

    /// Decodes every file, one result per entry of [`files`](Self::files) in the same order.
    ///
    /// `num_threads == 0` uses all available cores.
    pub fn decode_all(
        &self,
        num_threads: usize,
        options: &DecodeOptions,
    ) -> Vec<Result<MetricTable>> {
        if self.files.is_empty() {
            return Vec::new();
        }
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads.min(num_cpus::get())
        }
        .clamp(1, self.files.len());
        let files_per_thread = self.files.len().div_ceil(num_threads);

        thread::scope(|scope| {
            let handles: Vec<_> = self
                .files
                .chunks(files_per_thread)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|file| decode_with(&file.path, file.kind, options))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}
