// src/batch/mod.rs
//! Indexing of whole directory trees.
//!
//! Every file is indexed independently. A failure on one file is logged
//! and recorded in its [`IndexResult`], it never stops the batch.

mod gnuplot;
mod summary;
mod walk;

pub use gnuplot::{plot_results, write_plot_data, PLOT_NAME};
pub use summary::write_summary;
pub use walk::{biggest_first, walk_files, FileInOut};

use crate::error::Result;
use crate::index::LogicalIndex;
use crate::reader::{detect_file_type, BinaryFileType};
use crate::xml::{write_index, IndexOptions};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Outcome of indexing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexResult {
    pub path_input: PathBuf,
    pub size_input: u64,
    pub size_index: u64,
    pub time: Duration,
    /// Indexing failed.
    pub exception: bool,
    /// Not a RP66V1 file.
    pub ignored: bool,
}

impl IndexResult {
    fn ignored(path_input: &Path) -> Self {
        IndexResult {
            path_input: path_input.to_path_buf(),
            size_input: 0,
            size_index: 0,
            time: Duration::ZERO,
            exception: false,
            ignored: true,
        }
    }

    fn failed(path_input: &Path, size_input: u64) -> Self {
        IndexResult {
            path_input: path_input.to_path_buf(),
            size_input,
            size_index: 0,
            time: Duration::ZERO,
            exception: true,
            ignored: false,
        }
    }

    /// Milliseconds per MiB of input, zero for empty input.
    pub fn ms_per_mb(&self) -> f64 {
        rate_ms_per_mb(self.time, self.size_input)
    }

    /// Index size over input size, zero for empty input.
    pub fn ratio(&self) -> f64 {
        ratio(self.size_index, self.size_input)
    }
}

pub(crate) fn rate_ms_per_mb(time: Duration, size: u64) -> f64 {
    if size == 0 {
        return 0.0;
    }
    time.as_secs_f64() * 1000.0 / (size as f64 / (1024.0 * 1024.0))
}

pub(crate) fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Settings for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchConfig {
    /// Descend into sub-directories.
    pub recurse: bool,
    /// Write private EFLR objects too.
    pub private: bool,
    /// Worker threads for a directory. `None` is sequential, `Some(0)`
    /// one worker per available core.
    pub jobs: Option<usize>,
}

/// Indexes `path_in` into `<path_out>.xml`, or to stdout when there is no
/// output path.
pub fn index_a_single_file(path_in: &Path, path_out: Option<&Path>, private: bool) -> IndexResult {
    match detect_file_type(path_in) {
        Ok(BinaryFileType::Rp66v1) => {}
        Ok(file_type) => {
            debug!("Ignoring {} file {}", file_type, path_in.display());
            return IndexResult::ignored(path_in);
        }
        Err(err) => {
            error!("Can not read {}: {}", path_in.display(), err);
            return IndexResult::failed(path_in, 0);
        }
    }
    let size_input = fs::metadata(path_in).map(|m| m.len()).unwrap_or(0);
    let start = Instant::now();
    match index_to(path_in, path_out, private) {
        Ok(size_index) => {
            let time = start.elapsed();
            info!(
                "Indexed {} ({} bytes) to {} bytes in {:.3}s",
                path_in.display(),
                size_input,
                size_index,
                time.as_secs_f64()
            );
            IndexResult {
                path_input: path_in.to_path_buf(),
                size_input,
                size_index,
                time,
                exception: false,
                ignored: false,
            }
        }
        Err(err) => {
            error!("Failed to index {}: {}", path_in.display(), err);
            IndexResult::failed(path_in, size_input)
        }
    }
}

fn index_to(path_in: &Path, path_out: Option<&Path>, private: bool) -> Result<u64> {
    let index = LogicalIndex::from_path(path_in)?;
    let options = IndexOptions { private };
    match path_out {
        Some(path_out) => {
            let path_xml = xml_path(path_out);
            if let Some(parent) = path_xml.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut output = BufWriter::new(File::create(&path_xml)?);
            write_index(&index, &mut output, &options)?;
            output.flush()?;
            drop(output);
            Ok(fs::metadata(&path_xml)?.len())
        }
        None => {
            let mut buffer = Vec::new();
            write_index(&index, &mut buffer, &options)?;
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(&buffer)?;
            lock.flush()?;
            Ok(buffer.len() as u64)
        }
    }
}

/// `path` with `.xml` appended to its full file name.
pub fn xml_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".xml");
    PathBuf::from(name)
}

fn index_guarded(job: &FileInOut, private: bool) -> IndexResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        index_a_single_file(&job.path_in, job.path_out.as_deref(), private)
    }));
    outcome.unwrap_or_else(|_| {
        error!("Panic while indexing {}", job.path_in.display());
        let size_input = fs::metadata(&job.path_in).map(|m| m.len()).unwrap_or(0);
        IndexResult::failed(&job.path_in, size_input)
    })
}

/// Indexes a single file, or every file in a directory one after another.
pub fn index_dir_or_file(
    path_in: &Path,
    path_out: Option<&Path>,
    recurse: bool,
    private: bool,
) -> Result<BTreeMap<PathBuf, IndexResult>> {
    info!(
        "Indexing {} to {} recurse: {}",
        path_in.display(),
        path_out.map_or_else(|| "stdout".into(), |p| p.display().to_string()),
        recurse
    );
    let mut results = BTreeMap::new();
    if path_in.is_dir() {
        for job in walk_files(path_in, path_out, recurse)? {
            results.insert(job.path_in.clone(), index_guarded(&job, private));
        }
    } else {
        let job = FileInOut {
            path_in: path_in.to_path_buf(),
            path_out: path_out.map(Path::to_path_buf),
        };
        results.insert(job.path_in.clone(), index_guarded(&job, private));
    }
    Ok(results)
}

/// Number of workers for a `jobs` setting, zero means all cores.
pub fn worker_count(jobs: usize) -> usize {
    if jobs == 0 {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    } else {
        jobs
    }
}

/// Indexes a directory with a pool of `jobs` worker threads, largest
/// files first.
pub fn index_dir_parallel(
    dir_in: &Path,
    dir_out: Option<&Path>,
    recurse: bool,
    private: bool,
    jobs: usize,
) -> Result<BTreeMap<PathBuf, IndexResult>> {
    let mut files = walk_files(dir_in, dir_out, recurse)?;
    biggest_first(&mut files);
    let workers = worker_count(jobs).min(files.len()).max(1);
    info!("Indexing {} files in {} with {} workers", files.len(), dir_in.display(), workers);

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<FileInOut>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<IndexResult>();
    let mut results = BTreeMap::new();
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for job in job_rx.iter() {
                    if result_tx.send(index_guarded(&job, private)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(result_tx);
        for job in files {
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);
        for result in result_rx.iter() {
            results.insert(result.path_input.clone(), result);
        }
    });
    Ok(results)
}

/// Runs a batch, in parallel when `path_in` is a directory and jobs are set.
pub fn run_batch(path_in: &Path, path_out: Option<&Path>, config: &BatchConfig) -> Result<BTreeMap<PathBuf, IndexResult>> {
    match config.jobs {
        Some(jobs) if path_in.is_dir() => index_dir_parallel(path_in, path_out, config.recurse, config.private, jobs),
        _ => index_dir_or_file(path_in, path_out, config.recurse, config.private),
    }
}
