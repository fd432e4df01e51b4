// src/batch/walk.rs
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// An input file and where its index should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInOut {
    pub path_in: PathBuf,
    pub path_out: Option<PathBuf>,
}

/// Every file under `dir_in`, sorted by path. Output paths mirror the
/// input tree under `dir_out`. Hidden entries are skipped.
pub fn walk_files(dir_in: &Path, dir_out: Option<&Path>, recursive: bool) -> Result<Vec<FileInOut>> {
    let mut files = Vec::new();
    walk_into(dir_in, dir_out, recursive, &mut files)?;
    files.sort_by(|a, b| a.path_in.cmp(&b.path_in));
    Ok(files)
}

fn walk_into(dir_in: &Path, dir_out: Option<&Path>, recursive: bool, files: &mut Vec<FileInOut>) -> Result<()> {
    for entry in fs::read_dir(dir_in)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path_in = entry.path();
        let path_out = dir_out.map(|d| d.join(&name));
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if recursive {
                walk_into(&path_in, path_out.as_deref(), recursive, files)?;
            }
        } else if file_type.is_file() {
            files.push(FileInOut { path_in, path_out });
        }
    }
    Ok(())
}

/// Sorts largest input first so the longest jobs start early.
pub fn biggest_first(files: &mut [FileInOut]) {
    files.sort_by_cached_key(|f| {
        std::cmp::Reverse(fs::metadata(&f.path_in).map(|m| m.len()).unwrap_or(0))
    });
}
