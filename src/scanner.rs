use std::path::{Path, PathBuf};

use fixture_types::ScheduleVersion;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A schedule page dump discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub version: ScheduleVersion,
}

/// Schedule version implied by a file name, if any.
///
/// The federation publishes "Hoja de jornada definitiva" and "provisional"
/// sheets; downloaded dumps usually keep that word in their name.
pub fn version_from_name(path: &Path) -> Option<ScheduleVersion> {
    let stem = path.file_stem()?.to_string_lossy().to_lowercase();
    if stem.contains("definitiv") {
        Some(ScheduleVersion::Definitive)
    } else if stem.contains("provisional") {
        Some(ScheduleVersion::Provisional)
    } else {
        None
    }
}

fn is_page_dump(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("txt")
}

/// Collect the documents to extract from.
///
/// Files are taken as given; directories are walked two levels deep for
/// `.txt` dumps. Definitive listings come first, each group sorted by path.
pub fn scan_inputs(
    inputs: &[PathBuf],
    version_override: Option<ScheduleVersion>,
    default_version: ScheduleVersion,
) -> Result<Vec<SourceFile>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .min_depth(1)
                .max_depth(2)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if entry.file_type().is_file() && is_page_dump(path) {
                    paths.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            return Err(Error::io(
                input,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
    }
    paths.sort();
    paths.dedup();

    let mut files: Vec<SourceFile> = paths
        .into_iter()
        .map(|path| {
            let version = version_override
                .or_else(|| version_from_name(&path))
                .unwrap_or(default_version);
            debug!(path = %path.display(), %version, "input document");
            SourceFile { path, version }
        })
        .collect();

    if files.is_empty() {
        let shown = inputs.first().cloned().unwrap_or_else(|| PathBuf::from("."));
        return Err(Error::NoInput(shown));
    }

    // Stable: path order is kept inside each group
    files.sort_by_key(|f| f.version != ScheduleVersion::Definitive);
    Ok(files)
}
