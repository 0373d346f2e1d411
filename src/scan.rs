use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::LoadError;
use crate::progress::{Phase, ProgressEvent, ProgressSink};

const DICOM_EXTENSIONS: &[&str] = &["dcm", "dicom", "ima"];

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.starts_with('.'))
}

/// DICOM files commonly carry `.dcm`/`.ima` or no extension at all.
fn looks_like_dicom(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => true,
        Some(ext) => DICOM_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
    }
}

/// Candidate files under `dir`, in a stable path order.
pub fn collect_files<S: ProgressSink + ?Sized>(
    dir: &Path,
    sink: &S,
) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself is unreadable: nothing to load.
            Err(err) if err.depth() == 0 => {
                return Err(LoadError::Scan {
                    path: dir.to_path_buf(),
                    source: err,
                })
            }
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && looks_like_dicom(entry.path()) {
            files.push(entry.into_path());
        }
    }

    info!("Encontrados {} arquivos em {:?}", files.len(), dir);
    sink.report(ProgressEvent::new(Phase::Scanning, files.len(), files.len()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn keeps_dicom_like_files_in_order() {
        let root = tempdir().expect("tmpdir");
        fs::create_dir_all(root.path().join("series1")).expect("mkdir");
        fs::create_dir_all(root.path().join(".cache")).expect("mkdir");
        for name in ["b.dcm", "a.DCM", "IM0001", "notes.txt", "series1/c.ima", ".cache/d.dcm"] {
            fs::write(root.path().join(name), b"x").expect("write");
        }

        let files = collect_files(root.path(), &NoProgress).expect("scan");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root.path()).expect("prefix").to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["IM0001", "a.DCM", "b.dcm", "series1/c.ima"]);
    }

    #[test]
    fn missing_root_is_a_scan_error() {
        let root = tempdir().expect("tmpdir");
        let missing = root.path().join("nope");
        assert!(matches!(
            collect_files(&missing, &NoProgress),
            Err(LoadError::Scan { .. })
        ));
    }
}
