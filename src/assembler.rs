//
// assembler.rs
// Dicom-Study-rs
//
// Reads a file set, dispatches each file to its decoder and folds the results into one study.
// Decoding fans out over rayon in index-ordered batches; merging and progress stay on the caller's thread.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use dicom::object::file::ReadPreamble;
use dicom::object::{DefaultDicomObject, OpenFileOptions};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::annotation::decode_presentation_state;
use crate::classify::{classify, ObjectKind};
use crate::content_tree::decode_report;
use crate::dicom_access::Dataset;
use crate::error::{EmptyReason, FileError, LoadError};
use crate::metadata::{extract_image, extract_series, extract_study_header};
use crate::models::{
    Image, KeyObjectSelection, PresentationState, Report, Series, SeriesId, Study, StudyHeader,
};
use crate::overlay::DEFAULT_MAX_OVERLAY_BYTES;
use crate::progress::{Phase, ProgressEvent, ProgressSink};
use crate::references::decode_key_object;
use crate::scan::collect_files;

/// Options controlling how a file set is loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
    /// Images whose overlay planes unpack to more than this many bytes are skipped.
    pub max_overlay_bytes: u64,
    /// How many leading files may supply the study header.
    pub header_probe_limit: usize,
    pub parallel: bool,
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024,
            max_overlay_bytes: DEFAULT_MAX_OVERLAY_BYTES,
            header_probe_limit: 10,
            parallel: true,
            batch_size: 64,
        }
    }
}

impl LoadOptions {
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_max_overlay_bytes(mut self, bytes: u64) -> Self {
        self.max_overlay_bytes = bytes;
        self
    }

    pub fn with_header_probe_limit(mut self, files: usize) -> Self {
        self.header_probe_limit = files;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// What one file contributed.
#[derive(Debug)]
pub enum DecodedObject {
    Image { series: Series, image: Image },
    Report(Report),
    KeyObject(KeyObjectSelection),
    PresentationState(PresentationState),
    /// Classified but carrying nothing to keep (no references).
    Dropped(ObjectKind),
    Unknown,
}

#[derive(Debug)]
pub struct DecodedFile {
    pub header: Option<StudyHeader>,
    pub object: DecodedObject,
}

#[derive(Debug)]
pub struct SkippedFile {
    pub index: usize,
    pub path: PathBuf,
    pub error: FileError,
}

#[derive(Debug)]
pub struct LoadedStudy {
    pub study: Study,
    pub skipped: Vec<SkippedFile>,
}

/// Parse a whole file buffer, with or without the 128-byte preamble.
pub fn parse_bytes(mut bytes: Vec<u8>) -> Result<DefaultDicomObject, FileError> {
    if bytes.get(128..132) == Some(b"DICM".as_slice()) {
        bytes.drain(..128);
    }
    Ok(OpenFileOptions::new()
        .read_preamble(ReadPreamble::Never)
        .from_reader(Cursor::new(bytes))?)
}

pub fn read_file(path: &Path, options: &LoadOptions) -> Result<DefaultDicomObject, FileError> {
    let size = fs::metadata(path)?.len();
    if size > options.max_file_size {
        return Err(FileError::TooLarge {
            size,
            limit: options.max_file_size,
        });
    }
    let bytes = fs::read(path)?;
    parse_bytes(bytes)
}

/// Classify one parsed dataset and run the matching decoder.
pub fn decode_object(
    obj: &Dataset,
    path: &Path,
    options: &LoadOptions,
) -> Result<DecodedFile, FileError> {
    let header = extract_study_header(obj);
    let object = match classify(obj) {
        ObjectKind::Image => {
            let image = extract_image(obj, path, options.max_overlay_bytes)?;
            let series = extract_series(obj, image.series_id.clone());
            DecodedObject::Image { series, image }
        }
        ObjectKind::StructuredReport => DecodedObject::Report(decode_report(obj, path)?),
        ObjectKind::KeyObjectSelection => match decode_key_object(obj)? {
            Some(ko) => DecodedObject::KeyObject(ko),
            None => DecodedObject::Dropped(ObjectKind::KeyObjectSelection),
        },
        ObjectKind::PresentationState => match decode_presentation_state(obj)? {
            Some(pr) => DecodedObject::PresentationState(pr),
            None => DecodedObject::Dropped(ObjectKind::PresentationState),
        },
        ObjectKind::Unknown => DecodedObject::Unknown,
    };
    Ok(DecodedFile { header, object })
}

pub fn decode_file(path: &Path, options: &LoadOptions) -> Result<DecodedFile, FileError> {
    let obj = read_file(path, options)?;
    decode_object(&obj, path, options)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    AwaitingStudyHeader,
    Ingesting,
    Sorting,
    Complete,
    Empty,
}

/// Accumulates decoded files, in file-list order, into a study.
pub struct StudyAssembler {
    state: AssemblyState,
    header_probe_limit: usize,
    header: Option<StudyHeader>,
    series: Vec<Series>,
    series_index: HashMap<SeriesId, usize>,
    reports: Vec<Report>,
    key_objects: Vec<KeyObjectSelection>,
    presentation_states: Vec<PresentationState>,
    skipped: Vec<SkippedFile>,
}

impl StudyAssembler {
    pub fn new(header_probe_limit: usize) -> Self {
        Self {
            state: AssemblyState::AwaitingStudyHeader,
            header_probe_limit,
            header: None,
            series: Vec::new(),
            series_index: HashMap::new(),
            reports: Vec::new(),
            key_objects: Vec::new(),
            presentation_states: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Fold the outcome of file `index`. Must be called with increasing indices.
    pub fn ingest(&mut self, index: usize, path: &Path, outcome: Result<DecodedFile, FileError>) {
        if self.state == AssemblyState::Empty {
            return;
        }

        match outcome {
            Ok(decoded) => self.accept(index, path, decoded),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping file");
                self.skipped.push(SkippedFile {
                    index,
                    path: path.to_path_buf(),
                    error,
                });
            }
        }

        if self.state == AssemblyState::AwaitingStudyHeader && index + 1 >= self.header_probe_limit
        {
            info!(probed = self.header_probe_limit, "no study header in leading files");
            self.state = AssemblyState::Empty;
        }
    }

    fn accept(&mut self, index: usize, path: &Path, decoded: DecodedFile) {
        if self.state == AssemblyState::AwaitingStudyHeader && index < self.header_probe_limit {
            if let Some(header) = decoded.header {
                debug!(study = %header.study_id, path = %path.display(), "study header found");
                self.header = Some(header);
                self.state = AssemblyState::Ingesting;
            }
        }

        match decoded.object {
            DecodedObject::Image { series, image } => {
                let slot = match self.series_index.get(&image.series_id) {
                    Some(slot) => *slot,
                    None => {
                        self.series_index
                            .insert(image.series_id.clone(), self.series.len());
                        self.series.push(series);
                        self.series.len() - 1
                    }
                };
                self.series[slot].images.push(image);
            }
            DecodedObject::Report(report) => self.reports.push(report),
            DecodedObject::KeyObject(ko) => self.key_objects.push(ko),
            DecodedObject::PresentationState(pr) => self.presentation_states.push(pr),
            DecodedObject::Dropped(kind) => {
                debug!(?kind, path = %path.display(), "object without references dropped")
            }
            DecodedObject::Unknown => {
                debug!(path = %path.display(), "unclassifiable file dropped")
            }
        }
    }

    /// Run the terminal sort passes and hand out the study.
    pub fn finish(mut self) -> Result<LoadedStudy, LoadError> {
        let header = match (self.state, self.header.take()) {
            (AssemblyState::Ingesting, Some(header)) => header,
            _ => {
                self.state = AssemblyState::Empty;
                return Err(LoadError::Empty(EmptyReason::NoStudyHeader));
            }
        };

        self.state = AssemblyState::Sorting;
        if self.series.is_empty() {
            self.state = AssemblyState::Empty;
            return Err(LoadError::Empty(EmptyReason::NoSeries));
        }

        self.series.sort_by_key(|s| s.number.unwrap_or(0));
        for series in &mut self.series {
            series.images.sort_by_key(|i| i.instance_number.unwrap_or(0));
        }

        let mut study = Study::new(header);
        study.series = self.series;
        study.reports = self.reports;
        study.key_objects = self.key_objects;
        study.presentation_states = self.presentation_states;
        self.state = AssemblyState::Complete;

        info!(
            study = %study.header.study_id,
            series = study.series.len(),
            images = study.image_count(),
            reports = study.reports.len(),
            key_objects = study.key_objects.len(),
            presentation_states = study.presentation_states.len(),
            skipped = self.skipped.len(),
            "study assembled"
        );
        Ok(LoadedStudy {
            study,
            skipped: self.skipped,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load an explicit file list.
pub fn load_files<S: ProgressSink + ?Sized>(
    files: &[PathBuf],
    options: &LoadOptions,
    sink: &S,
) -> Result<LoadedStudy, LoadError> {
    let total = files.len();
    let batch_size = if options.parallel {
        options.batch_size.max(1)
    } else {
        1
    };
    let mut assembler = StudyAssembler::new(options.header_probe_limit);

    for (batch_index, batch) in files.chunks(batch_size).enumerate() {
        // `collect` on an indexed parallel iterator keeps input order.
        let outcomes: Vec<_> = if options.parallel {
            batch
                .par_iter()
                .map(|path| decode_file(path, options))
                .collect()
        } else {
            batch.iter().map(|path| decode_file(path, options)).collect()
        };

        for (offset, (path, outcome)) in batch.iter().zip(outcomes).enumerate() {
            let index = batch_index * batch_size + offset;
            assembler.ingest(index, path, outcome);
            sink.report(
                ProgressEvent::new(Phase::Parsing, index + 1, total).with_file_name(file_name(path)),
            );
            if assembler.state() == AssemblyState::Empty {
                return Err(LoadError::Empty(EmptyReason::NoStudyHeader));
            }
        }
    }

    sink.report(ProgressEvent::new(Phase::Loading, total, total));
    assembler.finish()
}

/// Scan `dir` and load every candidate file in it.
pub fn load_directory<S: ProgressSink + ?Sized>(
    dir: &Path,
    options: &LoadOptions,
    sink: &S,
) -> Result<LoadedStudy, LoadError> {
    let files = collect_files(dir, sink)?;
    load_files(&files, options, sink)
}
