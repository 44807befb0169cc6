use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::config::{DatasetConfig, PrepConfig};
use super::extractor::{FaceExtractor, FrameOutcome};
use super::label::{normalize_subset, resolve_label, unknown_label_warning, video_name, Dataset, Label};
use crate::decoder::VideoDecoder;
use crate::detector::FaceDetector;
use crate::shared::PrepError;
use crate::utils::{file_utils, logger, time_utils};

/// A discovered input video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub path: PathBuf,
    pub dataset: Dataset,
    /// Raw subset folder name, before normalization.
    pub subset: String,
}

/// Counters collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub datasets_walked: usize,
    pub videos_found: usize,
    pub videos_processed: usize,
    pub videos_skipped_label: usize,
    pub videos_failed_open: usize,
    pub videos_truncated: usize,
    pub frames_decoded: u64,
    pub frames_sampled: u64,
    pub samples_written: u64,
    pub frames_no_face: u64,
    pub detector_failures: u64,
    pub empty_crops: u64,
    pub resize_failures: u64,
    pub write_failures: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FrameOutcome) {
        self.frames_sampled += 1;
        match outcome {
            FrameOutcome::Saved(_) => self.samples_written += 1,
            FrameOutcome::NoFace => self.frames_no_face += 1,
            FrameOutcome::DetectorFailed(_) => self.detector_failures += 1,
            FrameOutcome::EmptyCrop => self.empty_crops += 1,
            FrameOutcome::ResizeFailed(_) => self.resize_failures += 1,
            FrameOutcome::WriteFailed(_) => self.write_failures += 1,
        }
    }
}

/// Per-video result of a completed decode pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VideoStats {
    pub frames_decoded: u64,
    pub frames_sampled: u64,
    pub samples_written: u64,
    pub truncated: bool,
}

/// Walks the configured datasets and turns every usable video into face
/// crops. Failures never leave the video they happened in.
pub struct DatasetWalker<'a, D: FaceDetector> {
    config: &'a PrepConfig,
    detector: D,
    extractor: FaceExtractor,
    show_progress: bool,
}

impl<'a, D: FaceDetector> DatasetWalker<'a, D> {
    pub fn new(config: &'a PrepConfig, detector: D) -> Self {
        Self {
            config,
            detector,
            extractor: FaceExtractor::from_config(config),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&mut self) -> RunSummary {
        let config = self.config;
        let mut summary = RunSummary::default();

        logger::info(&format!(
            "run started: raw_root={} processed_root={} target={}x{} interval={}",
            config.raw_root.display(),
            config.processed_root.display(),
            config.target_width,
            config.target_height,
            config.frame_interval
        ));

        for ds in &config.datasets {
            // Read and write under the same canonical dataset folder name.
            let dataset = Dataset::from_name(&ds.name);
            let root = config.raw_root.join(dataset.name());
            if !root.is_dir() {
                self.warn(None, &format!("dataset root {} not found, skipping", root.display()));
                continue;
            }
            summary.datasets_walked += 1;
            self.walk_dataset(ds, &dataset, &root, &mut summary);
        }

        logger::info(&format!("run finished: {:?}", summary));
        summary
    }

    fn walk_dataset(&mut self, ds: &DatasetConfig, dataset: &Dataset, root: &Path, summary: &mut RunSummary) {
        for subset in &ds.subsets {
            let subset_dir = root.join(subset);
            if !subset_dir.is_dir() {
                self.warn(
                    None,
                    &format!("{}: subset folder '{}' not found, skipping", dataset, subset),
                );
                continue;
            }

            let videos = match file_utils::find_videos(&subset_dir, &ds.extensions) {
                Some((ext, files)) => {
                    logger::info(&format!(
                        "{}/{}: {} .{} videos",
                        dataset,
                        subset,
                        files.len(),
                        ext
                    ));
                    files
                }
                None => {
                    self.warn(
                        None,
                        &format!("{}/{}: no videos with extensions {:?}", dataset, subset, ds.extensions),
                    );
                    continue;
                }
            };

            if self.show_progress {
                println!("Dataset: {} | Subset: {} | Videos: {}", dataset, subset, videos.len());
            }
            summary.videos_found += videos.len();

            let bar = self.progress_bar(videos.len() as u64);
            for path in videos {
                let record = VideoRecord {
                    path,
                    dataset: dataset.clone(),
                    subset: subset.clone(),
                };
                self.handle_video(&record, &bar, summary);
                bar.inc(1);
            }
            bar.finish_and_clear();
        }
    }

    fn handle_video(&mut self, record: &VideoRecord, bar: &ProgressBar, summary: &mut RunSummary) {
        let label = resolve_label(&record.path, &record.dataset);
        if label == Label::Unknown {
            self.warn(
                Some(bar),
                &format!("{}, skipping", unknown_label_warning(&record.path, &record.dataset)),
            );
            summary.videos_skipped_label += 1;
            return;
        }

        match self.process_video(record, label, summary) {
            Ok(stats) => {
                summary.videos_processed += 1;
                if stats.truncated {
                    summary.videos_truncated += 1;
                }
            }
            Err(e) => {
                logger::error(&e.to_string());
                bar.println(format!("Skipping {}: {}", record.path.display(), e));
                summary.videos_failed_open += 1;
            }
        }
    }

    /// `processed_root/<dataset>/<normalized subset>/<label>`
    pub fn output_dir(&self, record: &VideoRecord, label: Label) -> Option<PathBuf> {
        Some(
            self.config
                .processed_root
                .join(record.dataset.name())
                .join(normalize_subset(&record.subset))
                .join(label.dir_name()?),
        )
    }

    /// Decodes one video and runs the extractor on every sampled frame.
    ///
    /// Only an open failure is returned as an error. A decode error part way
    /// through keeps what was already written and marks the video truncated.
    pub fn process_video(
        &mut self,
        record: &VideoRecord,
        label: Label,
        summary: &mut RunSummary,
    ) -> Result<VideoStats, PrepError> {
        let output_dir = self.output_dir(record, label).ok_or_else(|| PrepError::Open {
            path: record.path.clone(),
            reason: "video has no resolvable label".to_string(),
        })?;
        let name = video_name(&record.path);
        let interval = self.config.frame_interval.max(1) as u64;
        let timer = time_utils::Timer::new();

        let decoder = VideoDecoder::open(&record.path)?;
        let mut stats = VideoStats::default();

        for frame in decoder {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    logger::error(&format!("{}: {}", record.path.display(), e));
                    stats.truncated = true;
                    break;
                }
            };
            stats.frames_decoded += 1;

            if frame.index % interval != 0 {
                continue;
            }
            stats.frames_sampled += 1;

            let outcome = self
                .extractor
                .process_frame(&mut self.detector, &frame, &output_dir, &name);
            if outcome.is_saved() {
                stats.samples_written += 1;
            }
            match &outcome {
                FrameOutcome::DetectorFailed(reason) => {
                    logger::debug(&format!("{} frame {}: detector failed: {}", name, frame.index, reason))
                }
                FrameOutcome::ResizeFailed(reason) | FrameOutcome::WriteFailed(reason) => {
                    logger::warn(&format!("{} frame {}: {}", name, frame.index, reason))
                }
                FrameOutcome::Saved(_) | FrameOutcome::NoFace | FrameOutcome::EmptyCrop => {}
            }
            summary.record(&outcome);
        }
        summary.frames_decoded += stats.frames_decoded;

        logger::info(&format!(
            "{} [{}] decoded={} sampled={} written={} in {}ms",
            record.path.display(),
            label,
            stats.frames_decoded,
            stats.frames_sampled,
            stats.samples_written,
            timer.elapsed_ms()
        ));

        Ok(stats)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} videos [{elapsed_precise}<{eta}]")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar
    }

    fn warn(&self, bar: Option<&ProgressBar>, msg: &str) {
        logger::warn(msg);
        if !self.show_progress {
            return;
        }
        match bar {
            Some(bar) => bar.println(format!("Warning: {}", msg)),
            None => eprintln!("Warning: {}", msg),
        }
    }
}
