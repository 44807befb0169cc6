use opencv::{
    core::{Rect, Size, Vector},
    imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
};
use std::path::{Path, PathBuf};

use super::{DetectedFace, FaceDetector};
use crate::core::config::DetectorConfig;
use crate::decoder::FrameData;
use crate::shared::{constants, PrepError};

/// Face detector backed by an OpenCV Haar cascade.
pub struct CascadeDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_face_size: i32,
    source: PathBuf,
}

impl CascadeDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, PrepError> {
        let source = locate_cascade(config.cascade_path.as_deref())?;
        let path_str = source
            .to_str()
            .ok_or_else(|| PrepError::Config(format!("cascade path {:?} is not valid UTF-8", source)))?;

        let classifier = CascadeClassifier::new(path_str)
            .map_err(|e| PrepError::Config(format!("failed to load cascade {:?}: {}", source, e)))?;
        if classifier.empty().map_err(|e| PrepError::Config(e.to_string()))? {
            return Err(PrepError::Config(format!("cascade {:?} is empty", source)));
        }

        crate::utils::logger::info(&format!("face cascade loaded from {}", source.display()));

        Ok(Self {
            classifier,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_face_size: config.min_face_size,
            source,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl FaceDetector for CascadeDetector {
    fn detect(&mut self, frame: &FrameData) -> Result<Vec<DetectedFace>, PrepError> {
        let detection_err = |e: opencv::Error| PrepError::Detection(e.to_string());

        let rgb = frame.to_mat().map_err(detection_err)?;
        let mut gray = Mat::default();
        imgproc::cvt_color_def(&rgb, &mut gray, imgproc::COLOR_RGB2GRAY).map_err(detection_err)?;

        let mut equalized = Mat::default();
        imgproc::equalize_hist(&gray, &mut equalized).map_err(detection_err)?;

        let mut rects = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &equalized,
                &mut rects,
                self.scale_factor,
                self.min_neighbors,
                0,
                Size::new(self.min_face_size, self.min_face_size),
                Size::new(0, 0),
            )
            .map_err(detection_err)?;

        Ok(rects
            .iter()
            .map(|r| DetectedFace::new(r.x, r.y, r.x + r.width, r.y + r.height))
            .collect())
    }
}

/// Resolves the cascade file: an explicit path must exist, otherwise the
/// well-known install directories are searched in order.
fn locate_cascade(explicit: Option<&Path>) -> Result<PathBuf, PrepError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(PrepError::Config(format!("cascade file {:?} does not exist", path)));
    }

    constants::CASCADE_DIR_CANDIDATES
        .iter()
        .map(|dir| Path::new(dir).join(constants::CASCADE_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            PrepError::Config(format!(
                "{} not found in {:?}; set detector.cascade_path",
                constants::CASCADE_FILE_NAME,
                constants::CASCADE_DIR_CANDIDATES
            ))
        })
}
