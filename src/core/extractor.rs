use opencv::{core::Vector, imgcodecs, imgproc, prelude::*};
use std::fs;
use std::path::{Path, PathBuf};

use super::config::PrepConfig;
use super::crop::{clip_to_frame, CropResizer};
use crate::decoder::frame_data::{rgb_mat, FrameData};
use crate::detector::{select_largest, FaceDetector};
use crate::shared::{constants, PrepError};

/// What happened to one sampled frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Saved(PathBuf),
    NoFace,
    DetectorFailed(String),
    EmptyCrop,
    ResizeFailed(String),
    WriteFailed(String),
}

impl FrameOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FrameOutcome::Saved(_))
    }
}

/// `<output_dir>/<video_name>_frame<index>.jpg`
pub fn sample_path(output_dir: &Path, video_name: &str, frame_index: u64) -> PathBuf {
    output_dir.join(format!(
        "{}_frame{}.{}",
        video_name,
        frame_index,
        constants::OUTPUT_EXTENSION
    ))
}

/// Turns sampled frames into fixed-size face crops on disk.
pub struct FaceExtractor {
    target_width: u32,
    target_height: u32,
    jpeg_quality: i32,
    resizer: CropResizer,
}

impl FaceExtractor {
    pub fn new(target_width: u32, target_height: u32, jpeg_quality: i32) -> Self {
        Self {
            target_width,
            target_height,
            jpeg_quality,
            resizer: CropResizer::new(),
        }
    }

    pub fn from_config(config: &PrepConfig) -> Self {
        Self::new(config.target_width, config.target_height, config.jpeg_quality)
    }

    /// Detect, select, clip, resize and write the largest face of `frame`.
    ///
    /// Never fails: every problem is reported through the outcome so the
    /// caller can keep going with the next frame.
    pub fn process_frame<D: FaceDetector + ?Sized>(
        &mut self,
        detector: &mut D,
        frame: &FrameData,
        output_dir: &Path,
        video_name: &str,
    ) -> FrameOutcome {
        let faces = match detector.detect(frame) {
            Ok(faces) => faces,
            Err(e) => return FrameOutcome::DetectorFailed(e.to_string()),
        };

        let Some(face) = select_largest(&faces) else {
            return FrameOutcome::NoFace;
        };

        let Some(region) = clip_to_frame(&face, frame.width, frame.height) else {
            return FrameOutcome::EmptyCrop;
        };

        let resized = match self
            .resizer
            .crop_and_resize(frame, &region, self.target_width, self.target_height)
        {
            Ok(buf) => buf,
            Err(PrepError::EmptyCrop) => return FrameOutcome::EmptyCrop,
            Err(e) => return FrameOutcome::ResizeFailed(e.to_string()),
        };

        let path = sample_path(output_dir, video_name, frame.index);
        match write_jpeg(&path, &resized, self.target_width, self.target_height, self.jpeg_quality) {
            Ok(()) => FrameOutcome::Saved(path),
            Err(e) => FrameOutcome::WriteFailed(e.to_string()),
        }
    }
}

/// Encodes an RGB24 buffer as JPEG, creating parent directories first.
pub fn write_jpeg(path: &Path, rgb: &[u8], width: u32, height: u32, quality: i32) -> Result<(), PrepError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let encode_err = |e: opencv::Error| PrepError::Encode(e.to_string());

    let rgb = rgb_mat(rgb, width, height).map_err(encode_err)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR).map_err(encode_err)?;

    let path_str = path
        .to_str()
        .ok_or_else(|| PrepError::Encode(format!("output path {:?} is not valid UTF-8", path)))?;
    let params = Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, quality]);

    if !imgcodecs::imwrite(path_str, &bgr, &params).map_err(encode_err)? {
        return Err(PrepError::Encode(format!("imwrite refused {}", path.display())));
    }
    Ok(())
}
