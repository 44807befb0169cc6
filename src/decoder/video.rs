use opencv::{
    prelude::*,
    videoio,
    imgproc,
    core,
};
use std::path::Path;

use super::frame_data::FrameData;
use crate::shared::PrepError;

/// Sequential, single-pass frame source over one video file.
///
/// Frames come out in decode order with indices starting at 0. The
/// underlying capture is released as soon as the stream ends, errors, or
/// the decoder is dropped. Reopen the file for a second pass.
pub struct VideoDecoder {
    capture: videoio::VideoCapture,
    next_index: u64,
    finished: bool,
}

impl VideoDecoder {
    pub fn open(path: &Path) -> Result<Self, PrepError> {
        let open_err = |reason: String| PrepError::Open {
            path: path.to_path_buf(),
            reason,
        };

        let path_str = path
            .to_str()
            .ok_or_else(|| open_err("path is not valid UTF-8".to_string()))?;

        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| open_err(e.to_string()))?;

        if !capture.is_opened().map_err(|e| open_err(e.to_string()))? {
            return Err(open_err("container could not be opened".to_string()));
        }

        // Metadata is advisory; some containers report zero.
        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        let frame_count = capture
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .map(|n| n.max(0.0) as u64)
            .unwrap_or(0);

        crate::utils::logger::debug(&format!(
            "opened {} ({} frames reported, {:.2} fps)",
            path.display(),
            frame_count,
            fps
        ));

        Ok(Self {
            capture,
            next_index: 0,
            finished: false,
        })
    }

    fn read_next(&mut self) -> Result<Option<FrameData>, PrepError> {
        let index = self.next_index;
        let decode_err = |e: opencv::Error| PrepError::Decode {
            index,
            reason: e.to_string(),
        };

        let mut frame = Mat::default();
        if !self.capture.read(&mut frame).map_err(decode_err)? {
            return Ok(None);
        }
        if frame.empty() {
            return Ok(None);
        }

        let width = frame.cols() as u32;
        let height = frame.rows() as u32;
        let buffer = to_rgb_bytes(&frame).map_err(decode_err)?;

        self.next_index += 1;
        Ok(Some(FrameData::new(index, buffer, width, height)))
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            let _ = self.capture.release();
        }
    }
}

impl Iterator for VideoDecoder {
    type Item = Result<FrameData, PrepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                self.finish();
                Some(Err(e))
            }
        }
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Converts a decoded frame to packed RGB24 bytes.
///
/// OpenCV hands out BGR (3 channels), grayscale or BGRA depending on the
/// backend; all of them end up as RGB.
fn to_rgb_bytes(frame: &Mat) -> opencv::Result<Vec<u8>> {
    let code = match frame.channels() {
        1 => imgproc::COLOR_GRAY2RGB,
        4 => imgproc::COLOR_BGRA2RGB,
        _ => imgproc::COLOR_BGR2RGB,
    };

    let mut rgb = Mat::default();
    imgproc::cvt_color_def(frame, &mut rgb, code)?;

    if !rgb.is_continuous() {
        return Err(opencv::Error::new(
            core::StsError,
            "converted frame is not continuous".to_string(),
        ));
    }
    Ok(rgb.data_bytes()?.to_vec())
}

/// Writes a small MJPG `.avi` whose frame `i` is filled with gray level `i * 10`.
#[cfg(test)]
pub(crate) fn write_test_video(path: &Path, frames: u32, width: i32, height: i32) -> opencv::Result<()> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let path_str = path.to_str().unwrap_or_default();
    let fourcc = videoio::VideoWriter::fourcc('M', 'J', 'P', 'G')?;
    let mut writer = videoio::VideoWriter::new(path_str, fourcc, 25.0, core::Size::new(width, height), true)?;
    if !writer.is_opened()? {
        return Err(opencv::Error::new(core::StsError, format!("cannot write {}", path_str)));
    }

    for i in 0..frames {
        let level = ((i * 10) % 256) as f64;
        let frame = Mat::new_rows_cols_with_default(height, width, core::CV_8UC3, core::Scalar::all(level))?;
        writer.write(&frame)?;
    }
    writer.release()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_video(name: &str, frames: u32) -> std::path::PathBuf {
        let path = std::env::temp_dir().join("spoofprep_decoder_fixtures").join(name);
        let _ = fs::remove_file(&path);
        write_test_video(&path, frames, 64, 48).unwrap();
        path
    }

    #[test]
    fn test_indices_are_sequential_from_zero() {
        let path = fixture_video("sequential.avi", 12);
        let decoder = VideoDecoder::open(&path).unwrap();

        let frames: Vec<FrameData> = decoder.map(|f| f.unwrap()).collect();
        let indices: Vec<u64> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<u64>>());

        let first = &frames[0];
        assert_eq!((first.width, first.height), (64, 48));
        assert!(first.is_consistent());
    }

    #[test]
    fn test_exhausted_decoder_stays_exhausted() {
        let path = fixture_video("exhausted.avi", 3);
        let mut decoder = VideoDecoder::open(&path).unwrap();

        let mut count = 0;
        while let Some(frame) = decoder.next() {
            frame.unwrap();
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(decoder.next().is_none());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_early_drop_releases_and_reopen_restarts() {
        let path = fixture_video("reopen.avi", 6);

        let mut decoder = VideoDecoder::open(&path).unwrap();
        let taken: Vec<u64> = decoder.by_ref().take(2).map(|f| f.unwrap().index).collect();
        assert_eq!(taken, vec![0, 1]);
        drop(decoder);

        let mut reopened = VideoDecoder::open(&path).unwrap();
        assert_eq!(reopened.next().unwrap().unwrap().index, 0);
        assert_eq!(reopened.count(), 5);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let path = std::env::temp_dir().join("spoofprep_missing_video.mov");
        let _ = fs::remove_file(&path);

        match VideoDecoder::open(&path) {
            Err(PrepError::Open { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("missing file should not open"),
        }
    }

    #[test]
    fn test_garbage_file_yields_no_frames() {
        let dir = std::env::temp_dir().join("spoofprep_decoder_garbage");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.avi");
        fs::write(&path, b"definitely not a video container").unwrap();

        // Backends differ on whether this opens; either way nothing decodes.
        let frames = match VideoDecoder::open(&path) {
            Ok(decoder) => decoder.filter_map(|f| f.ok()).count(),
            Err(PrepError::Open { .. }) => 0,
            Err(other) => panic!("unexpected error: {}", other),
        };
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_bgr_frame_is_converted_to_rgb() {
        let mut frame =
            Mat::new_rows_cols_with_default(2, 2, core::CV_8UC3, core::Scalar::all(0.0)).unwrap();
        {
            let bytes = frame.data_bytes_mut().unwrap();
            // first pixel: pure blue in BGR order
            bytes[0] = 255;
            bytes[1] = 0;
            bytes[2] = 0;
        }

        let rgb = to_rgb_bytes(&frame).unwrap();
        assert_eq!(rgb.len(), 2 * 2 * 3);
        assert_eq!(&rgb[0..3], &[0, 0, 255]);
    }
}
