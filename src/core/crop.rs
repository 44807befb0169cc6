use fast_image_resize as fr;
use fr::images::Image;

use crate::decoder::FrameData;
use crate::detector::DetectedFace;
use crate::shared::PrepError;

/// Crop region within the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Clamps a face box to the frame. `None` when nothing of it is left.
pub fn clip_to_frame(face: &DetectedFace, frame_width: u32, frame_height: u32) -> Option<CropRegion> {
    let x1 = face.x1.max(0) as i64;
    let y1 = face.y1.max(0) as i64;
    let x2 = (face.x2 as i64).min(frame_width as i64);
    let y2 = (face.y2 as i64).min(frame_height as i64);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(CropRegion {
        x: x1 as u32,
        y: y1 as u32,
        width: (x2 - x1) as u32,
        height: (y2 - y1) as u32,
    })
}

/// Copies the region's rows out of the packed RGB frame.
pub fn crop_rgb(frame: &FrameData, region: &CropRegion) -> Result<Vec<u8>, PrepError> {
    if region.width == 0 || region.height == 0 {
        return Err(PrepError::EmptyCrop);
    }
    if region.x + region.width > frame.width || region.y + region.height > frame.height {
        return Err(PrepError::Resize(format!(
            "crop {:?} exceeds {}x{} frame",
            region, frame.width, frame.height
        )));
    }
    if !frame.is_consistent() {
        return Err(PrepError::Resize(format!(
            "frame {} buffer does not match {}x{}",
            frame.index, frame.width, frame.height
        )));
    }

    let row_len = region.width as usize * 3;
    let mut out = Vec::with_capacity(row_len * region.height as usize);
    for y in region.y..region.y + region.height {
        let start = (y as usize * frame.width as usize + region.x as usize) * 3;
        out.extend_from_slice(&frame.buffer[start..start + row_len]);
    }
    Ok(out)
}

/// Bilinear RGB24 resizer reused across frames.
pub struct CropResizer {
    resizer: fr::Resizer,
    options: fr::ResizeOptions,
}

impl CropResizer {
    pub fn new() -> Self {
        Self {
            resizer: fr::Resizer::new(),
            options: fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
        }
    }

    /// Resizes to exactly `target_width` x `target_height`, ignoring aspect.
    pub fn resize(
        &mut self,
        rgb: Vec<u8>,
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Vec<u8>, PrepError> {
        let src_image = Image::from_vec_u8(width, height, rgb, fr::PixelType::U8x3)
            .map_err(|e| PrepError::Resize(e.to_string()))?;
        let mut dst_image = Image::new(target_width, target_height, fr::PixelType::U8x3);

        self.resizer
            .resize(&src_image, &mut dst_image, &self.options)
            .map_err(|e| PrepError::Resize(e.to_string()))?;

        Ok(dst_image.buffer().to_vec())
    }

    pub fn crop_and_resize(
        &mut self,
        frame: &FrameData,
        region: &CropRegion,
        target_width: u32,
        target_height: u32,
    ) -> Result<Vec<u8>, PrepError> {
        let cropped = crop_rgb(frame, region)?;
        self.resize(cropped, region.width, region.height, target_width, target_height)
    }
}

impl Default for CropResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> FrameData {
        let mut buffer = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                buffer.extend_from_slice(&[x as u8, y as u8, 7]);
            }
        }
        FrameData::new(0, buffer, width, height)
    }

    #[test]
    fn test_clip_inside_frame_is_unchanged() {
        let face = DetectedFace::new(10, 20, 110, 140);
        let region = clip_to_frame(&face, 320, 240).unwrap();
        assert_eq!(region, CropRegion { x: 10, y: 20, width: 100, height: 120 });
    }

    #[test]
    fn test_clip_clamps_to_bounds() {
        let face = DetectedFace::new(-15, -5, 400, 260);
        let region = clip_to_frame(&face, 320, 240).unwrap();
        assert_eq!(region, CropRegion { x: 0, y: 0, width: 320, height: 240 });
    }

    #[test]
    fn test_clip_outside_frame_is_empty() {
        assert_eq!(clip_to_frame(&DetectedFace::new(330, 10, 380, 60), 320, 240), None);
        assert_eq!(clip_to_frame(&DetectedFace::new(-50, 10, 0, 60), 320, 240), None);
        assert_eq!(clip_to_frame(&DetectedFace::new(10, 240, 60, 300), 320, 240), None);
    }

    #[test]
    fn test_crop_rgb_copies_rows() {
        let frame = gradient_frame(8, 6);
        let region = CropRegion { x: 2, y: 3, width: 3, height: 2 };
        let crop = crop_rgb(&frame, &region).unwrap();
        assert_eq!(crop.len(), 3 * 2 * 3);
        assert_eq!(&crop[0..3], &[2, 3, 7]);
        // last pixel of the second row
        assert_eq!(&crop[15..18], &[4, 4, 7]);
    }

    #[test]
    fn test_crop_rgb_rejects_out_of_bounds() {
        let frame = gradient_frame(8, 6);
        let region = CropRegion { x: 6, y: 0, width: 4, height: 2 };
        assert!(matches!(crop_rgb(&frame, &region), Err(PrepError::Resize(_))));
    }

    #[test]
    fn test_resize_hits_exact_target_for_any_aspect() {
        let frame = gradient_frame(120, 90);
        let mut resizer = CropResizer::new();

        for region in [
            CropRegion { x: 0, y: 0, width: 120, height: 90 },
            CropRegion { x: 10, y: 10, width: 3, height: 70 },
            CropRegion { x: 5, y: 40, width: 100, height: 1 },
        ] {
            let out = resizer.crop_and_resize(&frame, &region, 256, 256).unwrap();
            assert_eq!(out.len(), 256 * 256 * 3);
        }
    }
}
