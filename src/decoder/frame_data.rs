use opencv::{core, prelude::*};

/// One decoded video frame in tightly packed RGB24 layout.
#[derive(Clone)]
pub struct FrameData {
    pub index: u64,
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    pub fn new(index: u64, buffer: Vec<u8>, width: u32, height: u32) -> Self {
        Self { index, buffer, width, height }
    }

    pub fn is_consistent(&self) -> bool {
        self.buffer.len() == (self.width as usize) * (self.height as usize) * 3
    }

    pub fn to_mat(&self) -> opencv::Result<Mat> {
        rgb_mat(&self.buffer, self.width, self.height)
    }
}

/// Copies a packed RGB24 buffer into an owned 3-channel `Mat`.
pub fn rgb_mat(buffer: &[u8], width: u32, height: u32) -> opencv::Result<Mat> {
    let expected = (width as usize) * (height as usize) * 3;
    if buffer.len() != expected {
        return Err(opencv::Error::new(
            core::StsUnmatchedSizes,
            format!("buffer holds {} bytes, {}x{} RGB needs {}", buffer.len(), width, height, expected),
        ));
    }

    let mut mat = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        core::CV_8UC3,
        core::Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(buffer);
    Ok(mat)
}
