//! Media helpers for asset import.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat};
use lig_core::{LigError, Result};
use tracing::debug;

/// Name of the directory, next to the GIF, that receives extracted frames.
pub const GIF_FRAMES_DIR: &str = "temp_gif_frames";

/// Frames decoded from an animated GIF.
#[derive(Debug, Clone, PartialEq)]
pub struct GifFrames {
    /// PNG files in playback order.
    pub frames: Vec<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl GifFrames {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

fn image_error(path: &Path, err: image::ImageError) -> LigError {
    LigError::import(format!("{}: {}", path.display(), err))
}

/// Decodes every frame of `gif_path` into
/// `temp_gif_frames/{stem}/frame_NNN.png` beside the GIF.
pub fn extract_gif_frames(gif_path: &Path) -> Result<GifFrames> {
    let is_gif = gif_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    if !is_gif {
        return Err(LigError::import(format!(
            "not a GIF file: {}",
            gif_path.display()
        )));
    }

    let stem = gif_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gif".to_string());
    let out_dir = gif_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(GIF_FRAMES_DIR)
        .join(stem);
    fs::create_dir_all(&out_dir)?;

    let reader = BufReader::new(File::open(gif_path)?);
    let decoder = GifDecoder::new(reader).map_err(|e| image_error(gif_path, e))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| image_error(gif_path, e))?;
    if frames.is_empty() {
        return Err(LigError::import(format!(
            "GIF has no frames: {}",
            gif_path.display()
        )));
    }

    let (width, height) = frames[0].buffer().dimensions();
    let mut paths = Vec::with_capacity(frames.len());
    for (index, frame) in frames.into_iter().enumerate() {
        let path = out_dir.join(format!("frame_{index:03}.png"));
        frame
            .into_buffer()
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| image_error(&path, e))?;
        paths.push(path);
    }
    debug!(gif = %gif_path.display(), frames = paths.len(), "Extracted GIF frames");

    Ok(GifFrames {
        frames: paths,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Frame, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_gif(path: &Path, frames: usize, width: u32, height: u32) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        let frames: Vec<Frame> = (0..frames)
            .map(|i| Frame::new(RgbaImage::from_pixel(width, height, Rgba([i as u8 * 40, 0, 0, 255]))))
            .collect();
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn test_extracts_frames_in_order() {
        let dir = TempDir::new().unwrap();
        let gif = dir.path().join("spin.gif");
        write_gif(&gif, 3, 4, 2);

        let frames = extract_gif_frames(&gif).unwrap();
        assert_eq!(frames.frames.len(), 3);
        assert!(frames.frames[2].ends_with("temp_gif_frames/spin/frame_002.png"));
        assert!(frames.frames.iter().all(|p| p.exists()));
        assert_eq!((frames.width, frames.height), (4, 2));
        assert_eq!(frames.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_rejects_non_gif() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("still.png");
        fs::write(&png, b"png").unwrap();
        assert!(matches!(extract_gif_frames(&png), Err(LigError::Import(_))));
    }

    #[test]
    fn test_corrupt_gif_is_import_error() {
        let dir = TempDir::new().unwrap();
        let gif = dir.path().join("broken.gif");
        fs::write(&gif, b"GIF89a-not-really").unwrap();
        assert!(matches!(extract_gif_frames(&gif), Err(LigError::Import(_))));
    }
}
