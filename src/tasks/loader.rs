//! Startup resource loading.
//!
//! Decodes every configured image to RGBA8 and reads the shader source before
//! any window or GPU object exists, so a missing resource stops the program
//! before the first frame.
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::Configuration;
use crate::error::Error;
use crate::tasks::viewer::state::ImageSize;

/// An image decoded on CPU and ready for GPU upload.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixel buffer, top row first.
    pub pixels: Vec<u8>,
}

impl PreparedImage {
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Everything the viewer needs from disk.
#[derive(Debug, Clone)]
pub struct Assets {
    pub images: Vec<PreparedImage>,
    pub border: PreparedImage,
    pub shader_source: String,
}

impl Assets {
    pub fn load(cfg: &Configuration) -> Result<Self, Error> {
        // shader first: it is the cheapest failure to detect
        let shader_source = load_shader_source(&cfg.shader)?;
        if cfg.images.is_empty() {
            return Err(Error::NoImages);
        }
        let images = cfg
            .images
            .iter()
            .map(|path| load_image(path))
            .collect::<Result<Vec<_>, _>>()?;
        let border = load_image(&cfg.border_image)?;
        info!(
            images = images.len(),
            shader = %cfg.shader.display(),
            "startup resources loaded"
        );
        Ok(Self {
            images,
            border,
            shader_source,
        })
    }

    pub fn image_sizes(&self) -> Vec<ImageSize> {
        self.images.iter().map(PreparedImage::size).collect()
    }

    /// Reject any image (border included) wider or taller than `max` texels.
    pub fn check_texture_limit(&self, max: u32) -> Result<(), Error> {
        for image in self.images.iter().chain(std::iter::once(&self.border)) {
            if image.width > max || image.height > max {
                error!(
                    path = %image.path.display(),
                    width = image.width,
                    height = image.height,
                    max,
                    "image exceeds GPU texture limit"
                );
                return Err(Error::TextureTooLarge {
                    path: image.path.clone(),
                    width: image.width,
                    height: image.height,
                    max,
                });
            }
        }
        Ok(())
    }
}

pub fn load_image(path: &Path) -> Result<PreparedImage, Error> {
    let img = image::open(path).map_err(|source| {
        error!(path = %path.display(), error = %source, "failed to load image");
        Error::Image {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!(path = %path.display(), width, height, "decoded image");
    Ok(PreparedImage {
        path: path.to_path_buf(),
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Read shader source, rejecting missing or blank files.
pub fn load_shader_source(path: &Path) -> Result<String, Error> {
    let source = std::fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), error = %source, "could not load shader source");
        Error::ShaderMissing {
            path: path.to_path_buf(),
            source,
        }
    })?;
    if source.trim().is_empty() {
        error!(path = %path.display(), "shader source is empty");
        return Err(Error::ShaderEmpty {
            path: path.to_path_buf(),
        });
    }
    Ok(source)
}
