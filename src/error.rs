use std::path::PathBuf;

use thiserror::Error;

/// Library error type for startup resource failures.
///
/// Every variant is fatal: the viewer refuses to open its render loop when
/// any of these surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration lists no images to display.
    #[error("no images configured")]
    NoImages,

    /// An image file could not be opened or decoded.
    #[error("failed to load image {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An image exceeds the largest texture the GPU accepts.
    #[error("image {} is {width}x{height}, larger than the GPU texture limit of {max}", path.display())]
    TextureTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },

    /// The shader source file could not be read.
    #[error("could not load shader source from {}", path.display())]
    ShaderMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shader source file exists but holds nothing to compile.
    #[error("shader source {} is empty", path.display())]
    ShaderEmpty { path: PathBuf },

    /// The GPU rejected the shader module or the pipeline built from it.
    #[error("shader compile/link failed: {0}")]
    ShaderCompile(String),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
