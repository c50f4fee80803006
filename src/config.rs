use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::error::Error;

/// Window surface settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct WindowOptions {
    #[serde(default = "WindowOptions::default_width")]
    pub width: u32,
    #[serde(default = "WindowOptions::default_height")]
    pub height: u32,
    #[serde(default = "WindowOptions::default_title")]
    pub title: String,
    #[serde(default)]
    pub resizable: bool,
}

impl WindowOptions {
    const fn default_width() -> u32 {
        512
    }

    const fn default_height() -> u32 {
        512
    }

    fn default_title() -> String {
        "quad viewer".to_string()
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            title: Self::default_title(),
            resizable: false,
        }
    }
}

/// Step sizes used by the mouse/scroll controls.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Controls {
    /// Scale multiplier applied per scroll notch.
    #[serde(default = "Controls::default_zoom_step")]
    pub zoom_step: f64,
    /// Rotation applied per scroll notch while the right button is held.
    #[serde(default = "Controls::default_rotate_step_degrees")]
    pub rotate_step_degrees: f64,
    /// Amount each scroll notch adds to (or removes from) the zoom budget.
    #[serde(default = "Controls::default_zoom_budget_step")]
    pub zoom_budget_step: f64,
}

impl Controls {
    const fn default_zoom_step() -> f64 {
        1.05
    }

    const fn default_rotate_step_degrees() -> f64 {
        3.0
    }

    const fn default_zoom_budget_step() -> f64 {
        0.025
    }

    pub fn rotate_step_radians(&self) -> f64 {
        self.rotate_step_degrees.to_radians()
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            zoom_step: Self::default_zoom_step(),
            rotate_step_degrees: Self::default_rotate_step_degrees(),
            zoom_budget_step: Self::default_zoom_budget_step(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// Images cycled with the arrow keys, in display order.
    #[serde(default = "Configuration::default_images")]
    pub images: Vec<PathBuf>,
    /// Overlay texture bound next to the active image.
    #[serde(default = "Configuration::default_border_image")]
    pub border_image: PathBuf,
    /// WGSL source providing `vs_main` and `fs_main`.
    #[serde(default = "Configuration::default_shader")]
    pub shader: PathBuf,
    #[serde(default)]
    pub window: WindowOptions,
    #[serde(default)]
    pub controls: Controls,
    /// Abort after this many consecutive frames reporting GPU errors.
    #[serde(default)]
    pub gpu_error_limit: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            images: Self::default_images(),
            border_image: Self::default_border_image(),
            shader: Self::default_shader(),
            window: WindowOptions::default(),
            controls: Controls::default(),
            gpu_error_limit: None,
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(!self.images.is_empty(), "images must list at least one file");
        ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window dimensions must be greater than zero"
        );
        ensure!(
            self.controls.zoom_step.is_finite() && self.controls.zoom_step > 0.0,
            "controls.zoom-step must be positive"
        );
        ensure!(
            self.controls.rotate_step_degrees.is_finite(),
            "controls.rotate-step-degrees must be finite"
        );
        ensure!(
            self.controls.zoom_budget_step.is_finite() && self.controls.zoom_budget_step >= 0.0,
            "controls.zoom-budget-step must not be negative"
        );
        if let Some(limit) = self.gpu_error_limit {
            ensure!(limit > 0, "gpu-error-limit must be greater than zero");
        }
        Ok(self)
    }

    fn default_images() -> Vec<PathBuf> {
        [
            "shimakaze.png",
            "image1-mandrill.png",
            "image2-uclogo.png",
            "image3-aerial.jpg",
            "image4-thirsk.jpg",
            "image5-pattern.png",
        ]
        .iter()
        .map(|name| Path::new("images").join(name))
        .collect()
    }

    fn default_border_image() -> PathBuf {
        PathBuf::from("images/blood2.png")
    }

    fn default_shader() -> PathBuf {
        PathBuf::from("shaders/quad.wgsl")
    }
}
