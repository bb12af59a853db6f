//! Rendering settings that stay fixed for a whole run
use std::str::FromStr;

use crate::color::Color;
use crate::geometry::DEFAULT_RESOLUTION;
use crate::shading::ShadingMode;

/// How edge primitives are multiplied by the current coordinate system.
///
/// Polygons always use the transposed top. Existing MDL scripts expect edges
/// to use the top directly, so that stays the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineConvention {
    #[default]
    Direct,
    Transposed,
}

impl FromStr for LineConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(LineConvention::Direct),
            "transposed" => Ok(LineConvention::Transposed),
            other => Err(format!(
                "unknown line convention `{other}`, expected `direct` or `transposed`"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub background: Color,
    /// Color of lines, circles and curves
    pub line_color: Color,
    /// Starting polygon style of every frame
    pub shading: ShadingMode,
    pub line_convention: LineConvention,
    /// Extension of animation frame files
    pub frame_extension: String,
    /// Sphere and torus grid steps
    pub resolution: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            background: Color::BLACK,
            line_color: Color::WHITE,
            shading: ShadingMode::Flat,
            line_convention: LineConvention::Direct,
            frame_extension: "png".to_string(),
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl RenderConfig {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_line_color(mut self, line_color: Color) -> Self {
        self.line_color = line_color;
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_line_convention(mut self, line_convention: LineConvention) -> Self {
        self.line_convention = line_convention;
        self
    }

    /// Leading dots are stripped.
    pub fn with_frame_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.frame_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.background, Color::BLACK);
        assert_eq!(config.line_convention, LineConvention::Direct);
        assert_eq!(config.frame_extension, "png");
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::default()
            .with_size(64, 32)
            .with_frame_extension(".ppm")
            .with_shading(ShadingMode::Wireframe);
        assert_eq!((config.width, config.height), (64, 32));
        assert_eq!(config.frame_extension, "ppm");
        assert_eq!(config.shading, ShadingMode::Wireframe);
    }

    #[test]
    fn test_line_convention_names() {
        assert_eq!("direct".parse(), Ok(LineConvention::Direct));
        assert_eq!("transposed".parse(), Ok(LineConvention::Transposed));
        assert!("sideways".parse::<LineConvention>().is_err());
    }
}
