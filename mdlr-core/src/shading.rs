//! Flat shading: ambient, diffuse and specular reflection
use nalgebra::Vector3;

use crate::color::Color;

/// Exponent of the specular highlight.
pub const SPECULAR_EXPONENT: i32 = 8;

/// How polygons are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Edges only
    Wireframe,
    /// Lit, filled triangles
    #[default]
    Flat,
}

impl ShadingMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wireframe" => Some(ShadingMode::Wireframe),
            "flat" => Some(ShadingMode::Flat),
            _ => None,
        }
    }
}

/// A directional light.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color: [f64; 3],
    /// Unit vector pointing towards the light
    pub direction: Vector3<f64>,
}

impl Light {
    pub fn new(color: [f64; 3], direction: [f64; 3]) -> Self {
        let direction = Vector3::from(direction);
        let direction = direction.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z);
        Self { color, direction }
    }
}

/// Scene lighting, fixed for a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: [f64; 3],
    pub lights: Vec<Light>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: [50.0, 50.0, 50.0],
            lights: vec![Light::new([255.0; 3], [0.5, 0.75, 1.0])],
        }
    }
}

/// Per-channel reflection constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f64; 3],
    pub diffuse: [f64; 3],
    pub specular: [f64; 3],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.1; 3],
            diffuse: [0.5; 3],
            specular: [0.5; 3],
        }
    }
}

impl Lighting {
    /// Color of a surface with the given (not necessarily unit) normal.
    pub fn shade(&self, normal: &Vector3<f64>, material: &Material) -> Color {
        let view = Vector3::z();
        let mut channels = [0.0; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            *channel = self.ambient[i] * material.ambient[i];
        }

        let Some(normal) = normal.try_normalize(f64::EPSILON) else {
            return Color::from_channels(channels);
        };

        for light in &self.lights {
            let n_dot_l = normal.dot(&light.direction);
            if n_dot_l <= 0.0 {
                continue;
            }
            let reflect = normal * (2.0 * n_dot_l) - light.direction;
            let highlight = reflect.dot(&view).max(0.0).powi(SPECULAR_EXPONENT);
            for (i, channel) in channels.iter_mut().enumerate() {
                *channel += light.color[i] * material.diffuse[i] * n_dot_l;
                *channel += light.color[i] * material.specular[i] * highlight;
            }
        }
        Color::from_channels(channels)
    }
}
