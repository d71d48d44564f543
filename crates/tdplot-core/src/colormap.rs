//! Colormaps for density images and stop maps
//!
//! Provides the perceptually uniform sequential maps used by the figures
//! (viridis, plasma), a "bad" color for missing cells, and
//! [`ScalarMappable`], which pairs a [`Normalize`] with a colormap.
//!
//! All colormaps support interpolation and can be reversed.

use plotters::style::RGBAColor;
use serde::{Deserialize, Serialize};

/// A color in RGBA format (0.0 to 1.0)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    /// Create a new color
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from 8-bit channels scaled by 1/256
    pub fn from_rgb256(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(r as f32 / 256.0, g as f32 / 256.0, b as f32 / 256.0, a)
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }

    /// 8-bit RGB channels
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Convert to a plotters color
    pub fn to_plotters(&self) -> RGBAColor {
        let [r, g, b] = self.to_rgb8();
        RGBAColor(r, g, b, self.a.clamp(0.0, 1.0) as f64)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }
}

/// A colormap for mapping scalar values to colors
#[derive(Clone, Debug)]
pub struct Colormap {
    /// Name of the colormap
    pub name: String,
    /// Color stops (positions from 0.0 to 1.0)
    stops: Vec<(f32, Color)>,
    /// Whether the colormap is reversed
    reversed: bool,
    /// Color for missing values
    bad: Color,
}

impl Colormap {
    /// Create a new colormap from a list of colors (evenly spaced)
    pub fn from_colors(name: impl Into<String>, colors: Vec<Color>) -> Self {
        let n = colors.len();
        let stops: Vec<(f32, Color)> = colors
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as f32 / (n - 1).max(1) as f32, c))
            .collect();

        Self {
            name: name.into(),
            stops,
            reversed: false,
            bad: Color::WHITE,
        }
    }

    /// Reverse the colormap
    pub fn reversed(mut self) -> Self {
        self.reversed = !self.reversed;
        if self.reversed {
            self.name = format!("{}_r", self.name);
        } else if let Some(base) = self.name.strip_suffix("_r") {
            self.name = base.to_string();
        }
        self
    }

    /// Set the color used for missing values
    pub fn with_bad(mut self, color: Color) -> Self {
        self.bad = color;
        self
    }

    /// Color used for missing values
    pub fn bad(&self) -> Color {
        self.bad
    }

    /// Sample the colormap at a position (0.0 to 1.0); NaN gives the bad color
    pub fn sample(&self, t: f64) -> Color {
        if t.is_nan() {
            return self.bad;
        }
        let mut t = t.clamp(0.0, 1.0) as f32;
        if self.reversed {
            t = 1.0 - t;
        }

        if self.stops.is_empty() {
            return Color::default();
        }

        if self.stops.len() == 1 {
            return self.stops[0].1;
        }

        // Find the two stops to interpolate between
        for pair in self.stops.windows(2) {
            let (t0, c0) = &pair[0];
            let (t1, c1) = &pair[1];

            if t >= *t0 && t <= *t1 {
                let local_t = (t - t0) / (t1 - t0);
                return Color::lerp(c0, c1, local_t);
            }
        }

        self.stops.last().map(|(_, c)| *c).unwrap_or_default()
    }

    /// Sample a missing-aware value
    pub fn sample_opt(&self, t: Option<f64>) -> Color {
        t.map_or(self.bad, |t| self.sample(t))
    }
}

// MARK: - Built-in Colormaps

/// Get the viridis colormap (perceptually uniform, colorblind-safe)
pub fn viridis() -> Colormap {
    Colormap::from_colors(
        "viridis",
        vec![
            Color::rgb(0.267, 0.005, 0.329),
            Color::rgb(0.282, 0.141, 0.458),
            Color::rgb(0.254, 0.265, 0.530),
            Color::rgb(0.207, 0.372, 0.553),
            Color::rgb(0.164, 0.471, 0.558),
            Color::rgb(0.128, 0.567, 0.551),
            Color::rgb(0.135, 0.659, 0.518),
            Color::rgb(0.267, 0.749, 0.441),
            Color::rgb(0.478, 0.821, 0.318),
            Color::rgb(0.741, 0.873, 0.150),
            Color::rgb(0.993, 0.906, 0.144),
        ],
    )
}

/// Get the plasma colormap
pub fn plasma() -> Colormap {
    Colormap::from_colors(
        "plasma",
        vec![
            Color::rgb(0.050, 0.030, 0.528),
            Color::rgb(0.294, 0.012, 0.615),
            Color::rgb(0.494, 0.012, 0.658),
            Color::rgb(0.665, 0.138, 0.614),
            Color::rgb(0.798, 0.280, 0.470),
            Color::rgb(0.898, 0.396, 0.304),
            Color::rgb(0.973, 0.558, 0.154),
            Color::rgb(0.992, 0.748, 0.159),
            Color::rgb(0.940, 0.975, 0.131),
        ],
    )
}

/// Linear map from `[vmin, vmax]` onto `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Normalized position; not clipped, NaN stays NaN
    pub fn apply(&self, value: f64) -> f64 {
        if self.vmax > self.vmin {
            (value - self.vmin) / (self.vmax - self.vmin)
        } else {
            0.0
        }
    }
}

/// A norm paired with a colormap
#[derive(Clone, Debug)]
pub struct ScalarMappable {
    pub norm: Normalize,
    pub cmap: Colormap,
}

impl ScalarMappable {
    pub fn new(norm: Normalize, cmap: Colormap) -> Self {
        Self { norm, cmap }
    }

    /// Color for `value`: NaN gives the bad color, out-of-range values clamp
    pub fn to_rgba(&self, value: f64) -> Color {
        self.cmap.sample(self.norm.apply(value))
    }
}
