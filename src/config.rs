//! Chart configuration.
//!
//! Settings are read from a TOML file (`likeplot.toml` by default). Every
//! field has a default, so an empty file or a partial file is valid.

use crate::curve::Curve;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "likeplot.toml";

/// Largest accepted canvas width or height, in pixels
pub const MAX_CANVAS_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    #[default]
    Svg,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default)]
    pub axis: AxisConfig,
    #[serde(default)]
    pub boxplot: BoxplotConfig,
    #[serde(default)]
    pub barplot: BarplotConfig,
    #[serde(default)]
    pub lineplot: LineplotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::default(),
            background: default_background(),
        }
    }
}

fn default_width() -> u32 { 600 }
fn default_height() -> u32 { 400 }
fn default_background() -> String { "white".to_string() }

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    #[serde(default = "default_margin_top")]
    pub top: f64,
    #[serde(default = "default_margin_right")]
    pub right: f64,
    #[serde(default = "default_margin_bottom")]
    pub bottom: f64,
    #[serde(default = "default_margin_left")]
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: default_margin_top(),
            right: default_margin_right(),
            bottom: default_margin_bottom(),
            left: default_margin_left(),
        }
    }
}

fn default_margin_top() -> f64 { 20.0 }
fn default_margin_right() -> f64 { 30.0 }
fn default_margin_bottom() -> f64 { 40.0 }
fn default_margin_left() -> f64 { 50.0 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_tick_font_size")]
    pub tick_font_size: f64,
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f64,
    #[serde(default = "default_tick_size")]
    pub tick_size: f64,
    #[serde(default = "default_tick_padding")]
    pub tick_padding: f64,
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
    #[serde(default = "default_axis_color")]
    pub color: String,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            tick_font_size: default_tick_font_size(),
            label_font_size: default_label_font_size(),
            tick_size: default_tick_size(),
            tick_padding: default_tick_padding(),
            tick_count: default_tick_count(),
            color: default_axis_color(),
        }
    }
}

fn default_font_family() -> String { "sans-serif".to_string() }
fn default_tick_font_size() -> f64 { 10.0 }
fn default_label_font_size() -> f64 { 12.0 }
fn default_tick_size() -> f64 { 6.0 }
fn default_tick_padding() -> f64 { 3.0 }
fn default_tick_count() -> usize { crate::scale::DEFAULT_TICK_COUNT }
fn default_axis_color() -> String { "black".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxplotConfig {
    #[serde(default = "default_band_padding")]
    pub padding: f64,
    /// Box width as a fraction of the band width
    #[serde(default = "default_box_ratio")]
    pub box_ratio: f64,
    #[serde(default = "default_box_fill")]
    pub fill: String,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_platform_label")]
    pub x_label: String,
    #[serde(default = "default_likes_label")]
    pub y_label: String,
}

impl Default for BoxplotConfig {
    fn default() -> Self {
        Self {
            padding: default_band_padding(),
            box_ratio: default_box_ratio(),
            fill: default_box_fill(),
            stroke: default_stroke(),
            x_label: default_platform_label(),
            y_label: default_likes_label(),
        }
    }
}

fn default_band_padding() -> f64 { 0.2 }
fn default_box_ratio() -> f64 { 0.6 }
fn default_box_fill() -> String { "lightblue".to_string() }
fn default_stroke() -> String { "black".to_string() }
fn default_platform_label() -> String { "Platform".to_string() }
fn default_likes_label() -> String { "Number of Likes".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarplotConfig {
    #[serde(default = "default_band_padding")]
    pub padding: f64,
    /// Padding between post-type bars inside one platform group
    #[serde(default = "default_inner_padding")]
    pub inner_padding: f64,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_true")]
    pub legend: bool,
    #[serde(default = "default_platform_label")]
    pub x_label: String,
    #[serde(default = "default_avg_likes_label")]
    pub y_label: String,
}

impl Default for BarplotConfig {
    fn default() -> Self {
        Self {
            padding: default_band_padding(),
            inner_padding: default_inner_padding(),
            palette: default_palette(),
            legend: true,
            x_label: default_platform_label(),
            y_label: default_avg_likes_label(),
        }
    }
}

fn default_inner_padding() -> f64 { 0.05 }
fn default_palette() -> Vec<String> {
    crate::color::CATEGORY10[..3].iter().map(|c| c.to_string()).collect()
}
fn default_true() -> bool { true }
fn default_avg_likes_label() -> String { "Average Number of Likes".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineplotConfig {
    #[serde(default = "default_line_stroke")]
    pub stroke: String,
    #[serde(default = "default_line_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default = "default_date_label")]
    pub x_label: String,
    #[serde(default = "default_avg_likes_label")]
    pub y_label: String,
}

impl Default for LineplotConfig {
    fn default() -> Self {
        Self {
            stroke: default_line_stroke(),
            stroke_width: default_line_width(),
            curve: Curve::default(),
            x_label: default_date_label(),
            y_label: default_avg_likes_label(),
        }
    }
}

fn default_line_stroke() -> String { crate::color::CATEGORY10[0].to_string() }
fn default_line_width() -> f64 { 2.0 }
fn default_date_label() -> String { "Date".to_string() }

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load an explicit path, else `likeplot.toml` in the working directory
    /// if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, size) in [("canvas.width", self.canvas.width), ("canvas.height", self.canvas.height)] {
            if size > MAX_CANVAS_SIZE {
                anyhow::bail!("{} must be at most {} pixels, got {}", name, MAX_CANVAS_SIZE, size);
            }
        }
        for (name, v) in [
            ("margin.top", self.margin.top),
            ("margin.right", self.margin.right),
            ("margin.bottom", self.margin.bottom),
            ("margin.left", self.margin.left),
            ("axis.tick_size", self.axis.tick_size),
            ("axis.tick_padding", self.axis.tick_padding),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                anyhow::bail!("{} must be a finite non-negative number, got {}", name, v);
            }
        }
        for (name, v) in [
            ("axis.tick_font_size", self.axis.tick_font_size),
            ("axis.label_font_size", self.axis.label_font_size),
            ("lineplot.stroke_width", self.lineplot.stroke_width),
        ] {
            if !(v.is_finite() && v > 0.0) {
                anyhow::bail!("{} must be a finite positive number, got {}", name, v);
            }
        }

        let (plot_w, plot_h) = self.plot_size();
        if !(plot_w > 0.0 && plot_h > 0.0) {
            anyhow::bail!(
                "Canvas {}x{} leaves no room for the plot after margins",
                self.canvas.width,
                self.canvas.height
            );
        }
        for (name, p) in [
            ("boxplot.padding", self.boxplot.padding),
            ("barplot.padding", self.barplot.padding),
            ("barplot.inner_padding", self.barplot.inner_padding),
        ] {
            if !(0.0..1.0).contains(&p) {
                anyhow::bail!("{} must be in [0, 1), got {}", name, p);
            }
        }
        if !(self.boxplot.box_ratio > 0.0 && self.boxplot.box_ratio <= 1.0) {
            anyhow::bail!("boxplot.box_ratio must be in (0, 1], got {}", self.boxplot.box_ratio);
        }
        if self.barplot.palette.is_empty() {
            anyhow::bail!("barplot.palette must contain at least one colour");
        }
        if self.axis.tick_count == 0 {
            anyhow::bail!("axis.tick_count must be positive");
        }
        Ok(())
    }

    /// Plot area size (canvas minus margins)
    pub fn plot_size(&self) -> (f64, f64) {
        (
            self.canvas.width as f64 - self.margin.left - self.margin.right,
            self.canvas.height as f64 - self.margin.top - self.margin.bottom,
        )
    }
}
