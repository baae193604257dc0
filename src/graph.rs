use crate::color::parse_color;
use crate::config::{OutputFormat, MAX_CANVAS_SIZE};
use crate::ir::{Baseline, DrawCommand, SceneGraph, Stroke, TextAnchor, TextStyle};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, warn};

/// Encode a scene graph in the requested output format
pub fn render(scene: &SceneGraph, format: OutputFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Svg => render_svg(scene)?,
        OutputFormat::Png => render_png(scene)?,
    };
    debug!(?format, bytes = bytes.len(), "Rendered chart");
    Ok(bytes)
}

pub fn render_svg(scene: &SceneGraph) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height))
            .into_drawing_area();
        paint(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

pub fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; rgb_buffer_len(scene.width, scene.height)?];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height))
            .into_drawing_area();
        paint(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Byte length of an RGB pixel buffer, refusing sizes past the canvas limit
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    if width > MAX_CANVAS_SIZE || height > MAX_CANVAS_SIZE {
        anyhow::bail!(
            "Canvas {}x{} exceeds the {} pixel limit per side",
            width,
            height,
            MAX_CANVAS_SIZE
        );
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .with_context(|| format!("Canvas {}x{} is too large to rasterize", width, height))
}

/// Execute every command of the scene, in order, on a drawing area
fn paint<DB>(root: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&resolve_color(&scene.background))
        .context("Failed to fill background")?;

    for command in &scene.commands {
        match command {
            DrawCommand::Line { from, to, stroke } => {
                root.draw(&PathElement::new(vec![px(*from), px(*to)], stroke_style(stroke)))
                    .context("Failed to draw line")?;
            }
            DrawCommand::Rect { x, y, width, height, fill, stroke } => {
                let corners = [px((*x, *y)), px((x + width, y + height))];
                if let Some(fill) = fill {
                    root.draw(&Rectangle::new(corners, resolve_color(fill).filled()))
                        .context("Failed to draw rectangle")?;
                }
                if let Some(stroke) = stroke {
                    root.draw(&Rectangle::new(corners, stroke_style(stroke)))
                        .context("Failed to draw rectangle outline")?;
                }
            }
            DrawCommand::Text { position, content, style } => {
                root.draw(&Text::new(content.as_str(), px(*position), text_style(style)))
                    .context("Failed to draw text")?;
            }
            DrawCommand::Path { points, stroke } => {
                if points.len() < 2 {
                    continue;
                }
                let pixels: Vec<(i32, i32)> = points.iter().copied().map(px).collect();
                root.draw(&PathElement::new(pixels, stroke_style(stroke)))
                    .context("Failed to draw path")?;
            }
        }
    }

    Ok(())
}

fn px(point: (f64, f64)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

/// Unknown colours fall back to black
fn resolve_color(color: &str) -> RGBColor {
    parse_color(color).unwrap_or_else(|| {
        warn!(color, "Unknown colour, using black");
        BLACK
    })
}

fn stroke_style(stroke: &Stroke) -> ShapeStyle {
    let width = (stroke.width.round() as u32).max(1);
    resolve_color(&stroke.color).stroke_width(width)
}

fn text_style(style: &TextStyle) -> plotters::style::TextStyle<'_> {
    let h = match style.anchor {
        TextAnchor::Start => HPos::Left,
        TextAnchor::Middle => HPos::Center,
        TextAnchor::End => HPos::Right,
    };
    let v = match style.baseline {
        Baseline::Top => VPos::Top,
        Baseline::Middle => VPos::Center,
        Baseline::Bottom => VPos::Bottom,
    };
    let text = (style.font_family.as_str(), style.size)
        .into_font()
        .color(&resolve_color(&style.color))
        .pos(Pos::new(h, v));
    if style.vertical {
        text.transform(FontTransform::Rotate270)
    } else {
        text
    }
}
