use anyhow::{Context, Result};
use crate::aggregate;
use crate::config::Config;
use crate::data::Dataset;
use crate::ir::{Baseline, DrawCommand, SceneGraph, Stroke, TextAnchor, TextStyle};
use crate::scale::{BandScale, LinearScale, OrdinalScale, TimeScale};
use tracing::debug;

const AXIS_STROKE_WIDTH: f64 = 1.0;
const LEGEND_OFFSET: f64 = 150.0;
const LEGEND_SWATCH: f64 = 15.0;
const LEGEND_ROW_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartKind {
    Boxplot,
    Bar,
    Line,
}

/// Plot-area geometry shared by all charts: margins, inner size, and the
/// likes axis scale.
struct Frame<'a> {
    config: &'a Config,
    width: f64,
    height: f64,
    y: LinearScale,
}

impl<'a> Frame<'a> {
    fn new(dataset: &Dataset, config: &'a Config) -> Result<Self> {
        let max_likes = dataset
            .max_likes()
            .context("Dataset must contain at least one data row")?;
        let (width, height) = config.plot_size();
        // An all-zero dataset still gets a unit domain
        let y_max = (max_likes as f64).max(1.0);
        let y = LinearScale::new((0.0, y_max), (height, 0.0)).nice(config.axis.tick_count);
        Ok(Self { config, width, height, y })
    }

    fn scene(&self) -> SceneGraph {
        SceneGraph::new(
            self.config.canvas.width,
            self.config.canvas.height,
            self.config.canvas.background.clone(),
        )
    }

    /// Plot-area coordinates to canvas coordinates
    fn at(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.config.margin.left, y + self.config.margin.top)
    }

    fn axis_stroke(&self) -> Stroke {
        Stroke::new(self.config.axis.color.clone(), AXIS_STROKE_WIDTH)
    }

    fn text_style(&self, size: f64, anchor: TextAnchor, baseline: Baseline) -> TextStyle {
        TextStyle {
            font_family: self.config.axis.font_family.clone(),
            size,
            color: self.config.axis.color.clone(),
            anchor,
            baseline,
            vertical: false,
        }
    }

    fn line(&self, from: (f64, f64), to: (f64, f64)) -> DrawCommand {
        DrawCommand::Line {
            from: self.at(from.0, from.1),
            to: self.at(to.0, to.1),
            stroke: self.axis_stroke(),
        }
    }

    /// Horizontal axis along the bottom of the plot area
    fn axis_bottom(&self, ticks: Vec<(f64, String)>) -> Vec<DrawCommand> {
        let axis = &self.config.axis;
        let h = self.height;
        let mut out = vec![
            self.line((0.0, h + axis.tick_size), (0.0, h)),
            self.line((0.0, h), (self.width, h)),
            self.line((self.width, h), (self.width, h + axis.tick_size)),
        ];
        for (x, label) in ticks {
            out.push(self.line((x, h), (x, h + axis.tick_size)));
            out.push(DrawCommand::Text {
                position: self.at(x, h + axis.tick_size + axis.tick_padding),
                content: label,
                style: self.text_style(axis.tick_font_size, TextAnchor::Middle, Baseline::Top),
            });
        }
        out
    }

    /// Vertical likes axis along the left of the plot area
    fn axis_left(&self) -> Vec<DrawCommand> {
        let axis = &self.config.axis;
        let (y0, y1) = self.y.range;
        let mut out = vec![
            self.line((-axis.tick_size, y0), (0.0, y0)),
            self.line((0.0, y0), (0.0, y1)),
            self.line((0.0, y1), (-axis.tick_size, y1)),
        ];
        for (value, label) in self.y.tick_labels(axis.tick_count) {
            let y = self.y.apply(value);
            out.push(self.line((-axis.tick_size, y), (0.0, y)));
            out.push(DrawCommand::Text {
                position: self.at(-(axis.tick_size + axis.tick_padding), y),
                content: label,
                style: self.text_style(axis.tick_font_size, TextAnchor::End, Baseline::Middle),
            });
        }
        out
    }

    fn axis_labels(&self, x_label: &str, y_label: &str) -> Vec<DrawCommand> {
        let margin = &self.config.margin;
        let size = self.config.axis.label_font_size;
        let mut y_style = self.text_style(size, TextAnchor::Middle, Baseline::Middle);
        y_style.vertical = true;
        vec![
            DrawCommand::Text {
                position: self.at(self.width / 2.0, self.height + margin.bottom - 10.0),
                content: x_label.to_string(),
                style: self.text_style(size, TextAnchor::Middle, Baseline::Bottom),
            },
            DrawCommand::Text {
                position: self.at(-margin.left + 10.0, self.height / 2.0),
                content: y_label.to_string(),
                style: y_style,
            },
        ]
    }

    fn platform_scale(&self, dataset: &Dataset, padding: f64) -> BandScale {
        BandScale::new(dataset.platforms(), (0.0, self.width)).padding(padding)
    }
}

pub fn compile(kind: ChartKind, dataset: &Dataset, config: &Config) -> Result<SceneGraph> {
    let scene = match kind {
        ChartKind::Boxplot => compile_boxplot(dataset, config)?,
        ChartKind::Bar => compile_barplot(dataset, config)?,
        ChartKind::Line => compile_lineplot(dataset, config)?,
    };
    debug!(chart = ?kind, commands = scene.commands.len(), "Compiled scene");
    Ok(scene)
}

/// Box-and-whisker plot of likes per platform
pub fn compile_boxplot(dataset: &Dataset, config: &Config) -> Result<SceneGraph> {
    let frame = Frame::new(dataset, config)?;
    let style = &config.boxplot;
    let x = frame.platform_scale(dataset, style.padding);
    let stats = aggregate::quartiles_by_platform(dataset.records())?;

    let mut scene = frame.scene();
    scene.extend(frame.axis_bottom(x.tick_positions()));
    scene.extend(frame.axis_left());
    scene.extend(frame.axis_labels(&style.x_label, &style.y_label));

    let box_width = x.bandwidth() * style.box_ratio;
    let stroke = Stroke::new(style.stroke.clone(), 1.0);
    for entry in stats {
        let band_x = match x.position(&entry.platform) {
            Some(p) => p,
            None => continue,
        };
        let left = band_x + (x.bandwidth() - box_width) / 2.0;
        let center = left + box_width / 2.0;
        let q = entry.quartiles;

        // Whisker first so the box paints over its middle section
        scene.push(DrawCommand::Line {
            from: frame.at(center, frame.y.apply(q.min)),
            to: frame.at(center, frame.y.apply(q.max)),
            stroke: stroke.clone(),
        });

        let top = frame.y.apply(q.q3);
        let (rx, ry) = frame.at(left, top);
        scene.push(DrawCommand::Rect {
            x: rx,
            y: ry,
            width: box_width,
            height: frame.y.apply(q.q1) - top,
            fill: Some(style.fill.clone()),
            stroke: Some(stroke.clone()),
        });

        let median = frame.y.apply(q.median);
        scene.push(DrawCommand::Line {
            from: frame.at(left, median),
            to: frame.at(left + box_width, median),
            stroke: stroke.clone(),
        });
    }

    Ok(scene)
}

/// Side-by-side bars of average likes per platform and post type
pub fn compile_barplot(dataset: &Dataset, config: &Config) -> Result<SceneGraph> {
    let frame = Frame::new(dataset, config)?;
    let style = &config.barplot;
    let x0 = frame.platform_scale(dataset, style.padding);
    let post_types = dataset.post_types();
    let x1 = BandScale::new(post_types.clone(), (0.0, x0.bandwidth())).padding(style.inner_padding);
    let color = OrdinalScale::new(post_types.clone(), style.palette.clone());
    let averages = aggregate::average_by_platform_post_type(dataset.records());

    let mut scene = frame.scene();
    scene.extend(frame.axis_bottom(x0.tick_positions()));
    scene.extend(frame.axis_left());
    scene.extend(frame.axis_labels(&style.x_label, &style.y_label));

    for avg in &averages {
        let (Some(group_x), Some(bar_x)) = (x0.position(&avg.platform), x1.position(&avg.post_type))
        else {
            continue;
        };
        let top = frame.y.apply(avg.avg_likes);
        let (rx, ry) = frame.at(group_x + bar_x, top);
        scene.push(DrawCommand::Rect {
            x: rx,
            y: ry,
            width: x1.bandwidth(),
            height: frame.height - top,
            fill: color.apply(&avg.post_type).cloned(),
            stroke: None,
        });
    }

    if style.legend {
        let origin_x = frame.width - LEGEND_OFFSET;
        let origin_y = config.margin.top;
        for (i, post_type) in post_types.iter().enumerate() {
            let row_y = origin_y + i as f64 * LEGEND_ROW_HEIGHT;
            let (rx, ry) = frame.at(origin_x, row_y);
            scene.push(DrawCommand::Rect {
                x: rx,
                y: ry,
                width: LEGEND_SWATCH,
                height: LEGEND_SWATCH,
                fill: color.apply(post_type).cloned(),
                stroke: None,
            });
            scene.push(DrawCommand::Text {
                position: frame.at(origin_x + 20.0, row_y + 12.0),
                content: post_type.clone(),
                style: frame.text_style(config.axis.label_font_size, TextAnchor::Start, Baseline::Middle),
            });
        }
    }

    Ok(scene)
}

/// Trend of average likes per day
pub fn compile_lineplot(dataset: &Dataset, config: &Config) -> Result<SceneGraph> {
    let frame = Frame::new(dataset, config)?;
    let style = &config.lineplot;
    let extent = dataset
        .date_extent()
        .context("Dataset must contain at least one data row")?;
    let x = TimeScale::new(extent, (0.0, frame.width));
    let averages = aggregate::average_by_date(dataset.records());

    let mut scene = frame.scene();
    scene.extend(frame.axis_bottom(x.tick_labels(config.axis.tick_count)));
    scene.extend(frame.axis_left());
    scene.extend(frame.axis_labels(&style.x_label, &style.y_label));

    let knots: Vec<(f64, f64)> = averages
        .iter()
        .map(|d| frame.at(x.apply(d.date), frame.y.apply(d.avg_likes)))
        .collect();
    scene.push(DrawCommand::Path {
        points: style.curve.interpolate(&knots),
        stroke: Stroke::new(style.stroke.clone(), style.stroke_width),
    });

    Ok(scene)
}
