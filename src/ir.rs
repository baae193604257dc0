//! Scene graph: backend-independent drawing primitives in absolute pixel
//! coordinates (origin top-left, y grows downward).

/// A flat, ordered list of drawing commands for one image.
/// Later commands paint over earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub commands: Vec<DrawCommand>,
}

impl SceneGraph {
    pub fn new(width: u32, height: u32, background: impl Into<String>) -> Self {
        Self {
            width,
            height,
            background: background.into(),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.commands.extend(commands);
    }

    #[cfg(test)]
    pub(crate) fn rects(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Rect { .. }))
    }

    #[cfg(test)]
    pub(crate) fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self { color: color.into(), width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub size: f64,
    pub color: String,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
    /// Rotate -90 degrees (reads bottom-to-top)
    pub vertical: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<String>,
        stroke: Option<Stroke>,
    },
    Text {
        position: (f64, f64),
        content: String,
        style: TextStyle,
    },
    /// Open polyline, never filled
    Path {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
}
