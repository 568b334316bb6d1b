use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// How eraser segments are composited onto the surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EraserMode {
    /// Reset erased pixels to fully transparent so they no longer count as content.
    #[default]
    Clear,
    /// Paint the surface background colour at full opacity.
    PaintBackground,
}

/// Inclusive stroke width bounds applied by [`ToolState::set_stroke_width`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidthRange {
    pub min: u32,
    pub max: u32,
}

impl WidthRange {
    pub fn clamp(self, width: u32) -> u32 {
        let min = self.min.max(1);
        let max = self.max.max(min);
        width.clamp(min, max)
    }
}

impl Default for WidthRange {
    fn default() -> Self {
        Self { min: 1, max: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolState {
    tool: Tool,
    color: Color,
    width: u32,
    range: WidthRange,
    swatches: Vec<Color>,
}

impl ToolState {
    pub fn new(color: Color, width: u32, range: WidthRange, swatches: Vec<Color>) -> Self {
        Self {
            tool: Tool::Pencil,
            color,
            width: range.clamp(width),
            range,
            swatches,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn stroke_width(&self) -> u32 {
        self.width
    }

    pub fn width_range(&self) -> WidthRange {
        self.range
    }

    pub fn swatches(&self) -> &[Color] {
        &self.swatches
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Picking a colour always switches back to the pencil.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.tool = Tool::Pencil;
    }

    /// Returns the width actually applied after clamping.
    pub fn set_stroke_width(&mut self, width: u32) -> u32 {
        self.width = self.range.clamp(width);
        self.width
    }

    pub fn select_swatch(&mut self, index: usize) -> Option<Color> {
        let color = self.swatches.get(index).copied()?;
        self.set_color(color);
        Some(color)
    }
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new(Color::WHITE, 3, WidthRange::default(), Vec::new())
    }
}
