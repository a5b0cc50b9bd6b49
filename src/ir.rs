use crate::graph::{LabelStyle, MarkerStyle};
use crate::palette::Marker;
use plotters::style::RGBColor;

// =============================================================================
// Scaling
// =============================================================================

/// Continuous axis scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub domain: (f64, f64), // Padded data min/max
}

// =============================================================================
// Compilation (Scene Graph)
// =============================================================================

/// A list of primitive drawing commands plus chart furniture.
/// The backend executes these in order.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub commands: Vec<DrawCommand>,
    pub legend: Option<LegendScene>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawLabel {
        position: (f64, f64),
        text: String,
        style: LabelStyle,
    },
    DrawMarker {
        position: (f64, f64),
        style: MarkerStyle,
    },
}

impl DrawCommand {
    pub fn position(&self) -> (f64, f64) {
        match self {
            DrawCommand::DrawLabel { position, .. } | DrawCommand::DrawMarker { position, .. } => {
                *position
            }
        }
    }
}

/// One consolidated legend keyed by category
#[derive(Debug, Clone, PartialEq)]
pub struct LegendScene {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub key: LegendKey,
}

/// Glyph drawn beside a legend label
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendKey {
    /// Category drawn only as text
    Text,
    Marker(Marker),
}
