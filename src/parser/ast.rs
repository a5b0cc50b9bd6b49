// Abstract Syntax Tree for the chart recipe DSL

use crate::category::SortDirection;

/// Complete chart recipe
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotSpec {
    pub aesthetics: Option<Aesthetics>,
    pub layers: Vec<Layer>,
    /// Foreground categories; `None` puts every category in the foreground
    pub highlight: Option<Vec<String>>,
    /// Draw order of records by category rank
    pub order: SortDirection,
    pub labels: Option<Labels>,
    pub legend: Legend,
}

/// Principal component on one axis, optionally sign-flipped
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub component: String,
    pub negate: bool,
}

impl Axis {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            negate: false,
        }
    }

    pub fn negated(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            negate: true,
        }
    }

    /// Axis title, e.g. `-PC2`
    pub fn title(&self) -> String {
        if self.negate {
            format!("-{}", self.component)
        } else {
            self.component.clone()
        }
    }
}

/// Positional mappings
#[derive(Debug, Clone, PartialEq)]
pub struct Aesthetics {
    pub x: Axis,
    pub y: Axis,
}

/// Individual visualization layer
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Text(TextLayer),
    Point(PointLayer),
}

impl Layer {
    pub fn subset(&self) -> Subset {
        match self {
            Layer::Text(t) => t.subset,
            Layer::Point(p) => p.subset,
        }
    }
}

/// Which records a layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subset {
    #[default]
    All,
    Background,
    Highlight,
}

/// Field written by a text layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelField {
    #[default]
    Population,
    Individual,
}

/// Text label layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayer {
    pub subset: Subset,
    pub size: Option<f64>,
    pub alpha: Option<f64>,
    pub label: LabelField,
}

/// Shaped point layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointLayer {
    pub subset: Subset,
    pub size: Option<f64>,
    pub stroke: Option<f64>,
    pub alpha: Option<f64>,
}

/// Plot labels (title, axes)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Labels {
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    Right,
    None,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Legend {
    pub position: LegendPosition,
    pub title: Option<String>,
}
