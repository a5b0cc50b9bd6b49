use crate::category::{OrderedTable, Ranked};
use crate::error::{Attribute, Error};
use crate::graph::{LabelStyle, MarkerStyle};
use crate::ir::{DrawCommand, LegendEntry, LegendKey, LegendScene, SceneGraph};
use crate::join::JoinedRecord;
use crate::palette::{parse_color, Marker};
use crate::parser::ast::{Aesthetics, Axis, LabelField, Layer, LegendPosition, PlotSpec, Subset};
use crate::runtime::PreparedData;
use crate::scale::build_scale;
use crate::transform::{flip_sign, partition};
use crate::RenderOptions;
use anyhow::{anyhow, Result};
use plotters::style::RGBColor;
use std::borrow::Cow;
use std::collections::HashMap;

const DEFAULT_TEXT_SIZE: f64 = 11.0;
const DEFAULT_POINT_SIZE: f64 = 4.0;
const DEFAULT_STROKE: f64 = 1.0;
const DEFAULT_LEGEND_TITLE: &str = "Population";

/// Compile a recipe over prepared data into a scene graph
pub fn compile_scene(spec: &PlotSpec, data: &PreparedData, options: &RenderOptions) -> Result<SceneGraph> {
    let aes = spec.aesthetics.clone().unwrap_or_else(|| Aesthetics {
        x: Axis::new("PC1"),
        y: Axis::new("PC2"),
    });
    let xi = resolve_component(&aes.x, data)?;
    let yi = resolve_component(&aes.y, data)?;

    // Flip each axis on its own copy so x: PC1, y: -PC1 stays consistent
    let x_table = oriented(&data.table, &aes.x, xi);
    let y_table = oriented(&data.table, &aes.y, yi);
    let points: Vec<(f64, f64)> = x_table
        .records
        .iter()
        .zip(&y_table.records)
        .map(|(rx, ry)| (rx.record.observation.coords[xi], ry.record.observation.coords[yi]))
        .collect();

    let x_scale = build_scale(points.iter().map(|p| p.0));
    let y_scale = build_scale(points.iter().map(|p| p.1));

    let arranged = data.table.arrange(spec.order);
    let parts = partition(arranged.iter().copied(), spec.highlight.as_deref());

    let mut resolver = StyleResolver::new(data);
    let mut commands = Vec::new();
    // Point keys win over text keys for the same category
    let mut drawn: HashMap<String, LegendKey> = HashMap::new();
    let mut skipped = 0usize;

    for layer in &spec.layers {
        let records: &[&Ranked<JoinedRecord>] = match layer.subset() {
            Subset::All => &arranged,
            Subset::Background => parts.side(false),
            Subset::Highlight => parts.side(true),
        };

        for ranked in records {
            let position = points[ranked.position];
            if !(position.0.is_finite() && position.1.is_finite()) {
                skipped += 1;
                continue;
            }
            let observation = &ranked.record.observation;
            let category = observation.population.as_str();
            let color = resolver.color(category)?;

            let command = match layer {
                Layer::Text(text) => DrawCommand::DrawLabel {
                    position,
                    text: match text.label {
                        LabelField::Population => observation.population.clone(),
                        LabelField::Individual => observation.individual.clone(),
                    },
                    style: LabelStyle {
                        color,
                        size: text.size.unwrap_or(DEFAULT_TEXT_SIZE),
                        alpha: text.alpha.unwrap_or(1.0),
                    },
                },
                Layer::Point(point) => {
                    let marker = resolver.marker(category)?;
                    drawn.insert(category.to_string(), LegendKey::Marker(marker));
                    DrawCommand::DrawMarker {
                        position,
                        style: MarkerStyle {
                            color,
                            marker,
                            size: point.size.unwrap_or(DEFAULT_POINT_SIZE),
                            stroke: point.stroke.unwrap_or(DEFAULT_STROKE),
                            alpha: point.alpha.unwrap_or(1.0),
                        },
                    }
                }
            };
            if matches!(layer, Layer::Text(_)) {
                drawn.entry(category.to_string()).or_insert(LegendKey::Text);
            }
            commands.push(command);
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped draws with missing coordinates");
    }

    let legend = match spec.legend.position {
        LegendPosition::None => None,
        LegendPosition::Right => {
            Some(build_legend(spec, &data.table, &drawn, &mut resolver)?)
        }
    };

    let labels = spec.labels.clone().unwrap_or_default();

    Ok(SceneGraph {
        width: options.width,
        height: options.height,
        title: labels.title,
        x_label: labels.x.unwrap_or_else(|| aes.x.title()),
        y_label: labels.y.unwrap_or_else(|| aes.y.title()),
        x_scale,
        y_scale,
        commands,
        legend,
    })
}

fn resolve_component(axis: &Axis, data: &PreparedData) -> Result<usize> {
    data.component_index(&axis.component).ok_or_else(|| {
        anyhow!(
            "Unknown component '{}' (available: {})",
            axis.component,
            data.components.join(", ")
        )
    })
}

fn oriented<'a>(table: &'a OrderedTable, axis: &Axis, component: usize) -> Cow<'a, OrderedTable> {
    if axis.negate {
        Cow::Owned(flip_sign(table, component))
    } else {
        Cow::Borrowed(table)
    }
}

/// One legend entry per drawn category, highlighted categories first
fn build_legend(
    spec: &PlotSpec,
    table: &OrderedTable,
    drawn: &HashMap<String, LegendKey>,
    resolver: &mut StyleResolver,
) -> Result<LegendScene> {
    let order = match &spec.highlight {
        Some(front) => {
            let front: Vec<&str> = front.iter().map(String::as_str).collect();
            table.order.relevel(&front)
        }
        None => table.order.clone(),
    };

    let mut entries = Vec::new();
    for level in order.levels() {
        if let Some(key) = drawn.get(level) {
            entries.push(LegendEntry {
                label: level.clone(),
                color: resolver.color(level)?,
                key: *key,
            });
        }
    }

    Ok(LegendScene {
        title: spec
            .legend
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_LEGEND_TITLE.to_string()),
        entries,
    })
}

/// Resolves and caches per-category color and marker tokens
struct StyleResolver<'a> {
    data: &'a PreparedData,
    colors: HashMap<String, RGBColor>,
    markers: HashMap<String, Marker>,
}

impl<'a> StyleResolver<'a> {
    fn new(data: &'a PreparedData) -> Self {
        Self {
            data,
            colors: HashMap::new(),
            markers: HashMap::new(),
        }
    }

    fn color(&mut self, category: &str) -> Result<RGBColor> {
        if let Some(color) = self.colors.get(category) {
            return Ok(*color);
        }
        let token = self.data.colors.require(category, Attribute::Color)?;
        let color = parse_color(token).ok_or_else(|| Error::InvalidAesthetic {
            category: category.to_string(),
            attribute: Attribute::Color,
            token: token.clone(),
        })?;
        self.colors.insert(category.to_string(), color);
        Ok(color)
    }

    fn marker(&mut self, category: &str) -> Result<Marker> {
        if let Some(marker) = self.markers.get(category) {
            return Ok(*marker);
        }
        let code = *self.data.shapes.require(category, Attribute::Shape)?;
        let marker = Marker::from_pch(code).ok_or_else(|| Error::InvalidAesthetic {
            category: category.to_string(),
            attribute: Attribute::Shape,
            token: code.to_string(),
        })?;
        self.markers.insert(category.to_string(), marker);
        Ok(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::MarkerShape;
    use crate::parser::parse_recipe;
    use crate::runtime::prepare;
    use crate::runtime::tests::{observation, observation_set, sample_data, style};

    fn compile(recipe: &str, data: &PreparedData) -> Result<SceneGraph> {
        compile_scene(&parse_recipe(recipe).unwrap(), data, &RenderOptions::default())
    }

    fn label_texts(scene: &SceneGraph) -> Vec<String> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawLabel { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_compile_background_text_foreground_points() {
        let data = sample_data();
        let scene = compile(
            r#"aes(x: PC1, y: PC2)
               | text(subset: "background", alpha: 0.3)
               | point(subset: "highlight", size: 5)
               | highlight("French")"#,
            &data,
        )
        .unwrap();

        assert_eq!(label_texts(&scene), vec!["Sardinian", "Sardinian", "Han"]);
        match scene.commands.last().unwrap() {
            DrawCommand::DrawMarker { position, style } => {
                assert_eq!(*position, (0.05, -0.10));
                assert_eq!(style.color, RGBColor(34, 151, 230));
                assert_eq!(style.marker.shape, MarkerShape::TriangleUp);
                assert!(style.marker.filled);
                assert_eq!(style.size, 5.0);
            }
            other => panic!("expected marker, got {other:?}"),
        }
        match &scene.commands[0] {
            DrawCommand::DrawLabel { text, style, .. } => {
                assert_eq!(text, "Sardinian");
                assert_eq!(style.alpha, 0.3);
                assert_eq!(style.color, RGBColor(255, 0, 0));
            }
            other => panic!("expected label, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_descending_order_draws_first_seen_last() {
        let data = sample_data();
        let scene = compile("text(label: \"individual\") | order(desc)", &data).unwrap();
        assert_eq!(label_texts(&scene), vec!["h1", "f1", "s1", "s2"]);
    }

    #[test]
    fn test_compile_sign_flip_and_titles() {
        let data = sample_data();
        let scene = compile("aes(x: PC1, y: -PC2) | point()", &data).unwrap();
        assert_eq!(scene.commands[0].position(), (0.10, 0.20));
        assert_eq!(scene.x_label, "PC1");
        assert_eq!(scene.y_label, "-PC2");
        // Domain follows the flipped values
        assert!(scene.y_scale.domain.1 > 0.22);
        assert!(scene.y_scale.domain.0 < -0.40);
    }

    #[test]
    fn test_compile_same_component_both_axes() {
        let data = sample_data();
        let scene = compile("aes(x: PC1, y: -PC1) | point()", &data).unwrap();
        assert_eq!(scene.commands[0].position(), (0.10, -0.10));
    }

    #[test]
    fn test_compile_labels_override_axis_titles() {
        let data = sample_data();
        let scene = compile(r#"point() | labs(title: "PCA", x: "PC1 (4%)")"#, &data).unwrap();
        assert_eq!(scene.title, Some("PCA".to_string()));
        assert_eq!(scene.x_label, "PC1 (4%)");
        assert_eq!(scene.y_label, "PC2");
    }

    #[test]
    fn test_compile_unknown_component() {
        let data = sample_data();
        let err = compile("aes(x: PC1, y: PC7) | point()", &data).unwrap_err();
        assert!(err.to_string().contains("Unknown component 'PC7'"));
    }

    #[test]
    fn test_compile_missing_aesthetic() {
        let obs = observation_set(vec![
            observation("p1", "Papuan", 0.0, 0.0),
            observation("h1", "Han", 1.0, 1.0),
        ]);
        let data = prepare(obs, &[style("Han", "red", 1)], false).unwrap();

        let err = compile("point()", &data).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::MissingAesthetic { category, attribute }) => {
                assert_eq!(category, "Papuan");
                assert_eq!(*attribute, Attribute::Color);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Drawing only the styled population is fine
        assert!(compile("point(subset: \"highlight\") | highlight(Han)", &data).is_ok());
    }

    #[test]
    fn test_compile_invalid_tokens() {
        let obs = observation_set(vec![observation("h1", "Han", 1.0, 1.0)]);

        let data = prepare(obs.clone(), &[style("Han", "not-a-color", 1)], true).unwrap();
        let err = compile("point()", &data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidAesthetic { attribute: Attribute::Color, .. })
        ));

        let data = prepare(obs, &[style("Han", "red", 99)], true).unwrap();
        let err = compile("point()", &data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidAesthetic { attribute: Attribute::Shape, .. })
        ));
        // Text layers never need a shape
        assert!(compile("text()", &data).is_ok());
    }

    #[test]
    fn test_compile_skips_missing_coordinates() {
        let obs = observation_set(vec![
            observation("h1", "Han", f64::NAN, 1.0),
            observation("h2", "Han", 0.5, 1.0),
        ]);
        let data = prepare(obs, &[style("Han", "red", 1)], true).unwrap();
        let scene = compile("point()", &data).unwrap();
        assert_eq!(scene.commands.len(), 1);
    }

    #[test]
    fn test_legend_highlight_first_with_keys() {
        let data = sample_data();
        let scene = compile(
            r#"text(subset: "background") | point(subset: "highlight") | highlight(Han, French)"#,
            &data,
        )
        .unwrap();
        let legend = scene.legend.unwrap();
        assert_eq!(legend.title, "Population");

        let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Han", "French", "Sardinian"]);
        assert!(matches!(legend.entries[0].key, LegendKey::Marker(_)));
        assert_eq!(legend.entries[2].key, LegendKey::Text);
        assert_eq!(legend.entries[2].color, RGBColor(255, 0, 0));
    }

    #[test]
    fn test_legend_rank_order_and_hidden() {
        let data = sample_data();
        let scene = compile(r#"point() | legend(title: "Group")"#, &data).unwrap();
        let legend = scene.legend.unwrap();
        assert_eq!(legend.title, "Group");
        let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Sardinian", "French", "Han"]);

        let scene = compile(r#"point() | legend(position: "none")"#, &data).unwrap();
        assert!(scene.legend.is_none());
    }
}
