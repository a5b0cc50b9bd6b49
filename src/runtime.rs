use crate::category::{assign_order, OrderedTable};
use crate::compiler::compile_scene;
use crate::config::PipelineConfig;
use crate::data::{CategoryStyle, ObservationSet};
use crate::error;
use crate::graph::render_scene;
use crate::join::{check_keys, join};
use crate::lookup::{color_lookup, shape_lookup, AestheticLookup};
use crate::parser::parse_recipe;
use crate::preprocessor::expand_variables;
use crate::RenderOptions;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Joined, ordered data with its style lookups, shared by every chart of a run
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub table: OrderedTable,
    pub colors: AestheticLookup<String>,
    pub shapes: AestheticLookup<u8>,
    /// Principal component names in component-number order
    pub components: Vec<String>,
}

impl PreparedData {
    /// Case-insensitive component lookup
    pub fn component_index(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Join, order and derive lookups
///
/// A key mismatch between the tables fails only when `strict` is set.
pub fn prepare(
    observations: ObservationSet,
    styles: &[CategoryStyle],
    strict: bool,
) -> error::Result<PreparedData> {
    let coverage = check_keys(&observations.observations, styles);
    if !coverage.is_complete() {
        if strict {
            coverage.into_result()?;
        } else {
            tracing::warn!(
                unmatched = ?coverage.unmatched,
                unused = ?coverage.unused,
                "population sets differ between observations and styles"
            );
        }
    }

    let joined = join(&observations.observations, styles);
    let table = assign_order(joined);
    let colors = color_lookup(table.records.iter().map(|r| &r.record));
    let shapes = shape_lookup(table.records.iter().map(|r| &r.record));

    tracing::info!(
        records = table.len(),
        populations = table.order.len(),
        "prepared joined table"
    );

    Ok(PreparedData {
        table,
        colors,
        shapes,
        components: observations.components,
    })
}

/// Load both input tables named in the config and prepare them
pub fn load_data(config: &PipelineConfig) -> Result<PreparedData> {
    let observations_path = config
        .observations
        .as_ref()
        .ok_or_else(|| anyhow!("No observations file given"))?;
    let styles_path = config
        .styles
        .as_ref()
        .ok_or_else(|| anyhow!("No styles file given"))?;

    let observations = ObservationSet::load(observations_path, config.delimiter, &config.schema)?;
    let styles = CategoryStyle::load(styles_path, config.delimiter, &config.schema)?;

    prepare(observations, &styles, config.strict_join).context("Failed to prepare data")
}

/// Expand, parse, compile and draw one recipe
pub fn render_plot(
    recipe: &str,
    variables: &HashMap<String, String>,
    data: &PreparedData,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let recipe = expand_variables(recipe, variables)?;
    let spec = parse_recipe(&recipe)?;
    let scene = compile_scene(&spec, data, options)?;
    tracing::debug!(commands = scene.commands.len(), "compiled scene");
    render_scene(&scene, &options.format)
}

/// Run every chart in the config; returns the number of files written
pub fn run(config: &PipelineConfig) -> Result<usize> {
    if config.charts.is_empty() {
        anyhow::bail!("No charts to render");
    }

    let data = load_data(config)?;

    for chart in &config.charts {
        let options = chart.render_options(&config.render);
        let bytes = render_plot(&chart.recipe, &config.variables, &data, options)
            .with_context(|| format!("Failed to render '{}'", chart.output.display()))?;
        write_output(&chart.output, &bytes)?;
        tracing::info!(path = %chart.output.display(), bytes = bytes.len(), "wrote chart");
    }

    Ok(config.charts.len())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory '{}'", dir.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::Observation;
    use crate::error::Error;
    use crate::OutputFormat;

    pub(crate) fn observation(id: &str, pop: &str, pc1: f64, pc2: f64) -> Observation {
        Observation {
            individual: id.to_string(),
            coords: vec![pc1, pc2],
            population: pop.to_string(),
        }
    }

    pub(crate) fn style(pop: &str, color: &str, shape: u8) -> CategoryStyle {
        CategoryStyle {
            population: pop.to_string(),
            color: color.to_string(),
            shape,
        }
    }

    pub(crate) fn observation_set(observations: Vec<Observation>) -> ObservationSet {
        ObservationSet {
            components: vec!["PC1".to_string(), "PC2".to_string()],
            observations,
        }
    }

    /// Three populations; Sardinian is first seen, Papuan has no style row
    pub(crate) fn sample_data() -> PreparedData {
        let obs = observation_set(vec![
            observation("s1", "Sardinian", 0.10, -0.20),
            observation("f1", "French", 0.05, -0.10),
            observation("s2", "Sardinian", 0.12, -0.22),
            observation("h1", "Han", -0.30, 0.40),
        ]);
        let styles = vec![
            style("Sardinian", "red", 16),
            style("French", "#2297E6", 17),
            style("Han", "4", 1),
        ];
        prepare(obs, &styles, true).unwrap()
    }

    #[test]
    fn test_prepare_orders_and_maps() {
        let data = sample_data();
        assert_eq!(data.table.order.levels(), &["Sardinian", "French", "Han"]);
        assert_eq!(data.colors.get("French"), Some(&"#2297E6".to_string()));
        assert_eq!(data.shapes.get("Han"), Some(&1));
        assert_eq!(data.component_index("pc2"), Some(1));
    }

    #[test]
    fn test_prepare_strict_mismatch() {
        let obs = observation_set(vec![observation("p1", "Papuan", 0.0, 0.0)]);
        let styles = vec![style("Han", "red", 1)];
        let err = prepare(obs, &styles, true).unwrap_err();
        match err {
            Error::JoinKeyMismatch { unmatched, unused } => {
                assert_eq!(unmatched, vec!["Papuan"]);
                assert_eq!(unused, vec!["Han"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prepare_lenient_mismatch() {
        let obs = observation_set(vec![
            observation("p1", "Papuan", 0.0, 0.0),
            observation("h1", "Han", 1.0, 1.0),
        ]);
        let styles = vec![style("Han", "red", 1)];
        let data = prepare(obs, &styles, false).unwrap();
        assert_eq!(data.table.len(), 2);
        assert!(!data.colors.contains_key("Papuan"));
    }

    #[test]
    fn test_render_plot_undefined_variable() {
        let data = sample_data();
        let err = render_plot(
            "aes(x: $x, y: PC2) | point()",
            &HashMap::new(),
            &data,
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not defined"));
    }

    #[test]
    fn test_render_plot_parse_error() {
        let data = sample_data();
        let err = render_plot("aes(x: PC1, y: PC2)", &HashMap::new(), &data, &RenderOptions::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_render_plot_png() {
        let data = sample_data();
        let options = RenderOptions { width: 400, height: 300, ..Default::default() };
        let bytes = render_plot(
            r#"aes(x: PC1, y: -PC2) | point(size: 3) | legend(position: "none")"#,
            &HashMap::new(),
            &data,
            &options,
        )
        .unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_render_plot_rejects_oversized_canvas() {
        let data = sample_data();
        let options = RenderOptions { width: 70_000, height: 70_000, ..Default::default() };
        let err = render_plot("point()", &HashMap::new(), &data, &options).unwrap_err();
        assert!(err.to_string().contains("70000x70000 is too large"), "{err}");
    }

    #[test]
    fn test_render_plot_rejects_empty_canvas() {
        let data = sample_data();
        for format in [OutputFormat::Png, OutputFormat::Svg] {
            let options = RenderOptions { width: 0, height: 0, format };
            let err = render_plot("point()", &HashMap::new(), &data, &options).unwrap_err();
            assert!(err.to_string().contains("must be non-zero, got 0x0"), "{err}");
        }
    }

    #[test]
    fn test_run_requires_charts() {
        let err = run(&PipelineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No charts"));
    }
}
