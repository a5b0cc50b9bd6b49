// Run configuration loaded from JSON

use crate::data::{Delimiter, Schema};
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything one run needs: inputs, join policy, and the charts to draw
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PipelineConfig {
    /// Primary table with `Individual`, `PC1..PCn`, `Population`
    #[serde(default)]
    pub observations: Option<PathBuf>,
    /// Secondary table with `Population`, `colorNr`, `symbolNr`
    #[serde(default)]
    pub styles: Option<PathBuf>,
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default)]
    pub schema: Schema,
    /// Fail when the two tables disagree on populations
    #[serde(default)]
    pub strict_join: bool,
    /// Values for `$name` references in recipes
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub recipe: String,
    pub output: PathBuf,
    /// Overrides the run-wide render options
    #[serde(default)]
    pub render: Option<RenderOptions>,
}

impl ChartConfig {
    pub fn render_options<'a>(&'a self, default: &'a RenderOptions) -> &'a RenderOptions {
        self.render.as_ref().unwrap_or(default)
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Relative paths resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let mut config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        tracing::debug!(path = %path.display(), charts = config.charts.len(), "loaded config");
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.observations.as_mut() {
            join(p);
        }
        if let Some(p) = self.styles.as_mut() {
            join(p);
        }
        for chart in &mut self.charts {
            join(&mut chart.output);
        }
    }
}
