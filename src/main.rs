use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use popgraph::config::{ChartConfig, PipelineConfig};
use popgraph::data::Delimiter;
use popgraph::preprocessor::parse_assignments;
use popgraph::{runtime, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "popgraph")]
#[command(about = "Plot PCA coordinates by population using a layered recipe DSL", long_about = None)]
struct Args {
    /// Chart recipe (e.g., 'aes(x: PC1, y: -PC2) | text(subset: "background") | point(subset: "highlight") | highlight("French")')
    recipe: Option<String>,

    /// Observations table (Individual, PC1..PCn, Population)
    #[arg(long)]
    observations: Option<PathBuf>,

    /// Style table (Population, colorNr, symbolNr)
    #[arg(long)]
    styles: Option<PathBuf>,

    /// Output image for the recipe given on the command line
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recipe variable, repeatable (e.g., --var pc=PC3)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// Output format; defaults to the output file extension
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long, value_enum)]
    delimiter: Option<DelimiterArg>,

    /// Fail when the two tables disagree on populations
    #[arg(long)]
    strict_join: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Svg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DelimiterArg {
    Auto,
    Comma,
    Tab,
    Semicolon,
    Whitespace,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Auto => Delimiter::Auto,
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Tab => Delimiter::Tab,
            DelimiterArg::Semicolon => Delimiter::Semicolon,
            DelimiterArg::Whitespace => Delimiter::Whitespace,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "popgraph=debug" } else { "popgraph=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Merge the config file (if any) with command-line overrides
fn build_config(args: Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(p) = args.observations {
        config.observations = Some(p);
    }
    if let Some(p) = args.styles {
        config.styles = Some(p);
    }
    if let Some(d) = args.delimiter {
        config.delimiter = d.into();
    }
    if args.strict_join {
        config.strict_join = true;
    }
    config
        .variables
        .extend(parse_assignments(&args.vars).context("Invalid --var")?);

    if let Some(w) = args.width {
        config.render.width = w;
    }
    if let Some(h) = args.height {
        config.render.height = h;
    }

    if let Some(recipe) = args.recipe {
        let output = args
            .output
            .context("A recipe on the command line needs --output")?;
        let mut render = config.render.clone();
        render.format = match args.format {
            Some(FormatArg::Png) => OutputFormat::Png,
            Some(FormatArg::Svg) => OutputFormat::Svg,
            None => OutputFormat::from_extension(&output).unwrap_or(render.format),
        };
        config.charts.push(ChartConfig {
            recipe,
            output,
            render: Some(render),
        });
    } else if args.output.is_some() {
        anyhow::bail!("--output given without a recipe");
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(args)?;
    let written = runtime::run(&config)?;
    tracing::debug!(written, "done");

    Ok(())
}
