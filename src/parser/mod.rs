// Chart recipe DSL parser module

pub mod aesthetics;
pub mod ast;
pub mod labels;
pub mod layer;
pub mod lexer;
pub mod options;
pub mod pipeline;

use anyhow::{anyhow, Result};

// Public API re-exports
pub use ast::PlotSpec;
pub use pipeline::parse_plot_spec;

/// Parse a full recipe, rejecting trailing input
pub fn parse_recipe(recipe: &str) -> Result<PlotSpec> {
    match parse_plot_spec(recipe) {
        Ok((_, spec)) => Ok(spec),
        Err(e) => Err(anyhow!("Parse error in recipe '{}': {:?}", recipe.trim(), e)),
    }
}
