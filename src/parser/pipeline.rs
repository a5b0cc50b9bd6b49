// Pipeline parser for the chart recipe DSL

use super::aesthetics::parse_aesthetics;
use super::ast::{Aesthetics, Labels, Layer, Legend, PlotSpec};
use super::labels::parse_labs;
use super::layer::parse_layer;
use super::lexer::ws;
use super::options::{parse_highlight, parse_legend, parse_order};
use crate::category::SortDirection;
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map, opt},
    error::{Error, ErrorKind},
    multi::separated_list0,
    IResult,
};

#[derive(Debug)]
enum PipelineComponent {
    Aes(Aesthetics),
    Layer(Layer),
    Highlight(Vec<String>),
    Order(SortDirection),
    Labels(Labels),
    Legend(Legend),
}

fn parse_pipeline_component(input: &str) -> IResult<&str, PipelineComponent> {
    alt((
        map(parse_aesthetics, PipelineComponent::Aes),
        map(parse_layer, PipelineComponent::Layer),
        map(parse_highlight, PipelineComponent::Highlight),
        map(parse_order, PipelineComponent::Order),
        map(parse_labs, PipelineComponent::Labels),
        map(parse_legend, PipelineComponent::Legend),
    ))(input)
}

/// Parse a complete plot specification
/// Format: component | component | ...
pub fn parse_plot_spec(input: &str) -> IResult<&str, PlotSpec> {
    let (input, _) = opt(ws(tag("|")))(input)?;

    let (input, components) = separated_list0(ws(tag("|")), parse_pipeline_component)(input)?;

    let (input, _) = ws(eof)(input)?;

    let mut spec = PlotSpec::default();
    for comp in components {
        match comp {
            PipelineComponent::Aes(a) => spec.aesthetics = Some(a),
            PipelineComponent::Layer(l) => spec.layers.push(l),
            PipelineComponent::Highlight(names) => {
                // Repeated highlight() calls accumulate
                spec.highlight.get_or_insert_with(Vec::new).extend(names);
            }
            PipelineComponent::Order(o) => spec.order = o,
            PipelineComponent::Labels(l) => spec.labels = Some(l),
            PipelineComponent::Legend(l) => spec.legend = l,
        }
    }

    if spec.layers.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }

    Ok((input, spec))
}
