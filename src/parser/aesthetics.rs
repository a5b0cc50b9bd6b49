// Aesthetics parser for the chart recipe DSL

use super::ast::{Aesthetics, Axis};
use super::lexer::{identifier, ws};
use nom::{
    character::complete::char,
    bytes::complete::tag,
    combinator::{map, opt},
    sequence::pair,
    IResult,
};

/// Parse an axis: component name with an optional leading `-` for a sign flip
pub fn parse_axis(input: &str) -> IResult<&str, Axis> {
    map(pair(opt(ws(char('-'))), ws(identifier)), |(neg, component)| Axis {
        component,
        negate: neg.is_some(),
    })(input)
}

/// Parse aesthetics specification
/// Format: aes(x: PC1, y: -PC2)
pub fn parse_aesthetics(input: &str) -> IResult<&str, Aesthetics> {
    let (input, _) = ws(tag("aes"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, _) = ws(tag("x:"))(input)?;
    let (input, x) = parse_axis(input)?;
    let (input, _) = ws(char(','))(input)?;

    let (input, _) = ws(tag("y:"))(input)?;
    let (input, y) = parse_axis(input)?;

    let (input, _) = ws(char(')'))(input)?;

    Ok((input, Aesthetics { x, y }))
}
