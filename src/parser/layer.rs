// Layer parsers: text labels and shaped points

use super::ast::{LabelField, Layer, PointLayer, Subset, TextLayer};
use super::lexer::{number_literal, string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, map_res},
    multi::separated_list0,
    sequence::preceded,
    IResult,
};

#[derive(Debug, Clone)]
enum LayerArg {
    Subset(Subset),
    Size(f64),
    Alpha(f64),
    Stroke(f64),
    Label(LabelField),
}

fn subset_value(input: &str) -> IResult<&str, Subset> {
    map_res(string_literal, |s| match s.as_str() {
        "all" => Ok(Subset::All),
        "background" => Ok(Subset::Background),
        "highlight" => Ok(Subset::Highlight),
        _ => Err(format!("unknown subset '{}'", s)),
    })(input)
}

fn label_value(input: &str) -> IResult<&str, LabelField> {
    map_res(string_literal, |s| match s.to_lowercase().as_str() {
        "population" => Ok(LabelField::Population),
        "individual" => Ok(LabelField::Individual),
        _ => Err(format!("unknown label field '{}'", s)),
    })(input)
}

/// Parse a text layer
/// Format: text() or text(subset: "background", alpha: 0.3, size: 11, label: "population")
pub fn parse_text(input: &str) -> IResult<&str, Layer> {
    let (input, _) = ws(tag("text"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("subset:")), ws(subset_value)), LayerArg::Subset),
            map(preceded(ws(tag("size:")), ws(number_literal)), LayerArg::Size),
            map(preceded(ws(tag("alpha:")), ws(number_literal)), LayerArg::Alpha),
            map(preceded(ws(tag("label:")), ws(label_value)), LayerArg::Label),
        )),
    )(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut layer = TextLayer::default();
    for arg in args {
        match arg {
            LayerArg::Subset(s) => layer.subset = s,
            LayerArg::Size(v) => layer.size = Some(v),
            LayerArg::Alpha(v) => layer.alpha = Some(v),
            LayerArg::Label(l) => layer.label = l,
            LayerArg::Stroke(_) => {}
        }
    }

    Ok((input, Layer::Text(layer)))
}

/// Parse a point layer
/// Format: point() or point(subset: "highlight", size: 5, stroke: 2, alpha: 1.0)
pub fn parse_point(input: &str) -> IResult<&str, Layer> {
    let (input, _) = ws(tag("point"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("subset:")), ws(subset_value)), LayerArg::Subset),
            map(preceded(ws(tag("size:")), ws(number_literal)), LayerArg::Size),
            map(preceded(ws(tag("stroke:")), ws(number_literal)), LayerArg::Stroke),
            map(preceded(ws(tag("alpha:")), ws(number_literal)), LayerArg::Alpha),
        )),
    )(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut layer = PointLayer::default();
    for arg in args {
        match arg {
            LayerArg::Subset(s) => layer.subset = s,
            LayerArg::Size(v) => layer.size = Some(v),
            LayerArg::Stroke(v) => layer.stroke = Some(v),
            LayerArg::Alpha(v) => layer.alpha = Some(v),
            LayerArg::Label(_) => {}
        }
    }

    Ok((input, Layer::Point(layer)))
}

pub fn parse_layer(input: &str) -> IResult<&str, Layer> {
    alt((parse_text, parse_point))(input)
}
