// Chart-wide options: highlight set, draw order, legend

use super::ast::{Legend, LegendPosition};
use super::lexer::{identifier, string_literal, ws};
use crate::category::SortDirection;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, map_res, value},
    multi::{separated_list0, separated_list1},
    sequence::preceded,
    IResult,
};

/// Parse the foreground category set
/// Format: highlight("French", "Sardinian") or highlight(French, Sardinian)
pub fn parse_highlight(input: &str) -> IResult<&str, Vec<String>> {
    let (input, _) = ws(tag("highlight"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, names) = separated_list1(ws(char(',')), ws(alt((string_literal, identifier))))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, names))
}

/// Parse the draw order
/// Format: order(asc) or order(desc)
pub fn parse_order(input: &str) -> IResult<&str, SortDirection> {
    let (input, _) = ws(tag("order"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, direction) = ws(alt((
        value(SortDirection::Ascending, tag("ascending")),
        value(SortDirection::Ascending, tag("asc")),
        value(SortDirection::Descending, tag("descending")),
        value(SortDirection::Descending, tag("desc")),
    )))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, direction))
}

enum LegendArg {
    Position(LegendPosition),
    Title(String),
}

fn position_value(input: &str) -> IResult<&str, LegendPosition> {
    map_res(string_literal, |s| match s.as_str() {
        "right" => Ok(LegendPosition::Right),
        "none" => Ok(LegendPosition::None),
        _ => Err(format!("unknown legend position '{}'", s)),
    })(input)
}

/// Parse legend settings
/// Format: legend(position: "none") or legend(title: "Population")
pub fn parse_legend(input: &str) -> IResult<&str, Legend> {
    let (input, _) = ws(tag("legend"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("position:")), ws(position_value)), LegendArg::Position),
            map(preceded(ws(tag("title:")), ws(string_literal)), LegendArg::Title),
        )),
    )(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut legend = Legend::default();
    for arg in args {
        match arg {
            LegendArg::Position(p) => legend.position = p,
            LegendArg::Title(t) => legend.title = Some(t),
        }
    }

    Ok((input, legend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_highlight_mixed() {
        let (_, names) = parse_highlight(r#"highlight("Papuan Highlands", Sardinian)"#).unwrap();
        assert_eq!(names, vec!["Papuan Highlands", "Sardinian"]);
    }

    #[test]
    fn test_parse_highlight_empty_rejected() {
        assert!(parse_highlight("highlight()").is_err());
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("order(desc)").unwrap().1, SortDirection::Descending);
        assert_eq!(parse_order("order( ascending )").unwrap().1, SortDirection::Ascending);
        assert!(parse_order("order(random)").is_err());
    }

    #[test]
    fn test_parse_legend() {
        let (_, legend) = parse_legend(r#"legend(position: "none", title: "Group")"#).unwrap();
        assert_eq!(legend.position, LegendPosition::None);
        assert_eq!(legend.title, Some("Group".to_string()));
    }
}
