use crate::ir::{DrawCommand, LegendKey, LegendScene, SceneGraph};
use crate::palette::{Marker, MarkerShape};
use crate::OutputFormat;
use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Style of a text label drawn at a data point
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub color: RGBColor,
    pub size: f64,
    pub alpha: f64,
}

/// Style of a shaped point
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: RGBColor,
    pub marker: Marker,
    pub size: f64,
    pub stroke: f64,
    pub alpha: f64,
}

impl MarkerStyle {
    fn shape_style(&self) -> ShapeStyle {
        let color = self.color.mix(self.alpha);
        if self.marker.filled {
            color.filled()
        } else {
            color.stroke_width(self.stroke.max(1.0).round() as u32)
        }
    }
}

const LEGEND_ROW_HEIGHT: i32 = 20;
const LEGEND_FONT_SIZE: f64 = 13.0;

/// Largest canvas accepted, in pixels (8192 x 8192)
const MAX_PIXELS: u64 = 1 << 26;

/// Render a scene graph to encoded image bytes
pub fn render_scene(scene: &SceneGraph, format: &OutputFormat) -> Result<Vec<u8>> {
    check_canvas(scene.width, scene.height)?;
    match format {
        OutputFormat::Png => render_png(scene),
        OutputFormat::Svg => render_svg(scene),
    }
}

fn check_canvas(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("Image size must be non-zero, got {}x{}", width, height);
    }
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        anyhow::bail!(
            "Image size {}x{} is too large (at most {} pixels)",
            width,
            height,
            MAX_PIXELS
        );
    }
    Ok(())
}

fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let len = (scene.width as usize)
        .checked_mul(scene.height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| anyhow!("Image size {}x{} is too large", scene.width, scene.height))?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height))
            .into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn render_svg(scene: &SceneGraph) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw_scene<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()> {
    root.fill(&WHITE)
        .map_err(|e| anyhow!("Failed to fill background: {}", e))?;

    let (plot_area, legend_area) = match &scene.legend {
        Some(legend) => {
            let legend_width = legend_width(legend).min(scene.width as i32 / 2);
            let (plot, side) = root.split_horizontally(scene.width as i32 - legend_width);
            (plot, Some(side))
        }
        None => (root.clone(), None),
    };

    let (x0, x1) = scene.x_scale.domain;
    let (y0, y1) = scene.y_scale.domain;

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(10).x_label_area_size(40).y_label_area_size(60);
    if let Some(title) = &scene.title {
        builder.caption(title, ("sans-serif", 20));
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

    chart
        .configure_mesh()
        .x_desc(scene.x_label.as_str())
        .y_desc(scene.y_label.as_str())
        .draw()
        .map_err(|e| anyhow!("Failed to draw mesh: {}", e))?;

    for command in &scene.commands {
        match command {
            DrawCommand::DrawLabel { position, text, style } => {
                let font = ("sans-serif", style.size)
                    .into_font()
                    .color(&style.color.mix(style.alpha))
                    .pos(Pos::new(HPos::Center, VPos::Center));
                chart
                    .draw_series(std::iter::once(Text::new(text.clone(), *position, font)))
                    .map_err(|e| anyhow!("Failed to draw label '{}': {}", text, e))?;
            }
            DrawCommand::DrawMarker { position, style } => {
                let shape_style = style.shape_style();
                let radius = style.size.max(1.0).round() as i32;
                for glyph in marker_glyphs(style.marker, radius) {
                    let at = EmptyElement::at(*position);
                    let drawn = match glyph {
                        Glyph::Circle(r) => chart.draw_series(std::iter::once(
                            at + Circle::new((0, 0), r, shape_style),
                        )),
                        Glyph::Rect(tl, br) => chart.draw_series(std::iter::once(
                            at + Rectangle::new([tl, br], shape_style),
                        )),
                        Glyph::Polygon(points) => chart.draw_series(std::iter::once(
                            at + Polygon::new(points, shape_style),
                        )),
                        Glyph::Path(points) => chart.draw_series(std::iter::once(
                            at + PathElement::new(points, shape_style),
                        )),
                    };
                    drawn.map_err(|e| anyhow!("Failed to draw marker: {}", e))?;
                }
            }
        }
    }

    if let (Some(area), Some(legend)) = (legend_area, &scene.legend) {
        draw_legend(&area, legend)?;
    }

    Ok(())
}

fn legend_width(legend: &LegendScene) -> i32 {
    let longest = legend
        .entries
        .iter()
        .map(|e| e.label.chars().count())
        .chain(std::iter::once(legend.title.chars().count()))
        .max()
        .unwrap_or(0);
    (longest as i32 * 8 + 50).max(120)
}

fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, legend: &LegendScene) -> Result<()> {
    let title_font = ("sans-serif", LEGEND_FONT_SIZE + 1.0).into_font().color(&BLACK);
    area.draw(&Text::new(legend.title.clone(), (10, 20), title_font))
        .map_err(|e| anyhow!("Failed to draw legend title: {}", e))?;

    for (i, entry) in legend.entries.iter().enumerate() {
        let y = 50 + i as i32 * LEGEND_ROW_HEIGHT;
        let key_at = (20, y);

        match entry.key {
            LegendKey::Text => {
                let font = ("sans-serif", LEGEND_FONT_SIZE)
                    .into_font()
                    .color(&entry.color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                area.draw(&Text::new("a", key_at, font))
                    .map_err(|e| anyhow!("Failed to draw legend key: {}", e))?;
            }
            LegendKey::Marker(marker) => {
                let style = MarkerStyle {
                    color: entry.color,
                    marker,
                    size: 5.0,
                    stroke: 1.5,
                    alpha: 1.0,
                }
                .shape_style();
                for glyph in marker_glyphs(marker, 5) {
                    let at = EmptyElement::at(key_at);
                    let drawn = match glyph {
                        Glyph::Circle(r) => area.draw(&(at + Circle::new((0, 0), r, style))),
                        Glyph::Rect(tl, br) => area.draw(&(at + Rectangle::new([tl, br], style))),
                        Glyph::Polygon(points) => area.draw(&(at + Polygon::new(points, style))),
                        Glyph::Path(points) => area.draw(&(at + PathElement::new(points, style))),
                    };
                    drawn.map_err(|e| anyhow!("Failed to draw legend key: {}", e))?;
                }
            }
        }

        let font = ("sans-serif", LEGEND_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(entry.label.clone(), (34, y), font))
            .map_err(|e| anyhow!("Failed to draw legend label '{}': {}", entry.label, e))?;
    }

    Ok(())
}

/// Primitive making up a marker, in pixel offsets from its anchor
#[derive(Debug, Clone, PartialEq)]
enum Glyph {
    Circle(i32),
    Rect((i32, i32), (i32, i32)),
    Polygon(Vec<(i32, i32)>),
    Path(Vec<(i32, i32)>),
}

fn marker_glyphs(marker: Marker, r: i32) -> Vec<Glyph> {
    let outline = |mut points: Vec<(i32, i32)>| {
        if marker.filled {
            Glyph::Polygon(points)
        } else {
            points.push(points[0]);
            Glyph::Path(points)
        }
    };
    let plus = || {
        vec![
            Glyph::Path(vec![(-r, 0), (r, 0)]),
            Glyph::Path(vec![(0, -r), (0, r)]),
        ]
    };
    let cross = || {
        vec![
            Glyph::Path(vec![(-r, -r), (r, r)]),
            Glyph::Path(vec![(-r, r), (r, -r)]),
        ]
    };

    match marker.shape {
        MarkerShape::Circle => vec![Glyph::Circle(r)],
        MarkerShape::Square => vec![Glyph::Rect((-r, -r), (r, r))],
        MarkerShape::TriangleUp => vec![outline(vec![(0, -r), (r, r), (-r, r)])],
        MarkerShape::TriangleDown => vec![outline(vec![(0, r), (r, -r), (-r, -r)])],
        MarkerShape::Diamond => vec![outline(vec![(0, -r), (r, 0), (0, r), (-r, 0)])],
        MarkerShape::Plus => plus(),
        MarkerShape::Cross => cross(),
        MarkerShape::Asterisk => {
            let mut glyphs = plus();
            glyphs.extend(cross());
            glyphs
        }
    }
}
