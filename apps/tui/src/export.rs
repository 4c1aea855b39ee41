//! Non-interactive outputs: standalone SVG files for every chart and a JSON
//! summary of what the charts show.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::charts::{self, QuadrantChart, Thresholds};
use crate::data::Dataset;
use crate::domain::{CategoryFilter, ChartId, Quadrant, ShopGroup};
use crate::error::{Result, StoryError};
use crate::rank::rank_shops;
use crate::scene::{Anchor, Axis, AxisOrient, Mark, Rgb, Scene, Shape, Surface, Swatch};
use crate::stats::{median, BoxSummary};
use crate::story::{NarrativeStep, Story};

const TEXT_COLOR: &str = "#333333";
const AXIS_COLOR: &str = "#555555";

/// Serialises a scene as a standalone SVG document.
pub fn scene_to_svg(scene: &Scene) -> String {
    let Surface { width, height } = scene.surface;
    let mut svg = String::new();
    let classes: Vec<&str> = scene.root_classes.iter().map(|c| c.css_name()).collect();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" class="{}" font-family="sans-serif">"#,
        classes.join(" ")
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);

    if let Some(title) = &scene.title {
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="18" text-anchor="middle" font-size="15" font-weight="600" fill="{TEXT_COLOR}">{}</text>"#,
            width / 2.0,
            escape(title)
        );
    }

    if let Some(message) = &scene.placeholder {
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="16" fill="{TEXT_COLOR}">{}</text>"#,
            width / 2.0,
            height / 2.0,
            escape(message)
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    for axis in &scene.axes {
        write_axis(&mut svg, axis, scene.surface);
    }
    for mark in &scene.marks {
        write_mark(&mut svg, scene, mark);
    }
    write_legend(&mut svg, scene);

    svg.push_str("</svg>\n");
    svg
}

fn write_axis(svg: &mut String, axis: &Axis, surface: Surface) {
    let (r0, r1) = axis.range;
    let (lo, hi) = (r0.min(r1), r0.max(r1));
    let _ = writeln!(svg, r#"  <g class="axis">"#);
    match axis.orient {
        AxisOrient::Bottom => {
            let y = axis.offset;
            let _ = writeln!(
                svg,
                r#"    <line x1="{lo:.1}" y1="{y:.1}" x2="{hi:.1}" y2="{y:.1}" stroke="{AXIS_COLOR}"/>"#
            );
            for tick in &axis.ticks {
                let x = tick.position;
                let _ = writeln!(
                    svg,
                    r#"    <line x1="{x:.1}" y1="{y:.1}" x2="{x:.1}" y2="{:.1}" stroke="{AXIS_COLOR}"/><text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="10" fill="{TEXT_COLOR}">{}</text>"#,
                    y + 6.0,
                    y + 18.0,
                    escape(&tick.label)
                );
            }
            let _ = writeln!(
                svg,
                r#"    <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="{TEXT_COLOR}">{}</text>"#,
                (lo + hi) / 2.0,
                (y + 42.0).min(surface.height - 4.0),
                escape(&axis.title)
            );
        }
        AxisOrient::Left => {
            let x = axis.offset;
            let _ = writeln!(
                svg,
                r#"    <line x1="{x:.1}" y1="{lo:.1}" x2="{x:.1}" y2="{hi:.1}" stroke="{AXIS_COLOR}"/>"#
            );
            for tick in &axis.ticks {
                let y = tick.position;
                let _ = writeln!(
                    svg,
                    r#"    <line x1="{:.1}" y1="{y:.1}" x2="{x:.1}" y2="{y:.1}" stroke="{AXIS_COLOR}"/><text x="{:.1}" y="{:.1}" text-anchor="end" font-size="10" fill="{TEXT_COLOR}">{}</text>"#,
                    x - 6.0,
                    x - 9.0,
                    y + 3.5,
                    escape(&tick.label)
                );
            }
            let cx = (x - 45.0).max(12.0);
            let cy = (lo + hi) / 2.0;
            let _ = writeln!(
                svg,
                r#"    <text x="{cx:.1}" y="{cy:.1}" text-anchor="middle" font-size="12" fill="{TEXT_COLOR}" transform="rotate(-90, {cx:.1}, {cy:.1})">{}</text>"#,
                escape(&axis.title)
            );
        }
    }
    let _ = writeln!(svg, "  </g>");
}

fn write_mark(svg: &mut String, scene: &Scene, mark: &Mark) {
    let mut attrs = String::new();
    let classes: Vec<&str> = mark
        .classes
        .iter()
        .map(|c| c.css_name())
        .chain(mark.highlighted.then_some("highlighted"))
        .collect();
    if !classes.is_empty() {
        let _ = write!(attrs, r#" class="{}""#, classes.join(" "));
    }
    if let Some(key) = mark.highlight_key {
        let _ = write!(attrs, r#" data-highlight="{}""#, key.as_str());
    }
    let fill = mark.fill.map_or_else(|| "none".to_string(), Rgb::css);
    let _ = write!(attrs, r#" fill="{fill}""#);
    if let Some((color, width)) = mark.effective_stroke() {
        let _ = write!(attrs, r#" stroke="{}" stroke-width="{width}""#, color.css());
    }
    let opacity = scene.effective_opacity(mark);
    if (opacity - 1.0).abs() > f64::EPSILON {
        let _ = write!(attrs, r#" opacity="{opacity}""#);
    }

    let body = match &mark.shape {
        Shape::Circle { cx, cy, r } => {
            format!(r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r}"{attrs}>"#)
        }
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="{width:.1}" height="{height:.1}"{attrs}>"#
        ),
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            dashed,
        } => {
            let dash = if *dashed { r#" stroke-dasharray="4""# } else { "" };
            format!(r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}"{dash}{attrs}>"#)
        }
        Shape::Text {
            x,
            y,
            text,
            anchor,
            size,
            bold,
        } => {
            let weight = if *bold { r#" font-weight="bold""# } else { "" };
            format!(
                r#"<text x="{x:.1}" y="{y:.1}" text-anchor="{}" font-size="{size}"{weight}{attrs}>{}"#,
                anchor_name(*anchor),
                escape(text)
            )
        }
    };
    let close = match mark.shape {
        Shape::Circle { .. } => "</circle>",
        Shape::Rect { .. } => "</rect>",
        Shape::Line { .. } => "</line>",
        Shape::Text { .. } => "</text>",
    };

    svg.push_str("  ");
    svg.push_str(&body);
    if let Some(tooltip) = &mark.tooltip {
        let mut lines = vec![tooltip.title.as_str()];
        lines.extend(tooltip.lines.iter().map(String::as_str));
        let _ = write!(svg, "<title>{}</title>", escape(&lines.join("\n")));
    }
    svg.push_str(close);
    svg.push('\n');
}

fn write_legend(svg: &mut String, scene: &Scene) {
    if scene.legend.is_empty() {
        return;
    }
    let (x, y) = scene.legend_origin;
    let _ = writeln!(svg, r#"  <g class="legend" transform="translate({x:.1},{y:.1})">"#);
    for (index, entry) in scene.legend.iter().enumerate() {
        let row = index as f64 * 20.0;
        let swatch = match entry.swatch {
            Swatch::Dot => format!(
                r#"<circle cx="6" cy="{:.1}" r="6" fill="{}"/>"#,
                row + 6.0,
                entry.color.css()
            ),
            Swatch::Square => format!(
                r#"<rect x="0" y="{row:.1}" width="12" height="12" fill="{}"/>"#,
                entry.color.css()
            ),
        };
        let _ = writeln!(
            svg,
            r#"    {swatch}<text x="18" y="{:.1}" font-size="12" fill="{TEXT_COLOR}">{}</text>"#,
            row + 10.0,
            escape(&entry.label)
        );
    }
    let _ = writeln!(svg, "  </g>");
}

const fn anchor_name(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn write_svg(scene: &Scene, path: &Path) -> Result<()> {
    fs::write(path, scene_to_svg(scene)).map_err(|source| StoryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the quadrant chart and the three scroll charts, unhighlighted,
/// into `dir`. Returns the written paths in page order.
pub fn export_all(
    dataset: &Dataset,
    category: &CategoryFilter,
    top_n: usize,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| StoryError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let surface = Surface::default();
    let quadrant = QuadrantChart::new(&dataset.categories, surface);
    let mut scenes = vec![("chart1-quadrant.svg", quadrant.scene())];
    for (file, chart) in [
        ("chart2-boxplot.svg", ChartId::Boxplot),
        ("chart3-stacked-bar.svg", ChartId::StackedBar),
        ("chart4-scatter.svg", ChartId::Scatter),
    ] {
        let scene = charts::render_chart(chart, &dataset.shops, category, top_n, false, surface);
        scenes.push((file, scene));
    }

    let mut written = Vec::with_capacity(scenes.len());
    for (file, scene) in scenes {
        let path = dir.join(file);
        write_svg(&scene, &path)?;
        info!(path = %path.display(), marks = scene.marks.len(), "svg exported");
        written.push(path);
    }
    Ok(written)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantCount {
    pub quadrant: &'static str,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: &'static str,
    pub shops: usize,
    pub products: Option<BoxSummary>,
    pub avg_creators: f64,
    pub avg_videos: f64,
    pub avg_products: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySummary {
    pub shops: usize,
    pub categories: usize,
    pub top_n: usize,
    pub category: String,
    pub thresholds: Thresholds,
    pub slider_max: Thresholds,
    pub quadrants: Vec<QuadrantCount>,
    pub groups: Vec<GroupSummary>,
    pub median_unit_price: Option<f64>,
    pub steps: Vec<NarrativeStep>,
}

/// Everything the page would show for the given filters, as plain data.
pub fn summarize(
    dataset: &Dataset,
    story: &Story,
    category: &CategoryFilter,
    top_n: usize,
) -> StorySummary {
    let quadrant = QuadrantChart::new(&dataset.categories, Surface::default());
    let quadrants = Quadrant::ALL
        .iter()
        .map(|q| QuadrantCount {
            quadrant: q.label(),
            categories: dataset
                .categories
                .iter()
                .filter(|c| !(c.avg_gmv.is_nan() || c.avg_videos.is_nan()))
                .filter(|c| quadrant.classify(c) == *q)
                .map(|c| c.category.clone())
                .collect(),
        })
        .collect();

    let ranked = rank_shops(&dataset.shops, category, top_n);
    let groups = ShopGroup::ALL
        .iter()
        .map(|group| {
            let means = charts::stacked::group_means(&ranked, *group);
            GroupSummary {
                group: group.label(),
                shops: ranked
                    .iter()
                    .filter(|r| ShopGroup::of(r.is_top) == *group)
                    .count(),
                products: BoxSummary::from_values(
                    ranked
                        .iter()
                        .filter(|r| ShopGroup::of(r.is_top) == *group)
                        .map(|r| r.shop.selling_products),
                ),
                avg_creators: means[0].1,
                avg_videos: means[1].1,
                avg_products: means[2].1,
            }
        })
        .collect();

    StorySummary {
        shops: dataset.shops.len(),
        categories: dataset.categories.len(),
        top_n,
        category: category.label().to_string(),
        thresholds: quadrant.thresholds(),
        slider_max: quadrant.slider_max(),
        quadrants,
        groups,
        median_unit_price: median(ranked.iter().map(|r| r.shop.unit_price)),
        steps: story.steps().to_vec(),
    }
}

/// Plain-text report for `--headless` without `--json`.
pub fn summary_text(summary: &StorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} shops, {} categories; top {} in {}",
        summary.shops, summary.categories, summary.top_n, summary.category
    );
    let _ = writeln!(
        out,
        "Quadrant thresholds: GMV ${}, videos {:.0}",
        charts::millions(summary.thresholds.x, 0),
        summary.thresholds.y
    );
    for quadrant in &summary.quadrants {
        let _ = writeln!(
            out,
            "  {:<10} {}",
            quadrant.quadrant,
            quadrant.categories.join(", ")
        );
    }
    for group in &summary.groups {
        let median = group
            .products
            .map_or_else(|| "-".to_string(), |b| charts::plain_number(b.median));
        let _ = writeln!(
            out,
            "{:<8} shops {:>5}  median products {:>6}  creators {:>8.1}  videos {:>8.1}",
            group.group, group.shops, median, group.avg_creators, group.avg_videos
        );
    }
    let _ = writeln!(out, "{} narrative steps", summary.steps.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CategoryAggregate, ShopRecord};
    use crate::rank::fixtures::shop;

    fn dataset() -> Dataset {
        let shops: Vec<ShopRecord> = vec![
            shop("Glow & Co", "Beauty", 900.0),
            shop("b", "Beauty", 500.0),
            shop("c", "Toys", 100.0),
        ];
        let categories = vec![
            CategoryAggregate {
                category: "Beauty".to_string(),
                avg_gmv: 2_000_000.0,
                avg_videos: 90.0,
            },
            CategoryAggregate {
                category: "Toys".to_string(),
                avg_gmv: 500_000.0,
                avg_videos: 10.0,
            },
        ];
        Dataset::new(shops, categories)
    }

    #[test]
    fn svg_has_marks_tooltips_and_escaping() {
        let data = dataset();
        let scene = charts::render_chart(
            ChartId::Scatter,
            &data.shops,
            &CategoryFilter::All,
            1,
            false,
            Surface::default(),
        );
        let svg = scene_to_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 3 + 2);
        assert!(svg.contains("Glow &amp; Co"));
        assert!(svg.contains("class=\"highlightable scatter-"));
        assert!(svg.contains("data-highlight=\"scatter-top\""));
    }

    #[test]
    fn placeholder_scene_writes_message_only() {
        let scene = charts::render_chart(
            ChartId::Boxplot,
            &[],
            &CategoryFilter::All,
            10,
            false,
            Surface::default(),
        );
        let svg = scene_to_svg(&scene);
        assert!(svg.contains(charts::NO_DATA));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn highlighted_marks_carry_the_class() {
        let data = dataset();
        let mut scene = charts::render_chart(
            ChartId::Boxplot,
            &data.shops,
            &CategoryFilter::All,
            1,
            false,
            Surface::default(),
        );
        scene.highlight_key(crate::domain::Highlight::BoxCore);
        let svg = scene_to_svg(&scene);
        assert!(svg.contains("highlightable box-Top highlighted"));
    }

    #[test]
    fn summary_counts_groups_and_quadrants() {
        let data = dataset();
        let beauty = CategoryFilter::parse("Beauty");
        let summary = summarize(&data, &Story::default_story(), &beauty, 1);
        assert_eq!(summary.category, "Beauty");
        assert_eq!(summary.groups[0].shops, 1);
        assert_eq!(summary.groups[1].shops, 1);
        let cash_cows = &summary.quadrants[0];
        assert_eq!(cash_cows.quadrant, "Cash Cow");
        assert_eq!(cash_cows.categories, vec!["Beauty".to_string()]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["steps"][0]["chart"], "chart2");
        assert_eq!(json["steps"][0]["id"], "chart2-anchor-step");
        assert!(summary_text(&summary).contains("Cash Cow"));
    }

    #[test]
    fn export_all_writes_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_all(&dataset(), &CategoryFilter::All, 2, dir.path()).unwrap();
        assert_eq!(written.len(), 4);
        for path in written {
            let text = std::fs::read_to_string(&path).unwrap();
            assert!(text.starts_with("<svg"));
        }
    }
}
