use crate::domain::{Highlight, ShopGroup};
use crate::rank::RankedShop;
use crate::scale::{BandScale, LinearScale};
use crate::scene::{
    AxisOrient, HoverStyle, LegendEntry, Margin, Mark, MarkClass, Rgb, RootClass, Scene, Surface,
    Swatch, Tooltip,
};
use crate::stats::{extent, BoxSummary};

use super::{band_axis, linear_axis, plain_number, tick_label, NO_DATA};

pub const TITLE: &str = "Boxplot: Product Count Distribution";

const MARGIN: Margin = Margin::new(40.0, 30.0, 60.0, 60.0);
const TOP_FILL: Rgb = Rgb::hex(0x1a_bc_9c);
const NON_TOP_FILL: Rgb = Rgb::hex(0xcc_cc_cc);
const NON_TOP_LEGEND: Rgb = Rgb::hex(0xaa_aa_aa);
const OUTLIER_STROKE: Rgb = Rgb::hex(0xe7_4c_3c);
const DOT_HOVER: HoverStyle = HoverStyle {
    radius: 6.0,
    stroke: Rgb::hex(0x11_11_11),
    stroke_width: 2.0,
};

const fn fill(group: ShopGroup) -> Rgb {
    match group {
        ShopGroup::Top => TOP_FILL,
        ShopGroup::NonTop => NON_TOP_FILL,
    }
}

/// Selling-product distribution of top vs non-top shops, one box per group
/// with every shop drawn as a jittered dot.
pub fn render(ranked: &[RankedShop<'_>], highlight: bool, surface: Surface) -> Scene {
    if ranked.is_empty() {
        return Scene::placeholder(surface, TITLE, NO_DATA);
    }

    let mut scene = Scene::new(surface);
    scene.title = Some(TITLE.to_string());
    scene.set_root_class(RootClass::ActiveMode, highlight);

    let x_range = (MARGIN.left, surface.width - MARGIN.right);
    let band = BandScale::new(ShopGroup::ALL.len(), x_range, 0.5);
    let max = extent(ranked.iter().map(|r| r.shop.selling_products)).map_or(0.0, |(_, hi)| hi);
    let y = LinearScale::nice_extent(
        (0.0, max.max(0.0)),
        (surface.height - MARGIN.bottom, MARGIN.top),
    );

    let labels: Vec<&str> = ShopGroup::ALL.iter().map(|g| g.label()).collect();
    scene.axes.push(band_axis(
        AxisOrient::Bottom,
        surface.height - MARGIN.bottom,
        &band,
        &labels,
        x_range,
        "Shop Group",
    ));
    scene.axes.push(linear_axis(
        AxisOrient::Left,
        MARGIN.left,
        &y,
        "Selling Products (units)",
        tick_label,
    ));

    for (index, group) in ShopGroup::ALL.into_iter().enumerate() {
        let members: Vec<&RankedShop<'_>> = ranked
            .iter()
            .filter(|r| ShopGroup::of(r.is_top) == group)
            .collect();
        let Some(summary) = BoxSummary::from_values(members.iter().map(|r| r.shop.selling_products))
        else {
            continue;
        };
        let Some(x0) = band.position(index) else {
            continue;
        };
        let width = band.bandwidth();
        let center = x0 + width / 2.0;

        scene.push(
            Mark::line(center, y.map(summary.lower_whisker), center, y.map(summary.upper_whisker))
                .class(MarkClass::Whisker),
        );

        let mut body = Mark::rect(
            x0,
            y.map(summary.q3),
            width,
            y.map(summary.q1) - y.map(summary.q3),
        )
        .filled(fill(group))
        .class(MarkClass::Highlightable)
        .class(MarkClass::Box(group))
        .highlight_key(Highlight::BoxCore)
        .tooltip(summary_tooltip(group, &summary));
        if highlight {
            body = body.stroked(Rgb(0, 0, 0), 2.0);
        }
        scene.push(body);

        scene.push(
            Mark::line(x0, y.map(summary.median), x0 + width, y.map(summary.median))
                .stroked(Rgb(0, 0, 0), 2.0)
                .class(MarkClass::Median),
        );

        for member in &members {
            let products = member.shop.selling_products;
            if products.is_nan() {
                continue;
            }
            let cx = (super::jitter(&member.shop.shop_name) * width).mul_add(0.6, center);
            let mut dot = Mark::circle(cx, y.map(products), 3.0)
                .filled(fill(group))
                .opacity(if highlight { 0.9 } else { 0.5 })
                .class(MarkClass::Highlightable)
                .class(MarkClass::Dot(group))
                .tooltip(Tooltip::new(
                    member.shop.shop_name.clone(),
                    vec![format!("Products: {}", plain_number(products))],
                ))
                .hover(DOT_HOVER);
            if summary.is_outlier(products) {
                dot = dot
                    .class(MarkClass::Outlier)
                    .stroked(OUTLIER_STROKE, 1.5)
                    .highlight_key(Highlight::BoxOutliers);
            }
            scene.push(dot);
        }
    }

    scene.legend = vec![
        LegendEntry {
            label: ShopGroup::Top.label().to_string(),
            color: TOP_FILL,
            swatch: Swatch::Dot,
        },
        LegendEntry {
            label: ShopGroup::NonTop.label().to_string(),
            color: NON_TOP_LEGEND,
            swatch: Swatch::Dot,
        },
    ];
    scene.legend_origin = (surface.width - MARGIN.right - 120.0, MARGIN.top);
    scene
}

fn summary_tooltip(group: ShopGroup, summary: &BoxSummary) -> Tooltip {
    Tooltip::new(
        format!("{} Shops", group.label()),
        vec![
            format!("Median: {}", plain_number(summary.median)),
            format!("Q1: {}", plain_number(summary.q1)),
            format!("Q3: {}", plain_number(summary.q3)),
            format!("IQR: {}", plain_number(summary.iqr)),
            format!(
                "Whiskers: {} - {}",
                plain_number(summary.lower_whisker),
                plain_number(summary.upper_whisker)
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ShopRecord;
    use crate::domain::CategoryFilter;
    use crate::rank::{fixtures::shop, rank_shops};
    use crate::scene::Shape;

    fn with_products(name: &str, gmv: f64, products: f64) -> ShopRecord {
        ShopRecord {
            selling_products: products,
            ..shop(name, "Beauty", gmv)
        }
    }

    fn sample() -> Vec<ShopRecord> {
        vec![
            with_products("a", 900.0, 40.0),
            with_products("b", 800.0, 42.0),
            with_products("c", 100.0, 10.0),
            with_products("d", 90.0, 11.0),
            with_products("e", 80.0, 12.0),
            with_products("f", 70.0, 13.0),
            with_products("g", 60.0, 250.0),
        ]
    }

    #[test]
    fn empty_input_draws_placeholder() {
        let scene = render(&[], false, Surface::default());
        assert_eq!(scene.placeholder.as_deref(), Some(NO_DATA));
        assert!(scene.marks.is_empty());
    }

    #[test]
    fn one_box_per_group_and_a_dot_per_shop() {
        let shops = sample();
        let ranked = rank_shops(&shops, &CategoryFilter::All, 2);
        let scene = render(&ranked, false, Surface::default());

        assert_eq!(scene.select(MarkClass::Box(ShopGroup::Top)).count(), 1);
        assert_eq!(scene.select(MarkClass::Box(ShopGroup::NonTop)).count(), 1);
        assert_eq!(scene.select(MarkClass::Dot(ShopGroup::Top)).count(), 2);
        assert_eq!(scene.select(MarkClass::Dot(ShopGroup::NonTop)).count(), 5);
        assert!(scene
            .select(MarkClass::Dot(ShopGroup::Top))
            .all(|m| (m.opacity - 0.5).abs() < 1e-9));
    }

    #[test]
    fn far_values_are_flagged_as_outliers() {
        let shops = sample();
        let ranked = rank_shops(&shops, &CategoryFilter::All, 2);
        let mut scene = render(&ranked, true, Surface::default());

        let outliers: Vec<&Mark> = scene.select(MarkClass::Outlier).collect();
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].tooltip.as_ref().map(|t| t.title.as_str()), Some("g"));
        assert_eq!(scene.highlight_key(Highlight::BoxOutliers), 1);
        assert!(scene
            .select(MarkClass::Box(ShopGroup::Top))
            .all(|m| m.stroke_width > 1.0));
    }

    #[test]
    fn dots_stay_inside_their_band() {
        let shops = sample();
        let ranked = rank_shops(&shops, &CategoryFilter::All, 2);
        let scene = render(&ranked, false, Surface::default());
        let band = BandScale::new(2, (MARGIN.left, 960.0 - MARGIN.right), 0.5);
        let (start, width) = (band.position(0).unwrap_or_default(), band.bandwidth());

        for dot in scene.select(MarkClass::Dot(ShopGroup::Top)) {
            let Shape::Circle { cx, .. } = dot.shape else {
                panic!("dots are circles");
            };
            assert!(cx >= start && cx <= start + width);
        }
    }
}
