use crate::domain::{Highlight, ScatterGroup};
use crate::rank::RankedShop;
use crate::scale::LinearScale;
use crate::scene::{
    AxisOrient, LegendEntry, Margin, Mark, MarkClass, Rgb, Scene, Surface, Swatch, Tooltip,
};
use crate::stats::{extent, median};

use super::{linear_axis, millions, tick_label, NO_DATA};

pub const TITLE: &str = "How Price Relates to Shop Performance";

const MARGIN: Margin = Margin::new(40.0, 150.0, 60.0, 80.0);
const TOP_FILL: Rgb = Rgb::hex(0xff_6b_6b);
const OTHER_FILL: Rgb = Rgb::hex(0xc0_c0_c0);

/// Unit price against GMV for every shop in the current filter.
pub fn render(ranked: &[RankedShop<'_>], highlight: bool, surface: Surface) -> Scene {
    let plotted: Vec<&RankedShop<'_>> = ranked
        .iter()
        .filter(|r| !(r.shop.unit_price.is_nan() || r.shop.total_gmv.is_nan()))
        .collect();
    if plotted.is_empty() {
        return Scene::placeholder(surface, TITLE, NO_DATA);
    }

    let mut scene = Scene::new(surface);
    scene.title = Some(TITLE.to_string());

    let price_extent = extent(plotted.iter().map(|r| r.shop.unit_price)).unwrap_or((0.0, 1.0));
    let gmv_extent = extent(plotted.iter().map(|r| r.shop.total_gmv)).unwrap_or((0.0, 1.0));
    let x = LinearScale::nice_extent(price_extent, (MARGIN.left, surface.width - MARGIN.right));
    let y = LinearScale::nice_extent(gmv_extent, (surface.height - MARGIN.bottom, MARGIN.top));
    let price_median = median(plotted.iter().map(|r| r.shop.unit_price)).unwrap_or(0.0);

    scene.axes.push(linear_axis(
        AxisOrient::Bottom,
        surface.height - MARGIN.bottom,
        &x,
        "Average Unit Price (USD)",
        tick_label,
    ));
    scene.axes.push(linear_axis(
        AxisOrient::Left,
        MARGIN.left,
        &y,
        "GMV (Million USD)",
        gmv_tick,
    ));

    // Top shops go last so they draw above the grey cloud.
    let (top, rest): (Vec<&RankedShop<'_>>, Vec<&RankedShop<'_>>) =
        plotted.into_iter().partition(|r| r.is_top);
    for member in rest.into_iter().chain(top) {
        let shop = member.shop;
        // A shop priced exactly at the median counts as high-priced.
        let price_group = if shop.unit_price < price_median {
            ScatterGroup::LowPrice
        } else {
            ScatterGroup::HighPrice
        };
        let radius = if member.is_top && highlight { 10.0 } else { 6.0 };
        let (fill, opacity) = if member.is_top {
            (TOP_FILL, 0.85)
        } else {
            (OTHER_FILL, 0.6)
        };

        let mut point = Mark::circle(x.map(shop.unit_price), y.map(shop.total_gmv), radius)
            .filled(fill)
            .opacity(opacity)
            .class(MarkClass::Highlightable)
            .class(MarkClass::Scatter(price_group))
            .tooltip(Tooltip::new(
                shop.shop_name.clone(),
                vec![
                    format!("Unit Price: ${:.1}", shop.unit_price),
                    format!("GMV: ${}", millions(shop.total_gmv, 2)),
                ],
            ));
        if member.is_top {
            point = point
                .class(MarkClass::Scatter(ScatterGroup::Top))
                .highlight_key(Highlight::Scatter(ScatterGroup::Top));
        }
        scene.push(point);
    }

    scene.legend = vec![
        LegendEntry {
            label: "Top Shops".to_string(),
            color: TOP_FILL,
            swatch: Swatch::Dot,
        },
        LegendEntry {
            label: "Other Shops".to_string(),
            color: OTHER_FILL,
            swatch: Swatch::Dot,
        },
    ];
    scene.legend_origin = (surface.width - MARGIN.right + 20.0, MARGIN.top);
    scene
}

fn gmv_tick(value: f64, step: f64) -> String {
    if value.abs() >= 1e6 {
        millions(value, 0)
    } else {
        tick_label(value, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ShopRecord;
    use crate::domain::CategoryFilter;
    use crate::rank::{fixtures::shop, rank_shops};
    use crate::scene::Shape;

    fn priced(name: &str, gmv: f64, price: f64) -> ShopRecord {
        ShopRecord {
            unit_price: price,
            ..shop(name, "Home", gmv)
        }
    }

    fn sample() -> Vec<ShopRecord> {
        vec![
            priced("a", 5_000_000.0, 12.0),
            priced("b", 3_000_000.0, 40.0),
            priced("c", 900_000.0, 8.0),
            priced("d", 400_000.0, 60.0),
        ]
    }

    #[test]
    fn price_groups_split_at_the_median() {
        let shops = sample();
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        let scene = render(&ranked, false, Surface::default());
        assert_eq!(scene.select(MarkClass::Scatter(ScatterGroup::LowPrice)).count(), 2);
        assert_eq!(scene.select(MarkClass::Scatter(ScatterGroup::HighPrice)).count(), 2);
        assert_eq!(scene.select(MarkClass::Scatter(ScatterGroup::Top)).count(), 1);
    }

    #[test]
    fn shop_at_the_median_price_is_high_priced() {
        let shops = vec![
            priced("cheap", 300.0, 10.0),
            priced("middle", 200.0, 20.0),
            priced("dear", 100.0, 30.0),
        ];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 0);
        let scene = render(&ranked, false, Surface::default());
        let names = |group| -> Vec<String> {
            scene
                .select(MarkClass::Scatter(group))
                .filter_map(|m| m.tooltip.as_ref().map(|t| t.title.clone()))
                .collect()
        };
        assert_eq!(names(ScatterGroup::LowPrice), vec!["cheap"]);
        assert_eq!(names(ScatterGroup::HighPrice), vec!["middle", "dear"]);
    }

    #[test]
    fn top_shops_grow_only_when_highlighted() {
        let shops = sample();
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        for (highlight, expected) in [(false, 6.0), (true, 10.0)] {
            let scene = render(&ranked, highlight, Surface::default());
            let top = scene.select(MarkClass::Scatter(ScatterGroup::Top)).next();
            assert!(matches!(
                top.map(|m| &m.shape),
                Some(Shape::Circle { r, .. }) if (r - expected).abs() < 1e-9
            ));
        }
    }

    #[test]
    fn tooltip_and_ticks_use_millions() {
        let shops = sample();
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        let scene = render(&ranked, false, Surface::default());
        let top = scene.select(MarkClass::Scatter(ScatterGroup::Top)).next();
        let lines = top.and_then(|m| m.tooltip.clone()).map(|t| t.lines);
        assert_eq!(
            lines,
            Some(vec!["Unit Price: $12.0".to_string(), "GMV: $5.00M".to_string()])
        );
        assert_eq!(gmv_tick(2_000_000.0, 500_000.0), "2M");
        assert_eq!(gmv_tick(500_000.0, 500_000.0), "500,000");
    }

    #[test]
    fn shops_without_price_are_skipped() {
        let shops = vec![priced("a", 10.0, f64::NAN)];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        let scene = render(&ranked, false, Surface::default());
        assert!(scene.placeholder.is_some());
    }
}
