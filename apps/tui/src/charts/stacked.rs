use crate::data::ShopRecord;
use crate::domain::{Metric, ShopGroup};
use crate::rank::RankedShop;
use crate::scale::{BandScale, LinearScale};
use crate::scene::{
    AxisOrient, LegendEntry, Margin, Mark, MarkClass, Rgb, RootClass, Scene, Surface, Swatch,
    Tooltip,
};
use crate::stats::mean;

use super::{band_axis, linear_axis, plain_number, tick_label, NO_DATA};

pub const TITLE: &str = "Top vs Non-top Shops: Engagement and Product Strategies";

const MARGIN: Margin = Margin::new(20.0, 150.0, 60.0, 70.0);
const SEGMENT_STROKE: Rgb = Rgb::hex(0x33_33_33);

pub const fn color(metric: Metric) -> Rgb {
    match metric {
        Metric::Creators => Rgb::hex(0x7a_ae_dc),
        Metric::Videos => Rgb::hex(0xfb_bd_65),
        Metric::Products => Rgb::hex(0xa6_d4_ae),
    }
}

const fn metric_value(shop: &ShopRecord, metric: Metric) -> f64 {
    match metric {
        Metric::Creators => shop.related_creators,
        Metric::Videos => shop.related_videos,
        Metric::Products => shop.selling_products,
    }
}

/// Per-group averages of one metric for every metric, bottom to top.
pub fn group_means(ranked: &[RankedShop<'_>], group: ShopGroup) -> [(Metric, f64); 3] {
    Metric::ALL.map(|metric| {
        let average = mean(
            ranked
                .iter()
                .filter(|r| ShopGroup::of(r.is_top) == group)
                .map(|r| metric_value(r.shop, metric)),
        )
        .unwrap_or(0.0);
        (metric, average)
    })
}

/// Average creators, videos and products per shop, stacked per group.
pub fn render(ranked: &[RankedShop<'_>], highlight: bool, surface: Surface) -> Scene {
    if ranked.is_empty() {
        return Scene::placeholder(surface, TITLE, NO_DATA);
    }

    let mut scene = Scene::new(surface);
    scene.title = Some(TITLE.to_string());
    scene.set_root_class(RootClass::StackedBar, true);

    let stacks = ShopGroup::ALL.map(|group| (group, group_means(ranked, group)));
    let tallest = stacks
        .iter()
        .map(|(_, means)| means.iter().map(|(_, v)| v).sum::<f64>())
        .fold(0.0, f64::max);

    let x_range = (MARGIN.left, surface.width - MARGIN.right);
    let band = BandScale::new(ShopGroup::ALL.len(), x_range, 0.3);
    let y = LinearScale::nice_extent((0.0, tallest), (surface.height - MARGIN.bottom, MARGIN.top));

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
        "Average Count (per shop)",
        tick_label,
    ));

    for (index, (group, means)) in stacks.iter().enumerate() {
        let Some(x0) = band.position(index) else {
            continue;
        };
        let mut base = 0.0;
        for (metric, value) in means {
            let top = base + value;
            let mut segment = Mark::rect(x0, y.map(top), band.bandwidth(), y.map(base) - y.map(top))
                .filled(color(*metric))
                .class(MarkClass::Highlightable)
                .class(MarkClass::Stack(*metric))
                .tooltip(Tooltip::new(
                    format!("{} Shops", group.label()),
                    vec![format!("{}: {}", metric.label(), plain_number(*value))],
                ));
            if highlight {
                segment = segment.stroked(SEGMENT_STROKE, 1.0);
            }
            scene.push(segment);
            base = top;
        }
    }

    scene.legend = Metric::ALL
        .iter()
        .rev()
        .map(|metric| LegendEntry {
            label: metric.label().to_string(),
            color: color(*metric),
            swatch: Swatch::Square,
        })
        .collect();
    scene.legend_origin = (surface.width - MARGIN.right + 20.0, MARGIN.top + 10.0);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryFilter;
    use crate::rank::{fixtures::shop, rank_shops};
    use crate::scene::Shape;

    fn engaged(name: &str, gmv: f64, creators: f64, videos: f64) -> ShopRecord {
        ShopRecord {
            related_creators: creators,
            related_videos: videos,
            ..shop(name, "Toys", gmv)
        }
    }

    #[test]
    fn means_follow_the_groups() {
        let shops = vec![
            engaged("a", 300.0, 10.0, 20.0),
            engaged("b", 200.0, 30.0, 40.0),
            engaged("c", 100.0, 2.0, f64::NAN),
        ];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 2);
        let top = group_means(&ranked, ShopGroup::Top);
        assert_eq!(top[0], (Metric::Creators, 20.0));
        assert_eq!(top[1], (Metric::Videos, 30.0));
        let rest = group_means(&ranked, ShopGroup::NonTop);
        assert_eq!(rest[1], (Metric::Videos, 0.0));
    }

    #[test]
    fn segments_stack_without_gaps() {
        let shops = vec![engaged("a", 300.0, 10.0, 20.0), engaged("b", 100.0, 5.0, 5.0)];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        let scene = render(&ranked, false, Surface::default());

        assert!(scene.has_root_class(RootClass::StackedBar));
        assert_eq!(scene.select(MarkClass::Highlightable).count(), 6);

        let rects: Vec<(f64, f64)> = scene
            .marks
            .iter()
            .take(3)
            .filter_map(|m| match m.shape {
                Shape::Rect { y, height, .. } => Some((y, height)),
                _ => None,
            })
            .collect();
        for pair in rects.windows(2) {
            assert!((pair[1].0 + pair[1].1 - pair[0].0).abs() < 1e-9);
        }
    }

    #[test]
    fn tooltips_name_group_and_metric() {
        let shops = vec![engaged("a", 300.0, 10.0, 20.0)];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        let scene = render(&ranked, true, Surface::default());
        let video = scene
            .select(MarkClass::Stack(Metric::Videos))
            .find(|m| m.tooltip.as_ref().is_some_and(|t| t.title == "Top Shops"));
        let tooltip = video.and_then(|m| m.tooltip.clone());
        assert_eq!(
            tooltip.map(|t| t.lines),
            Some(vec!["Related Videos: 20".to_string()])
        );
        assert!(scene.marks.iter().all(|m| m.stroke.is_some()));
    }
}
