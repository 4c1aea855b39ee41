use serde::Serialize;

use crate::data::CategoryAggregate;
use crate::domain::Quadrant;
use crate::scale::LinearScale;
use crate::scene::{
    Anchor, AxisOrient, LegendEntry, Mark, MarkClass, Rgb, Scene, Surface, Swatch, Tooltip,
};
use crate::stats::{extent, mean};

use super::{linear_axis, millions, tick_label, NO_DATA};

pub const TITLE: &str = "Category Quadrants: GMV vs Video Promotion";

const PADDING: f64 = 60.0;
const LABEL_COLOR: Rgb = Rgb::hex(0x34_49_5e);
const DIVIDER_COLOR: Rgb = Rgb(128, 128, 128);
/// Threshold sliders move in this many steps across their range.
const SLIDER_STEPS: f64 = 50.0;

pub const fn color(quadrant: Quadrant) -> Rgb {
    match quadrant {
        Quadrant::CashCow => Rgb::hex(0x1f_77_b4),
        Quadrant::Focused => Rgb::hex(0x2c_a0_2c),
        Quadrant::Weak => Rgb::hex(0xd6_27_28),
        Quadrant::Potential => Rgb::hex(0xff_7f_0e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Average GMV in USD.
    pub x: f64,
    /// Average related-video count.
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdAxis {
    Gmv,
    Videos,
}

/// Category aggregates split into quadrants by two adjustable thresholds.
/// Scales are fixed at construction; only the thresholds move.
#[derive(Debug, Clone)]
pub struct QuadrantChart {
    categories: Vec<CategoryAggregate>,
    surface: Surface,
    x: LinearScale,
    y: LinearScale,
    defaults: Thresholds,
    thresholds: Thresholds,
}

impl QuadrantChart {
    pub fn new(categories: &[CategoryAggregate], surface: Surface) -> Self {
        let categories: Vec<CategoryAggregate> = categories
            .iter()
            .filter(|c| !(c.avg_gmv.is_nan() || c.avg_videos.is_nan()))
            .cloned()
            .collect();

        let x_extent = extent(categories.iter().map(|c| c.avg_gmv)).unwrap_or((0.0, 1.0));
        let y_extent = extent(categories.iter().map(|c| c.avg_videos)).unwrap_or((0.0, 1.0));
        let x = LinearScale::nice_extent(x_extent, (PADDING, surface.width - PADDING));
        let y = LinearScale::nice_extent(y_extent, (surface.height - PADDING, PADDING));

        let defaults = Thresholds {
            x: mean(categories.iter().map(|c| c.avg_gmv)).unwrap_or(0.0),
            y: mean(categories.iter().map(|c| c.avg_videos)).unwrap_or(0.0),
        };

        Self {
            categories,
            surface,
            x,
            y,
            defaults,
            thresholds: defaults,
        }
    }

    pub const fn defaults(&self) -> Thresholds {
        self.defaults
    }

    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Upper bounds of the threshold sliders: the top of each nice domain.
    pub const fn slider_max(&self) -> Thresholds {
        Thresholds {
            x: self.x.domain.1,
            y: self.y.domain.1,
        }
    }

    /// Values are clamped to `[0, slider_max]`, like a range input.
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        let max = self.slider_max();
        self.thresholds = Thresholds {
            x: clamp_slider(thresholds.x, max.x),
            y: clamp_slider(thresholds.y, max.y),
        };
    }

    /// Moves one threshold by whole slider steps.
    pub fn nudge(&mut self, axis: ThresholdAxis, steps: i32) {
        let max = self.slider_max();
        let mut next = self.thresholds;
        match axis {
            ThresholdAxis::Gmv => next.x += f64::from(steps) * max.x / SLIDER_STEPS,
            ThresholdAxis::Videos => next.y += f64::from(steps) * max.y / SLIDER_STEPS,
        }
        self.set_thresholds(next);
    }

    pub fn reset_thresholds(&mut self) {
        self.thresholds = self.defaults;
    }

    pub fn classify(&self, category: &CategoryAggregate) -> Quadrant {
        Quadrant::classify(
            category.avg_gmv,
            category.avg_videos,
            self.thresholds.x,
            self.thresholds.y,
        )
    }

    /// Category count per quadrant under the current thresholds.
    pub fn counts(&self) -> [(Quadrant, usize); 4] {
        Quadrant::ALL.map(|quadrant| {
            let count = self
                .categories
                .iter()
                .filter(|c| self.classify(c) == quadrant)
                .count();
            (quadrant, count)
        })
    }

    pub fn scene(&self) -> Scene {
        if self.categories.is_empty() {
            return Scene::placeholder(self.surface, TITLE, NO_DATA);
        }
        let (x, y, surface) = (&self.x, &self.y, self.surface);
        let Thresholds { x: tx, y: ty } = self.thresholds;

        let mut scene = Scene::new(surface);
        scene.title = Some(TITLE.to_string());
        scene.axes.push(linear_axis(
            AxisOrient::Bottom,
            surface.height - PADDING,
            x,
            "Average GMV (USD)",
            |value, _| millions(value, 0),
        ));
        scene.axes.push(linear_axis(
            AxisOrient::Left,
            PADDING,
            y,
            "Average number of videos (count)",
            tick_label,
        ));

        scene.push(
            Mark::line(x.map(tx), PADDING, x.map(tx), surface.height - PADDING)
                .stroked(DIVIDER_COLOR, 1.0)
                .dashed()
                .class(MarkClass::Divider),
        );
        scene.push(
            Mark::text(
                x.map(tx) + 5.0,
                PADDING + 15.0,
                format!("${}", millions(tx, 0)),
                Anchor::Start,
            )
            .class(MarkClass::Divider),
        );
        scene.push(
            Mark::line(PADDING, y.map(ty), surface.width - PADDING, y.map(ty))
                .stroked(DIVIDER_COLOR, 1.0)
                .dashed()
                .class(MarkClass::Divider),
        );
        scene.push(
            Mark::text(
                surface.width - PADDING - 40.0,
                y.map(ty) - 6.0,
                format!("{ty:.0}"),
                Anchor::End,
            )
            .class(MarkClass::Divider),
        );

        let (left, right) = (x.map(x.domain.0), x.map(x.domain.1));
        let (bottom, top) = (y.map(y.domain.0), y.map(y.domain.1));
        for quadrant in Quadrant::ALL {
            let (label_x, label_y) = match quadrant {
                Quadrant::CashCow => ((right + x.map(tx)) / 2.0, (top + y.map(ty)) / 2.0),
                Quadrant::Focused => ((right + x.map(tx)) / 2.0, (bottom + y.map(ty)) / 2.0),
                Quadrant::Weak => ((left + x.map(tx)) / 2.0, (bottom + y.map(ty)) / 2.0),
                Quadrant::Potential => ((left + x.map(tx)) / 2.0, (top + y.map(ty)) / 2.0),
            };
            scene.push(
                Mark::text(label_x, label_y, quadrant.label(), Anchor::Middle)
                    .filled(LABEL_COLOR)
                    .sized(18.0, true)
                    .class(MarkClass::QuadrantLabel),
            );
        }

        for category in &self.categories {
            scene.push(
                Mark::circle(x.map(category.avg_gmv), y.map(category.avg_videos), 10.0)
                    .filled(color(self.classify(category)))
                    .opacity(0.7)
                    .class(MarkClass::QuadrantPoint)
                    .tooltip(Tooltip::new(
                        category.category.clone(),
                        vec![
                            format!("GMV: ${}", millions(category.avg_gmv, 0)),
                            format!("videos count: {:.0}", category.avg_videos.round()),
                        ],
                    )),
            );
        }

        scene.legend = Quadrant::ALL
            .iter()
            .map(|quadrant| LegendEntry {
                label: quadrant.label().to_string(),
                color: color(*quadrant),
                swatch: Swatch::Dot,
            })
            .collect();
        scene.legend_origin = (surface.width - PADDING - 110.0, PADDING);
        scene
    }
}

fn clamp_slider(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(category: &str, gmv: f64, videos: f64) -> CategoryAggregate {
        CategoryAggregate {
            category: category.to_string(),
            avg_gmv: gmv,
            avg_videos: videos,
        }
    }

    fn sample() -> Vec<CategoryAggregate> {
        vec![
            aggregate("Beauty", 9_000_000.0, 400.0),
            aggregate("Toys", 1_000_000.0, 50.0),
            aggregate("Home", 7_000_000.0, 60.0),
            aggregate("Sports", 2_000_000.0, 380.0),
        ]
    }

    #[test]
    fn thresholds_default_to_means() {
        let chart = QuadrantChart::new(&sample(), Surface::default());
        assert_eq!(chart.defaults(), Thresholds { x: 4_750_000.0, y: 222.5 });
        assert_eq!(chart.slider_max(), Thresholds { x: 9_000_000.0, y: 400.0 });
    }

    #[test]
    fn every_quadrant_is_used_once() {
        let chart = QuadrantChart::new(&sample(), Surface::default());
        assert!(chart.counts().iter().all(|(_, count)| *count == 1));
        let colors: Vec<Option<Rgb>> = chart
            .scene()
            .select(MarkClass::QuadrantPoint)
            .map(|m| m.fill)
            .collect();
        assert_eq!(
            colors,
            vec![
                Some(color(Quadrant::CashCow)),
                Some(color(Quadrant::Weak)),
                Some(color(Quadrant::Focused)),
                Some(color(Quadrant::Potential)),
            ]
        );
    }

    #[test]
    fn moving_thresholds_rebuilds_labels() {
        let mut chart = QuadrantChart::new(&sample(), Surface::default());
        chart.set_thresholds(Thresholds { x: 0.0, y: 0.0 });
        assert_eq!(chart.counts()[0], (Quadrant::CashCow, 4));

        let scene = chart.scene();
        let labels: Vec<String> = scene
            .select(MarkClass::Divider)
            .filter_map(|m| match &m.shape {
                crate::scene::Shape::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["$0M".to_string(), "0".to_string()]);
    }

    #[test]
    fn sliders_clamp_to_their_range() {
        let mut chart = QuadrantChart::new(&sample(), Surface::default());
        chart.set_thresholds(Thresholds { x: -5.0, y: 10_000.0 });
        assert_eq!(chart.thresholds(), Thresholds { x: 0.0, y: 400.0 });
        chart.nudge(ThresholdAxis::Videos, -1);
        assert!((chart.thresholds().y - 392.0).abs() < 1e-9);
        chart.reset_thresholds();
        assert_eq!(chart.thresholds(), chart.defaults());
    }

    #[test]
    fn tooltips_round_values() {
        let chart = QuadrantChart::new(&[aggregate("Beauty", 12_400_000.0, 81.6)], Surface::default());
        let scene = chart.scene();
        let tooltip = scene
            .select(MarkClass::QuadrantPoint)
            .next()
            .and_then(|m| m.tooltip.clone());
        assert_eq!(
            tooltip,
            Some(Tooltip::new(
                "Beauty",
                vec!["GMV: $12M".to_string(), "videos count: 82".to_string()]
            ))
        );
    }

    #[test]
    fn empty_aggregates_draw_placeholder() {
        let chart = QuadrantChart::new(&[], Surface::default());
        assert!(chart.scene().placeholder.is_some());
    }
}
