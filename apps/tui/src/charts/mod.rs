//! Chart renderers. Every call builds a complete scene from scratch.

pub mod boxplot;
pub mod quadrant;
pub mod scatter;
pub mod stacked;

pub use quadrant::{QuadrantChart, Thresholds};

use crate::data::ShopRecord;
use crate::domain::{CategoryFilter, ChartId};
use crate::rank::rank_shops;
use crate::scale::{BandScale, LinearScale};
use crate::scene::{Axis, AxisOrient, Scene, Surface, Tick};

pub const NO_DATA: &str = "No data available";

/// Renders one of the scroll-driven charts for the current filter state.
pub fn render_chart(
    chart: ChartId,
    shops: &[ShopRecord],
    category: &CategoryFilter,
    top_n: usize,
    highlight: bool,
    surface: Surface,
) -> Scene {
    let ranked = rank_shops(shops, category, top_n);
    match chart {
        ChartId::Boxplot => boxplot::render(&ranked, highlight, surface),
        ChartId::StackedBar => stacked::render(&ranked, highlight, surface),
        ChartId::Scatter => scatter::render(&ranked, highlight, surface),
    }
}

pub(crate) fn linear_axis(
    orient: AxisOrient,
    offset: f64,
    scale: &LinearScale,
    title: &str,
    format: impl Fn(f64, f64) -> String,
) -> Axis {
    let values = scale.ticks();
    let step = match values.as_slice() {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    };
    Axis {
        orient,
        offset,
        range: scale.range,
        ticks: values
            .into_iter()
            .map(|value| Tick {
                position: scale.map(value),
                label: format(value, step),
            })
            .collect(),
        title: title.to_string(),
    }
}

pub(crate) fn band_axis(
    orient: AxisOrient,
    offset: f64,
    band: &BandScale,
    labels: &[&str],
    range: (f64, f64),
    title: &str,
) -> Axis {
    Axis {
        orient,
        offset,
        range,
        ticks: labels
            .iter()
            .enumerate()
            .filter_map(|(index, label)| {
                band.position(index).map(|start| Tick {
                    position: start + band.bandwidth() / 2.0,
                    label: (*label).to_string(),
                })
            })
            .collect(),
        title: title.to_string(),
    }
}

/// Default tick label: just enough decimals for the tick step, thousands
/// grouped with commas.
pub fn tick_label(value: f64, step: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10()).ceil() as usize
    } else {
        0
    };
    group_thousands(&format!("{value:.decimals$}"))
}

fn group_thousands(formatted: &str) -> String {
    let (sign, digits) = formatted
        .strip_prefix('-')
        .map_or(("", formatted), |rest| ("-", rest));
    let (int_part, frac_part) = digits
        .split_once('.')
        .map_or((digits, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::new();
    for (index, ch) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if grouped.chars().all(|c| c == '0' || c == ',') && frac_part.is_none() {
        ""
    } else {
        sign
    };

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Whole numbers without decimals, anything else with up to two.
pub fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Millions with `decimals` places, e.g. `12M`.
pub fn millions(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}M", value / 1e6)
}

/// Stable pseudo-random offset in [-0.5, 0.5) derived from a name, so dots
/// land in the same place on every redraw.
pub fn jitter(name: &str) -> f64 {
    let hash = name
        .bytes()
        .fold(0_u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    (hash % 1000) as f64 / 1000.0 - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_group_and_round() {
        assert_eq!(tick_label(1000.0, 500.0), "1,000");
        assert_eq!(tick_label(2_500_000.0, 500_000.0), "2,500,000");
        assert_eq!(tick_label(0.2, 0.2), "0.2");
        assert_eq!(tick_label(0.05, 0.05), "0.05");
        assert_eq!(tick_label(-1200.0, 200.0), "-1,200");
        assert_eq!(tick_label(0.0, 10.0), "0");
    }

    #[test]
    fn plain_numbers_trim_zeros() {
        assert_eq!(plain_number(42.0), "42");
        assert_eq!(plain_number(3.5), "3.5");
        assert_eq!(plain_number(2.125_01), "2.13");
    }

    #[test]
    fn millions_format() {
        assert_eq!(millions(12_400_000.0, 0), "12M");
        assert_eq!(millions(1_234_567.0, 2), "1.23M");
    }

    #[test]
    fn jitter_is_stable_and_bounded() {
        let a = jitter("Glow Shop");
        assert!((a - jitter("Glow Shop")).abs() < f64::EPSILON);
        for name in ["", "a", "a much longer shop name with spaces"] {
            let j = jitter(name);
            assert!((-0.5..0.5).contains(&j));
        }
    }
}
