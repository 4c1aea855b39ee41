/// Charts driven by the narrative steps. The quadrant chart lives in its own
/// section and is not addressed by steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    Boxplot,
    StackedBar,
    Scatter,
}

impl ChartId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boxplot => "chart2",
            Self::StackedBar => "chart3",
            Self::Scatter => "chart4",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "chart2" => Some(Self::Boxplot),
            "chart3" => Some(Self::StackedBar),
            "chart4" => Some(Self::Scatter),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Boxplot => "Boxplot",
            Self::StackedBar => "Stacked bar",
            Self::Scatter => "Price scatter",
        }
    }
}

/// Per-shop metrics stacked in the bar chart, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Creators,
    Videos,
    Products,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::Creators, Self::Videos, Self::Products];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creators => "stack-creator",
            Self::Videos => "stack-video",
            Self::Products => "stack-product",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Creators => "Related Creators",
            Self::Videos => "Related Videos",
            Self::Products => "Selling Products",
        }
    }
}

/// Point groups the scatter chart can spotlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScatterGroup {
    Top,
    LowPrice,
    HighPrice,
}

impl ScatterGroup {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "scatter-top",
            Self::LowPrice => "scatter-low",
            Self::HighPrice => "scatter-high",
        }
    }
}

/// What a narrative step asks its chart to emphasise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    None,
    BoxCore,
    BoxOutliers,
    Stack(Metric),
    Scatter(ScatterGroup),
}

impl Highlight {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BoxCore => "box-core",
            Self::BoxOutliers => "box-outliers",
            Self::Stack(metric) => metric.as_str(),
            Self::Scatter(group) => group.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "box-core" => Some(Self::BoxCore),
            "box-outliers" => Some(Self::BoxOutliers),
            "stack-creator" => Some(Self::Stack(Metric::Creators)),
            "stack-video" => Some(Self::Stack(Metric::Videos)),
            "stack-product" => Some(Self::Stack(Metric::Products)),
            "scatter-top" => Some(Self::Scatter(ScatterGroup::Top)),
            "scatter-low" => Some(Self::Scatter(ScatterGroup::LowPrice)),
            "scatter-high" => Some(Self::Scatter(ScatterGroup::HighPrice)),
            _ => None,
        }
    }

    /// Whether this highlight can be applied to `chart`.
    pub const fn fits(self, chart: ChartId) -> bool {
        matches!(
            (self, chart),
            (Self::None, _)
                | (Self::BoxCore | Self::BoxOutliers, ChartId::Boxplot)
                | (Self::Stack(_), ChartId::StackedBar)
                | (Self::Scatter(_), ChartId::Scatter)
        )
    }
}

/// Split used by the boxplot and the stacked bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShopGroup {
    Top,
    NonTop,
}

impl ShopGroup {
    pub const ALL: [Self; 2] = [Self::Top, Self::NonTop];

    pub const fn of(is_top: bool) -> Self {
        if is_top {
            Self::Top
        } else {
            Self::NonTop
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::NonTop => "Non-top",
        }
    }
}

/// Category restriction applied before ranking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "All" {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Only(selected) => selected,
        }
    }
}

/// Quadrant of the category-aggregate chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    CashCow,
    Focused,
    Weak,
    Potential,
}

impl Quadrant {
    pub const ALL: [Self; 4] = [Self::CashCow, Self::Focused, Self::Weak, Self::Potential];

    /// Values equal to a threshold count as meeting it.
    pub fn classify(x: f64, y: f64, x_threshold: f64, y_threshold: f64) -> Self {
        match (x >= x_threshold, y >= y_threshold) {
            (true, true) => Self::CashCow,
            (true, false) => Self::Focused,
            (false, false) => Self::Weak,
            (false, true) => Self::Potential,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CashCow => "Cash Cow",
            Self::Focused => "Focused",
            Self::Weak => "Weak",
            Self::Potential => "Potential",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_boundaries_meet_threshold() {
        assert_eq!(Quadrant::classify(5.0, 5.0, 5.0, 5.0), Quadrant::CashCow);
        assert_eq!(Quadrant::classify(5.0, 4.9, 5.0, 5.0), Quadrant::Focused);
        assert_eq!(Quadrant::classify(4.9, 4.9, 5.0, 5.0), Quadrant::Weak);
        assert_eq!(Quadrant::classify(4.9, 5.0, 5.0, 5.0), Quadrant::Potential);
    }

    #[test]
    fn quadrant_partition_is_total_and_exclusive() {
        let samples = [-1.0, 0.0, 0.5, 1.0, 2.0];
        for x in samples {
            for y in samples {
                let quadrant = Quadrant::classify(x, y, 1.0, 0.5);
                let hits = [
                    x >= 1.0 && y >= 0.5,
                    x >= 1.0 && y < 0.5,
                    x < 1.0 && y < 0.5,
                    x < 1.0 && y >= 0.5,
                ];
                assert_eq!(hits.iter().filter(|hit| **hit).count(), 1);
                let index = Quadrant::ALL.iter().position(|q| *q == quadrant);
                assert_eq!(index.map(|i| hits[i]), Some(true));
            }
        }
    }

    #[test]
    fn highlight_parse_and_fit() {
        assert_eq!(Highlight::parse("none"), Some(Highlight::None));
        assert_eq!(
            Highlight::parse("stack-video"),
            Some(Highlight::Stack(Metric::Videos))
        );
        assert_eq!(Highlight::parse("scatter-nope"), None);
        assert!(Highlight::BoxOutliers.fits(ChartId::Boxplot));
        assert!(!Highlight::Scatter(ScatterGroup::Top).fits(ChartId::StackedBar));
        assert!(Highlight::None.fits(ChartId::Scatter));
    }

    #[test]
    fn chart_ids_round_trip_page_names() {
        for chart in [ChartId::Boxplot, ChartId::StackedBar, ChartId::Scatter] {
            assert_eq!(ChartId::parse(chart.as_str()), Some(chart));
        }
        assert_eq!(ChartId::parse("chart1"), None);
    }

    #[test]
    fn category_filter_all_sentinel() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert!(CategoryFilter::All.matches("Toys"));
        let beauty = CategoryFilter::parse("Beauty");
        assert!(beauty.matches("Beauty"));
        assert!(!beauty.matches("Toys"));
    }
}
