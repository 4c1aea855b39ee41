//! The narrative script: ordered steps, each naming the chart it drives and
//! what that chart should emphasise.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ChartId, Highlight, Metric, ScatterGroup};
use crate::error::{Result, StoryError};

/// Id of the step the scroll reset brings back into view.
pub const ANCHOR_ID: &str = "chart2-anchor-step";

pub const QUADRANT_HEADING: &str = "Where does each category stand?";
pub const QUADRANT_TEXT: &str = "Each dot is a product category, placed by the average GMV of its \
shops and the average number of promotional videos behind them. Move the dashed thresholds with \
x/X and y/Y to see which categories turn into cash cows and which only show potential.";

pub const SUMMARY_HEADING: &str = "What it takes";
pub const SUMMARY_TEXT: &str = "Top shops are not the ones with the biggest catalogues. They win \
on engagement: more creators, many more videos, and a price point that does not need to be the \
cheapest. Pick a category where video promotion pays, keep the product line focused, and invest \
in the creators who will talk about it.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeStep {
    pub id: Option<String>,
    #[serde(serialize_with = "chart_name")]
    pub chart: ChartId,
    #[serde(serialize_with = "highlight_name")]
    pub highlight: Highlight,
    pub text: String,
}

impl NarrativeStep {
    pub fn new(chart: ChartId, highlight: Highlight, text: impl Into<String>) -> Self {
        Self {
            id: None,
            chart,
            highlight,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_anchor(&self) -> bool {
        self.id.as_deref() == Some(ANCHOR_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    steps: Vec<NarrativeStep>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    id: Option<String>,
    chart: String,
    #[serde(default)]
    highlight: Option<String>,
    text: String,
}

impl Story {
    /// Validates every step: known chart, known highlight, and a highlight
    /// that belongs to the step's chart.
    pub fn new(steps: Vec<NarrativeStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(StoryError::EmptyStory);
        }
        for (index, step) in steps.iter().enumerate() {
            if !step.highlight.fits(step.chart) {
                return Err(StoryError::HighlightMismatch {
                    step: index + 1,
                    chart: step.chart.as_str(),
                    highlight: step.highlight.as_str(),
                });
            }
        }
        Ok(Self { steps })
    }

    pub fn from_json_str(json: &str, path: &Path) -> Result<Self> {
        let raw: Vec<RawStep> = serde_json::from_str(json).map_err(|source| StoryError::Json {
            path: PathBuf::from(path),
            source,
        })?;

        let steps = raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let chart = ChartId::parse(&raw.chart).ok_or_else(|| StoryError::UnknownChart {
                    step: index + 1,
                    chart: raw.chart.clone(),
                })?;
                let highlight_text = raw.highlight.unwrap_or_default();
                let highlight = Highlight::parse(&highlight_text).ok_or_else(|| {
                    StoryError::UnknownHighlight {
                        step: index + 1,
                        highlight: highlight_text.clone(),
                    }
                })?;
                Ok(NarrativeStep {
                    id: raw.id,
                    chart,
                    highlight,
                    text: raw.text,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(steps)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoryError::Io {
                path: PathBuf::from(path),
                source,
            })?;
        let story = Self::from_json_str(&json, path)?;
        info!(path = %path.display(), steps = story.len(), "story loaded");
        Ok(story)
    }

    pub fn steps(&self) -> &[NarrativeStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&NarrativeStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn anchor_index(&self) -> Option<usize> {
        self.steps.iter().position(NarrativeStep::is_anchor)
    }

    pub fn default_story() -> Self {
        use ChartId::{Boxplot, Scatter, StackedBar};

        let steps = vec![
            NarrativeStep::new(
                Boxplot,
                Highlight::None,
                "Start with the catalogue. Shops are split into the top N by GMV and everyone \
                 else, and each dot is one shop's number of selling products.",
            )
            .with_id(ANCHOR_ID),
            NarrativeStep::new(
                Boxplot,
                Highlight::BoxCore,
                "The boxes hold the middle half of each group. Top shops do not carry a much \
                 larger catalogue than the rest; their median sits close to everyone else's.",
            ),
            NarrativeStep::new(
                Boxplot,
                Highlight::BoxOutliers,
                "The outliers tell the same story from the other side: the shops listing \
                 hundreds of products are rarely the ones at the top.",
            ),
            NarrativeStep::new(
                StackedBar,
                Highlight::None,
                "So what does separate them? Stack the averages of creators, videos and \
                 products per shop for both groups.",
            ),
            NarrativeStep::new(
                StackedBar,
                Highlight::Stack(Metric::Creators),
                "Top shops work with far more creators, spreading their products across many \
                 voices.",
            ),
            NarrativeStep::new(
                StackedBar,
                Highlight::Stack(Metric::Videos),
                "Videos make up the largest gap. The top group publishes several times as many \
                 related videos as the rest.",
            ),
            NarrativeStep::new(
                StackedBar,
                Highlight::Stack(Metric::Products),
                "Product count is the thinnest slice of the stack and barely differs between \
                 the groups.",
            ),
            NarrativeStep::new(
                Scatter,
                Highlight::None,
                "Last, price. Every shop is placed by its average unit price and its GMV.",
            ),
            NarrativeStep::new(
                Scatter,
                Highlight::Scatter(ScatterGroup::Top),
                "The top shops, in red, are spread over the whole price range rather than \
                 clustered at the cheap end.",
            ),
            NarrativeStep::new(
                Scatter,
                Highlight::Scatter(ScatterGroup::LowPrice),
                "Shops priced below the median crowd the bottom of the chart; a low price alone \
                 does not bring volume.",
            ),
            NarrativeStep::new(
                Scatter,
                Highlight::Scatter(ScatterGroup::HighPrice),
                "Above the median price the spread widens, and some of the largest GMVs come \
                 from shops that charge more.",
            ),
        ];
        Self { steps }
    }
}

fn chart_name<S: serde::Serializer>(
    chart: &ChartId,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(chart.as_str())
}

fn highlight_name<S: serde::Serializer>(
    highlight: &Highlight,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(highlight.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Story> {
        Story::from_json_str(json, Path::new("steps.json"))
    }

    #[test]
    fn default_story_is_valid_and_anchored() {
        let story = Story::default_story();
        assert!(Story::new(story.steps().to_vec()).is_ok());
        assert_eq!(story.anchor_index(), Some(0));
        assert_eq!(story.step(0).map(|s| s.chart), Some(ChartId::Boxplot));
    }

    #[test]
    fn parses_steps_in_document_order() {
        let story = parse(
            r#"[
                {"id": "chart2-anchor-step", "chart": "chart2", "text": "a"},
                {"chart": "chart4", "highlight": "scatter-top", "text": "b"},
                {"chart": "chart3", "highlight": "none", "text": "c"}
            ]"#,
        )
        .unwrap();
        assert_eq!(story.len(), 3);
        assert_eq!(story.anchor_index(), Some(0));
        assert_eq!(
            story.step(1).map(|s| s.highlight),
            Some(Highlight::Scatter(ScatterGroup::Top))
        );
        assert_eq!(story.step(2).map(|s| s.highlight), Some(Highlight::None));
    }

    #[test]
    fn rejects_unknown_identifiers() {
        let err = parse(r#"[{"chart": "chart9", "text": "a"}]"#).unwrap_err();
        assert!(matches!(err, StoryError::UnknownChart { step: 1, .. }));

        let err = parse(r#"[{"chart": "chart2", "text": "a"}, {"chart": "chart3", "highlight": "stack-mood", "text": "b"}]"#)
            .unwrap_err();
        assert!(matches!(err, StoryError::UnknownHighlight { step: 2, .. }));
    }

    #[test]
    fn rejects_highlight_on_the_wrong_chart() {
        let err = parse(r#"[{"chart": "chart2", "highlight": "scatter-low", "text": "a"}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            StoryError::HighlightMismatch {
                step: 1,
                chart: "chart2",
                highlight: "scatter-low"
            }
        ));
    }

    #[test]
    fn rejects_empty_and_malformed_scripts() {
        assert!(matches!(parse("[]"), Err(StoryError::EmptyStory)));
        assert!(matches!(parse("{"), Err(StoryError::Json { .. })));
    }

    #[test]
    fn story_without_anchor_has_no_anchor_index() {
        let story = parse(r#"[{"chart": "chart3", "text": "a"}]"#).unwrap();
        assert_eq!(story.anchor_index(), None);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = Story::load(Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoryError::Io { .. }));
    }
}
