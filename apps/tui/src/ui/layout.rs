use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Regions of the story screen. Input handling uses the same split to map
/// pointer positions onto the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryAreas {
    pub title: Rect,
    pub narrative: Rect,
    pub filter: Option<Rect>,
    pub chart: Rect,
    pub status: Rect,
    pub shortcuts: Rect,
}

pub fn story_areas(area: Rect, filter_visible: bool) -> StoryAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(8),    // Narrative and chart
            Constraint::Length(3), // Status
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(area.inner(Margin::new(2, 1)));

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(rows[1]);

    let (filter, chart) = if filter_visible {
        let column = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(body[1]);
        (Some(column[0]), column[1])
    } else {
        (None, body[1])
    };

    StoryAreas {
        title: rows[0],
        narrative: body[0],
        filter,
        chart,
        status: rows[2],
        shortcuts: rows[3],
    }
}

/// Text area of the narrative column: the page viewport. Independent of the
/// filter bar, so hiding the bar never re-lays out the page.
pub fn narrative_viewport(area: Rect) -> Rect {
    story_areas(area, true).narrative.inner(Margin::new(2, 1))
}

/// Drawing area inside the chart block's border.
pub fn chart_canvas(area: Rect, filter_visible: bool) -> Rect {
    story_areas(area, filter_visible).chart.inner(Margin::new(1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_bar_only_takes_chart_rows() {
        let area = Rect::new(0, 0, 120, 40);
        let with_bar = story_areas(area, true);
        let without = story_areas(area, false);
        assert_eq!(with_bar.narrative, without.narrative);
        assert!(with_bar.filter.is_some());
        assert!(without.filter.is_none());
        assert_eq!(without.chart.height, with_bar.chart.height + 3);
    }

    #[test]
    fn viewport_sits_inside_the_narrative_block() {
        let area = Rect::new(0, 0, 120, 40);
        let viewport = narrative_viewport(area);
        let narrative = story_areas(area, true).narrative;
        assert_eq!(viewport.width, narrative.width - 4);
        assert_eq!(viewport.height, narrative.height - 2);
    }
}
