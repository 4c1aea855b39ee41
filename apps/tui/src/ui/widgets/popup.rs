use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::prelude::Buffer;
use ratatui::widgets::Widget;

/// A box of `percent_x` by `percent_y` of `area`, centered in it.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

/// A `width` x `height` box next to the cell `(column, row)`: right of it,
/// above it when there is room, and always inside `area`.
pub fn beside_cell(area: Rect, (column, row): (u16, u16), width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = column
        .saturating_add(2)
        .min(area.right().saturating_sub(width))
        .max(area.x);
    let y = if row >= area.y + height {
        row - height
    } else {
        row.saturating_add(1)
            .min(area.bottom().saturating_sub(height))
            .max(area.y)
    };
    Rect::new(x, y, width, height)
}

/// Blanks the cells under a popup before it is drawn.
pub struct ClearWidget;

impl Widget for ClearWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        ratatui::widgets::Clear.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_sits_in_the_middle() {
        let popup = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(popup, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn beside_cell_prefers_above_and_right() {
        let area = Rect::new(10, 5, 40, 20);
        assert_eq!(beside_cell(area, (20, 15), 10, 4), Rect::new(22, 11, 10, 4));
    }

    #[test]
    fn beside_cell_stays_inside_the_area() {
        let area = Rect::new(10, 5, 40, 20);
        // Near the top-right corner: shifted left, dropped below the cell.
        assert_eq!(beside_cell(area, (48, 6), 10, 4), Rect::new(40, 7, 10, 4));
        assert_eq!(beside_cell(area, (12, 5), 80, 30), area);
    }
}
