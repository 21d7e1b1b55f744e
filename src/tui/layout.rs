use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen areas of the browser
pub struct AppLayout {
    pub input_area: Rect,
    pub results_area: Rect,
    pub detail_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Input box on top (3 rows), results (55%) beside the detail pane (45%),
    /// status bar on the bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(vertical_chunks[1]);

        Self {
            input_area: vertical_chunks[0],
            results_area: horizontal_chunks[0],
            detail_area: horizontal_chunks[1],
            status_area: vertical_chunks[2],
        }
    }
}
