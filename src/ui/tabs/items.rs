use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_optional, truncate_string};

/// Render the Items tab - catalog table with a detail pane
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_item_table(frame, app, panes[0]);
    render_item_detail(frame, app, panes[1]);
}

fn render_item_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Name"), Cell::from("Type"), Cell::from("Photo")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .lov_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.item_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let photo_marker = if item.photo.is_some() { "✓" } else { "-" };

            Row::new(vec![
                Cell::from(truncate_string(&item.name, 28)),
                Cell::from(item.item_type.as_str()),
                Cell::from(photo_marker),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(3),    // Name
        Constraint::Length(12), // Type
        Constraint::Length(6),  // Photo
    ];

    let title = format!(" Catalog ({}) - [a]dd [e]dit [d]elete ", app.lov_items.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.item_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_item_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_item() {
        Some(item) => {
            vec![
                Line::from(Span::styled(item.name.clone(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Type:  ", styles::muted_style()),
                    Span::raw(item.item_type.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Photo: ", styles::muted_style()),
                    Span::raw(truncate_string(&format_optional(&item.photo, "-"), 48)),
                ]),
            ]
        }
        None => vec![Line::from(Span::styled(
            " No items. Press [a] to add one.",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Item ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
