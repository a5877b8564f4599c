use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::models::{Transaction, UserSortColumn};
use crate::ui::styles;
use crate::utils::{format_date, format_kg, truncate_string};

/// Render the Users tab - stat cards, sortable table, transaction detail
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stat cards
            Constraint::Min(5),    // Table + detail
        ])
        .split(area);

    render_stat_cards(frame, app, chunks[0]);

    if app.expanded_user.is_some() {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        render_user_table(frame, app, panes[0]);
        render_user_detail(frame, app, panes[1]);
    } else {
        render_user_table(frame, app, chunks[1]);
    }
}

fn render_stat_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let stats = [
        ("Users", app.users.len().to_string()),
        ("Income (kg)", format_kg(app.total_income_kg())),
        ("Expense (kg)", format_kg(app.total_expense_kg())),
    ];

    for (i, (label, value)) in stats.iter().enumerate() {
        let line = Line::from(vec![
            Span::styled(format!(" {}: ", label), styles::muted_style()),
            Span::styled(value.clone(), styles::title_style()),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::muted_style());
        frame.render_widget(Paragraph::new(line).block(block), cards[i]);
    }
}

fn render_user_table(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.visible_users();

    // Build header with sort indicators
    let sort_indicator = |col: UserSortColumn| {
        if app.user_sort_column == col {
            if app.user_sort_ascending { " ▲" } else { " ▼" }
        } else {
            ""
        }
    };

    let header_cells = [
        Cell::from(format!("Name{}", sort_indicator(UserSortColumn::Name))),
        Cell::from(format!("Email{}", sort_indicator(UserSortColumn::Email))),
        Cell::from("Items"),
        Cell::from(format!("In (kg){}", sort_indicator(UserSortColumn::IncomeKg))),
        Cell::from(format!("Out (kg){}", sort_indicator(UserSortColumn::ExpenseKg))),
    ];

    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.user_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(truncate_string(&user.name, 24)),
                Cell::from(truncate_string(&user.email, 28)),
                Cell::from(format!("{:>5}", user.items.len())),
                Cell::from(format!("{:>8}", format_kg(user.total_income_kg()))),
                Cell::from(format!("{:>8}", format_kg(user.total_expense_kg()))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(28), // Name
        Constraint::Fill(2),        // Email
        Constraint::Length(6),      // Item count
        Constraint::Length(10),     // Income
        Constraint::Length(10),     // Expense
    ];

    let sort_help = "[n]ame [e]mail [i]ncome e[x]pense";
    let title = format!(" Users ({}) - {} ", users.len(), sort_help);

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
    state.select(Some(app.user_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_user_detail(frame: &mut Frame, app: &App, area: Rect) {
    let expanded = app
        .expanded_user
        .and_then(|id| app.users.iter().find(|u| u.id == id));

    let user = match expanded {
        Some(user) => user,
        None => {
            let block = Block::default()
                .title(" Transactions ")
                .borders(Borders::ALL)
                .border_style(styles::muted_style());
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    " Select a user and press Enter ",
                    styles::muted_style(),
                )))
                .block(block),
                area,
            );
            return;
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(user.name.clone(), styles::title_style())),
        Line::from(Span::styled(user.email.clone(), styles::muted_style())),
        Line::from(""),
    ];

    lines.push(Line::from(Span::styled(
        format!("Income ({} kg)", format_kg(user.total_income_kg())),
        styles::highlight_style(),
    )));
    push_transaction_lines(&mut lines, &user.incomes);

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Expense ({} kg)", format_kg(user.total_expense_kg())),
        styles::highlight_style(),
    )));
    push_transaction_lines(&mut lines, &user.expenses);

    let block = Block::default()
        .title(format!(" Transactions: {} ", truncate_string(&user.name, 24)))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn push_transaction_lines(lines: &mut Vec<Line>, transactions: &[Transaction]) {
    if transactions.is_empty() {
        lines.push(Line::from(Span::styled("  -", styles::muted_style())));
        return;
    }

    for tx in transactions {
        let item = tx
            .item
            .as_ref()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "-".to_string());
        let qty = tx.total_quantity_kg.map(format_kg).unwrap_or_else(|| "-".to_string());
        let date = tx
            .created_at
            .as_deref()
            .map(format_date)
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(vec![
            Span::raw(format!("  {:<18}", truncate_string(&item, 18))),
            Span::styled(format!("{:>7} kg  ", qty), styles::list_item_style()),
            Span::styled(date, styles::muted_style()),
        ]));

        if let Some(note) = tx.note.as_deref().filter(|n| !n.trim().is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("    {}", truncate_string(note, 40)),
                styles::muted_style(),
            )));
        }
    }
}
