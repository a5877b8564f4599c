use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, ItemFormFocus, LoginFocus, Tab};
use crate::models::LovType;
use crate::utils::truncate_string;

use super::styles;
use super::tabs::{items, users};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::EditingItem) {
        render_item_form_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingDelete) {
        render_delete_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Sayur Admin";
    let account = app
        .session
        .email()
        .map(|e| format!("{} | ", e))
        .unwrap_or_default();
    let help_hint = format!("{}[?] Help", account);
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let main_tabs = vec![
        ("[1] Users", app.current_tab == Tab::Users),
        ("[2] Items", app.current_tab == Tab::Items),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    // Show the active search query on the right
    if !app.search_query.is_empty() || matches!(app.state, AppState::Searching) {
        let cursor = if matches!(app.state, AppState::Searching) { "▌" } else { "" };
        let search_text = format!("/{}{}", app.search_query, cursor);
        let main_width: usize = spans.iter().map(|s| s.content.len()).sum();
        let padding = (area.width as usize).saturating_sub(main_width + search_text.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(search_text, styles::search_style()));
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Users => users::render(frame, app, area),
        Tab::Items => items::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let last_updated = app.cache_ages.last_updated();
    let shortcuts = "[u]pdate | [L]ogout | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Updated {} ", last_updated)
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            "       ╔═╗╔═╗╦ ╦╦ ╦╦═╗  ╔═╗╔╦╗╔╦╗╦╔╗╔",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "       ╚═╗╠═╣╚╦╝║ ║╠╦╝  ╠═╣ ║║║║║║║║║",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "       ╚═╝╩ ╩ ╩ ╚═╝╩╚═  ╩ ╩═╩╝╩ ╩╩╝╚╝",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-2       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", styles::help_key_style()),
            Span::styled("Prev/next tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Expand user transactions", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  /         ", styles::help_key_style()),
            Span::styled("Search users", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  n/e/i/x   ", styles::help_key_style()),
            Span::styled("Sort by name/email/income/expense", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  a/e/d     ", styles::help_key_style()),
            Span::styled("Add/edit/delete catalog item", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Update data from server", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  L         ", styles::help_key_style()),
            Span::styled("Log out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(50, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];

    lines.push(Line::from(Span::styled(
        "    ╔═╗╔═╗╦ ╦╦ ╦╦═╗  ╔═╗╔╦╗╔╦╗╦╔╗╔",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "    ╚═╗╠═╣╚╦╝║ ║╠╦╝  ╠═╣ ║║║║║║║║║",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "    ╚═╝╩ ╩ ╩ ╚═╝╩╚═  ╩ ╩═╩╝╩ ╩╩╝╚╝",
        styles::title_style(),
    )));
    lines.push(Line::from(""));

    let email_focused = app.login_focus == LoginFocus::Email;
    let email_style = if email_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let email_display = format!("{:<26}", truncate_string(&app.login_email, 26));
    let cursor = if email_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(format!("{}{}", email_display, cursor), email_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(26));
    let password_display = format!("{:<26}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    if button_focused {
        lines.push(Line::from(vec![
            Span::raw("              ["),
            Span::styled(" ▶ Login ◀ ", button_style),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("              ["),
            Span::styled("   Login   ", button_style),
            Span::raw("]"),
        ]));
    }

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_string(error, 46)),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_item_form_overlay(frame: &mut Frame, app: &App) {
    let height = if app.item_form_error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(54, height, frame.area());

    frame.render_widget(Clear, area);

    let title = if app.editing_item_id.is_some() {
        " Edit Item "
    } else {
        " New Item "
    };

    let mut lines = vec![Line::from("")];

    let name_focused = app.item_form_focus == ItemFormFocus::Name;
    let name_style = if name_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let name_display = format!("{:<30}", truncate_string(&app.item_form.name, 30));
    let cursor = if name_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Name:  [", styles::muted_style()),
        Span::styled(format!("{}{}", name_display, cursor), name_style),
        Span::styled("]", styles::muted_style()),
    ]));
    lines.push(Line::from(""));

    let type_focused = app.item_form_focus == ItemFormFocus::Type;
    let type_label = app
        .item_form
        .item_type
        .unwrap_or(LovType::Vegetables)
        .as_str();
    let type_style = if type_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Type:  ", styles::muted_style()),
        Span::styled(format!("◀ {:^12} ▶", type_label), type_style),
    ]));
    lines.push(Line::from(""));

    let photo_focused = app.item_form_focus == ItemFormFocus::Photo;
    let photo_style = if photo_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let photo_display = format!("{:<30}", truncate_string(&app.item_form_photo_input, 30));
    let cursor = if photo_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Photo: [", styles::muted_style()),
        Span::styled(format!("{}{}", photo_display, cursor), photo_style),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Enter", styles::help_key_style()),
        Span::styled(" save   ", styles::muted_style()),
        Span::styled("Tab", styles::help_key_style()),
        Span::styled(" next field   ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    if let Some(ref error) = app.item_form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate_string(error, 48)),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(48, 8, frame.area());

    frame.render_widget(Clear, area);

    let name = app
        .delete_target
        .and_then(|id| app.lov_items.iter().find(|i| i.id == id))
        .map(|i| i.name.clone())
        .unwrap_or_else(|| "this item".to_string());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   Delete \"{}\"?", truncate_string(&name, 30)),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm Delete ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "  ╔═╗╔═╗╦ ╦╦ ╦╦═╗  ╔═╗╔╦╗╔╦╗╦╔╗╔",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "  ╚═╗╠═╣╚╦╝║ ║╠╦╝  ╠═╣ ║║║║║║║║║",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "  ╚═╝╩ ╩ ╩ ╚═╝╩╚═  ╩ ╩═╩╝╩ ╩╩╝╚╝",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
