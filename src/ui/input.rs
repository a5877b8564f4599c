//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_email_char, can_add_form_char, can_add_password_char, App, AppState, ItemFormFocus,
    LoginFocus, Tab, PAGE_SCROLL_SIZE,
};
use crate::models::{LovType, UserSortColumn};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle delete confirmation
    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.delete_confirmed_item();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.delete_target = None;
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle the catalog item form
    if matches!(app.state, AppState::EditingItem) {
        return handle_item_form_input(app, key);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Users;
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Items;
        }
        KeyCode::Left | KeyCode::Right => {
            // Two tabs, so both directions wrap to the other one
            app.current_tab = app.current_tab.next();
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
        }
        KeyCode::Char('L') => {
            app.logout();
        }
        KeyCode::Char('/') => {
            if app.current_tab == Tab::Users {
                app.state = AppState::Searching;
                app.search_query.clear();
            }
        }
        KeyCode::Esc => {
            app.search_query.clear();
            app.expanded_user = None;
        }
        _ => {
            // Tab-specific input
            match app.current_tab {
                Tab::Users => handle_users_input(app, key),
                Tab::Items => handle_items_input(app, key),
            }
        }
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.user_selection = 0;
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Only a re-login prompt can be dismissed; a fresh start cannot
            if app.is_authenticated() {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.attempt_login().await,
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(&app.login_email) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(&app.login_password) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_item_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.item_form_error = None;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.item_form_focus = match app.item_form_focus {
                ItemFormFocus::Name => ItemFormFocus::Type,
                ItemFormFocus::Type => ItemFormFocus::Photo,
                ItemFormFocus::Photo => ItemFormFocus::Name,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.item_form_focus = match app.item_form_focus {
                ItemFormFocus::Name => ItemFormFocus::Photo,
                ItemFormFocus::Type => ItemFormFocus::Name,
                ItemFormFocus::Photo => ItemFormFocus::Type,
            };
        }
        KeyCode::Enter => {
            app.submit_item_form();
        }
        KeyCode::Left | KeyCode::Right => {
            if app.item_form_focus == ItemFormFocus::Type {
                let current = app.item_form.item_type.unwrap_or(LovType::Vegetables);
                app.item_form.item_type = Some(current.toggle());
            }
        }
        KeyCode::Backspace => match app.item_form_focus {
            ItemFormFocus::Name => {
                app.item_form.name.pop();
            }
            ItemFormFocus::Photo => {
                app.item_form_photo_input.pop();
            }
            ItemFormFocus::Type => {}
        },
        KeyCode::Char(' ') if app.item_form_focus == ItemFormFocus::Type => {
            let current = app.item_form.item_type.unwrap_or(LovType::Vegetables);
            app.item_form.item_type = Some(current.toggle());
        }
        KeyCode::Char(c) => match app.item_form_focus {
            ItemFormFocus::Name => {
                if can_add_form_char(&app.item_form.name) {
                    app.item_form.name.push(c);
                }
            }
            ItemFormFocus::Photo => {
                if can_add_form_char(&app.item_form_photo_input) {
                    app.item_form_photo_input.push(c);
                }
            }
            ItemFormFocus::Type => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_users_input(app: &mut App, key: KeyEvent) {
    let count = app.visible_users().len();

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.user_selection = app.user_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if count > 0 {
                app.user_selection = (app.user_selection + 1).min(count - 1);
            }
        }
        KeyCode::PageUp => {
            app.user_selection = app.user_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            if count > 0 {
                app.user_selection = (app.user_selection + PAGE_SCROLL_SIZE).min(count - 1);
            }
        }
        KeyCode::Home => {
            app.user_selection = 0;
        }
        KeyCode::End => {
            app.user_selection = count.saturating_sub(1);
        }
        KeyCode::Enter => {
            app.toggle_expand_selected();
        }
        KeyCode::Char('n') => app.sort_users_by(UserSortColumn::Name),
        KeyCode::Char('e') => app.sort_users_by(UserSortColumn::Email),
        KeyCode::Char('i') => app.sort_users_by(UserSortColumn::IncomeKg),
        KeyCode::Char('x') => app.sort_users_by(UserSortColumn::ExpenseKg),
        _ => {}
    }
}

fn handle_items_input(app: &mut App, key: KeyEvent) {
    let count = app.lov_items.len();

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.item_selection = app.item_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if count > 0 {
                app.item_selection = (app.item_selection + 1).min(count - 1);
            }
        }
        KeyCode::PageUp => {
            app.item_selection = app.item_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            if count > 0 {
                app.item_selection = (app.item_selection + PAGE_SCROLL_SIZE).min(count - 1);
            }
        }
        KeyCode::Home => {
            app.item_selection = 0;
        }
        KeyCode::End => {
            app.item_selection = count.saturating_sub(1);
        }
        KeyCode::Char('a') => {
            if !app.mutation_in_progress {
                app.start_create_item();
            }
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if !app.mutation_in_progress {
                app.start_edit_item();
            }
        }
        KeyCode::Char('d') => {
            if !app.mutation_in_progress {
                app.start_delete_item();
            }
        }
        _ => {}
    }
}
