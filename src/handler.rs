use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{figure_area, point_in_rect, region_at_cell, App, FocusPane, InputMode, Page};
use crate::content::HOME_ACTIONS;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::ConversationChanged(generation) => app.refresh_conversation(generation),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_profile_modal {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('p')) {
            app.show_profile_modal = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(page) = Page::from_digit(c) {
                app.navigate(page);
            }
            return;
        }
        _ => {}
    }

    match app.page {
        Page::Home => handle_home_normal(app, key),
        Page::Learn => handle_learn_normal(app, key),
        Page::Chat => handle_chat_normal(app, key),
        Page::About => {}
    }
}

fn handle_home_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            app.home_selection = app.home_selection.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
            app.home_selection = (app.home_selection + 1).min(HOME_ACTIONS.len() - 1);
        }
        KeyCode::Enter => {
            let page = if app.home_selection == 0 { Page::Chat } else { Page::Learn };
            app.navigate(page);
        }
        KeyCode::Char('c') => app.navigate(Page::Chat),
        KeyCode::Char('e') => app.navigate(Page::Learn),
        _ => {}
    }
}

fn handle_learn_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.learn_scroll = app.learn_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.learn_scroll = app.learn_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => app.learn_scroll = 0,
        KeyCode::Esc => app.navigate(Page::Home),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    let Some(chat) = app.chat.as_mut() else { return };

    match key.code {
        KeyCode::Char('i') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('p') => {
            app.show_profile_modal = true;
        }
        KeyCode::Tab => {
            chat.focus = match chat.focus {
                FocusPane::BodyMap => FocusPane::History,
                FocusPane::History => FocusPane::BodyMap,
            };
        }
        KeyCode::Esc => app.navigate(Page::Home),
        _ => match chat.focus {
            FocusPane::BodyMap => match key.code {
                KeyCode::Char('j') | KeyCode::Down => chat.highlighted = chat.highlighted.next(),
                KeyCode::Char('k') | KeyCode::Up => chat.highlighted = chat.highlighted.prev(),
                KeyCode::Enter => {
                    let region = chat.highlighted;
                    app.select_region(region);
                }
                _ => {}
            },
            FocusPane::History => match key.code {
                KeyCode::Char('j') | KeyCode::Down => chat.scroll_down(1),
                KeyCode::Char('k') | KeyCode::Up => chat.scroll_up(1),
                KeyCode::Char('G') => chat.scroll_to_bottom(),
                KeyCode::Enter => app.input_mode = InputMode::Editing,
                _ => {}
            },
        },
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }
    if key.code == KeyCode::Enter {
        app.submit_input();
        return;
    }

    let Some(chat) = app.chat.as_mut() else { return };
    // Input is disabled while a reply is pending
    if chat.is_busy() {
        return;
    }

    match key.code {
        KeyCode::Backspace => {
            if chat.cursor > 0 {
                chat.cursor -= 1;
                let byte_pos = char_to_byte_index(&chat.input, chat.cursor);
                chat.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = chat.input.chars().count();
            if chat.cursor < char_count {
                let byte_pos = char_to_byte_index(&chat.input, chat.cursor);
                chat.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            chat.cursor = chat.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = chat.input.chars().count();
            chat.cursor = (chat.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            chat.cursor = 0;
        }
        KeyCode::End => {
            chat.cursor = chat.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&chat.input, chat.cursor);
            chat.input.insert(byte_pos, c);
            chat.cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.show_profile_modal {
                app.show_profile_modal = false;
                return;
            }

            let tab = app
                .tab_areas
                .iter()
                .find(|(_, area)| point_in_rect(x, y, *area))
                .map(|(page, _)| *page);
            if let Some(page) = tab {
                app.navigate(page);
                return;
            }

            let Some(chat) = app.chat.as_mut() else { return };
            if let Some(panel) = chat.body_map_area {
                if let Some(region) = region_at_cell(figure_area(panel), x, y) {
                    chat.focus = FocusPane::BodyMap;
                    app.select_region(region);
                }
            }
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            let Some(chat) = app.chat.as_mut() else { return };
            let in_history = chat.history_area.is_some_and(|r| point_in_rect(x, y, r));
            if in_history {
                if mouse.kind == MouseEventKind::ScrollDown {
                    chat.scroll_down(3);
                } else {
                    chat.scroll_up(3);
                }
            }
        }
        _ => {}
    }
}
