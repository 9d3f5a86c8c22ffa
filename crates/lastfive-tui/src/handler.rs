use std::time::Instant;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
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
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Frame => {
            app.step_score(Instant::now());
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

/// Tab order: Input -> Timeline -> History -> Input
fn cycle_focus(app: &mut App) {
    app.focus = match app.focus {
        FocusPane::Input => FocusPane::Timeline,
        FocusPane::Timeline => {
            if app.history_state.selected().is_none() && !app.history.visible().is_empty() {
                app.history_state.select(Some(0));
            }
            FocusPane::History
        }
        FocusPane::History => FocusPane::Input,
    };
    app.input_mode = if app.focus == FocusPane::Input {
        InputMode::Editing
    } else {
        InputMode::Normal
    };
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Tab => cycle_focus(app),

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Esc => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('n') => app.new_session(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        _ => match app.focus {
            FocusPane::History => handle_history_keys(app, key),
            FocusPane::Timeline | FocusPane::Input => handle_timeline_keys(app, key),
        },
    }
}

fn handle_timeline_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.section_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.section_nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_section(),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        _ => {}
    }
}

fn handle_history_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.history_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_nav_up(),
        KeyCode::Enter | KeyCode::Char('r') => {
            if app.rerun_selected_history() {
                app.focus = FocusPane::Timeline;
            }
        }
        KeyCode::Char('d') => app.clear_history(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Timeline;
        }
        KeyCode::Tab => cycle_focus(app),
        KeyCode::Enter => app.submit_query(),
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.query_input.chars().count();
            if app.query_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.query_input.chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.query_cursor = 0;
        }
        KeyCode::End => {
            app.query_cursor = app.query_input.chars().count();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.query_input.clear();
            app.query_cursor = 0;
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.new_session();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
            app.query_input.insert(byte_pos, c);
            app.query_cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_history = app.history_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_timeline = app.timeline_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_history {
                app.history_nav_down();
            } else if in_timeline {
                app.scroll_down();
                app.scroll_down();
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_history {
                app.history_nav_up();
            } else if in_timeline {
                app.scroll_up();
                app.scroll_up();
                app.scroll_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastfive_core::{HistoryStore, MemoryStore, RiskLevel, TransportClient};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let client = TransportClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        let history = HistoryStore::open(Box::new(MemoryStore::new()));
        App::with_parts(client.clone(), Arc::new(client), history)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("投影仪A", 0), 0);
        assert_eq!(char_to_byte_index("投影仪A", 3), 9);
        assert_eq!(char_to_byte_index("投影仪A", 10), 10);
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut app = test_app();
        type_text(&mut app, "投影A");
        handle_key(&mut app, key(KeyCode::Left));
        type_text(&mut app, "仪");
        assert_eq!(app.query_input, "投影仪A");
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.query_input, "投影A");
        assert_eq!(app.query_cursor, 2);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = test_app();
        assert_eq!(app.focus, FocusPane::Input);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Timeline);
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::History);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_q_only_quits_outside_input() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.query_input, "q");

        handle_key(&mut app, key(KeyCode::Esc));
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let mut app = test_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_d_clears_history_only_on_history_pane() {
        let mut app = test_app();
        app.history.record("kettle", RiskLevel::Safe, chrono::Utc::now()).unwrap();

        app.focus = FocusPane::Timeline;
        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.history.len(), 1);

        app.focus = FocusPane::History;
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_section_cursor_keys() {
        let mut app = test_app();
        app.focus = FocusPane::Timeline;
        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.section_cursor, 2);
        handle_key(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.section_cursor, 1);
    }
}
