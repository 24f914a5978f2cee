//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Char(' ') => app.toggle_mark(),
        KeyCode::Char('x') => app.clear_marks(),
        KeyCode::Enter => app.run_selection(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ForecastContext;
    use crate::dataset::Dataset;
    use crate::model::{Model, NaivePredictor};
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_drive_selection() {
        let ctx = ForecastContext::new(Dataset::demo(3, 3), Model::Naive(NaivePredictor), 6, 3);
        let mut app = App::new(ctx);

        handle_key(&mut app, press(KeyCode::Down));
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert_eq!(app.marked, vec![app.counties[1].clone()]);

        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.results[0].county, app.counties[1]);

        handle_key(&mut app, press(KeyCode::Char('x')));
        assert!(app.marked.is_empty());

        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn release_events_are_ignored() {
        let ctx = ForecastContext::new(Dataset::demo(3, 3), Model::Naive(NaivePredictor), 6, 3);
        let mut app = App::new(ctx);
        let release = KeyEvent {
            code: KeyCode::Down,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key(&mut app, release);
        assert_eq!(app.cursor, 0);
    }
}
