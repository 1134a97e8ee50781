use crate::sim::Action;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

pub(crate) fn collect_keys(max_frame_time: Duration) -> anyhow::Result<Vec<KeyCode>> {
    let mut out = Vec::new();

    // Poll with a tiny timeout so the frame loop stays responsive.
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(k.code);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(Action::SpeedUp),
        KeyCode::Char('-') | KeyCode::Down => Some(Action::SlowDown),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Action::ToggleTrails),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(Action::ToggleOrbits),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(Action::ToggleLabels),
        KeyCode::Char('i') | KeyCode::Char('I') => Some(Action::ToggleHelp),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::ClearTrails),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::ZoomIn),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::ZoomOut),
        KeyCode::Char('0') => Some(Action::SelectNone),
        KeyCode::Char(c @ '1'..='9') => Some(Action::Select(c as usize - '1' as usize)),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_bindings_map_to_their_actions() {
        assert_eq!(map_key(KeyCode::Char(' ')), Some(Action::TogglePause));
        assert_eq!(map_key(KeyCode::Char('+')), Some(Action::SpeedUp));
        assert_eq!(map_key(KeyCode::Char('=')), Some(Action::SpeedUp));
        assert_eq!(map_key(KeyCode::Up), Some(Action::SpeedUp));
        assert_eq!(map_key(KeyCode::Char('-')), Some(Action::SlowDown));
        assert_eq!(map_key(KeyCode::Down), Some(Action::SlowDown));
        assert_eq!(map_key(KeyCode::Char('t')), Some(Action::ToggleTrails));
        assert_eq!(map_key(KeyCode::Char('o')), Some(Action::ToggleOrbits));
        assert_eq!(map_key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(map_key(KeyCode::Esc), Some(Action::Quit));
    }

    #[test]
    fn digits_select_bodies_zero_indexed() {
        assert_eq!(map_key(KeyCode::Char('1')), Some(Action::Select(0)));
        assert_eq!(map_key(KeyCode::Char('9')), Some(Action::Select(8)));
        assert_eq!(map_key(KeyCode::Char('0')), Some(Action::SelectNone));
    }

    #[test]
    fn unbound_keys_map_to_nothing() {
        assert_eq!(map_key(KeyCode::Char('z')), None);
        assert_eq!(map_key(KeyCode::Tab), None);
        assert_eq!(map_key(KeyCode::Enter), None);
    }
}
