use crate::sim::PlantAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

/// Which modal, if any, is capturing keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Overlay {
    None,
    Help,
    ConfirmReset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Act(PlantAction),
    AskReset,
    ToggleText,
    ToggleFast,
    HelpToggle,
    Back,
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_wait: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_wait);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_command(overlay: Overlay, ev: &InputEvent) -> Option<Command> {
    if matches!(ev.key, KeyCode::Char('c')) && ev.mods.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }

    match overlay {
        Overlay::ConfirmReset => match ev.key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Command::Act(PlantAction::Reset)),
            _ => Some(Command::Back),
        },
        Overlay::Help => match ev.key {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => Some(Command::Back),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            _ => None,
        },
        Overlay::None => match ev.key {
            KeyCode::Char('w') | KeyCode::Char('W') => Some(Command::Act(PlantAction::Water)),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::Act(PlantAction::Sunlight)),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::AskReset),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(Command::ToggleText),
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::ToggleFast),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(Command::HelpToggle),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ch: char) -> InputEvent {
        InputEvent {
            key: KeyCode::Char(ch),
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn main_keys() {
        assert_eq!(
            map_event_to_command(Overlay::None, &key('w')),
            Some(Command::Act(PlantAction::Water))
        );
        assert_eq!(
            map_event_to_command(Overlay::None, &key('S')),
            Some(Command::Act(PlantAction::Sunlight))
        );
        assert_eq!(
            map_event_to_command(Overlay::None, &key('r')),
            Some(Command::AskReset)
        );
        assert_eq!(map_event_to_command(Overlay::None, &key('x')), None);
    }

    #[test]
    fn reset_needs_confirmation() {
        assert_eq!(
            map_event_to_command(Overlay::ConfirmReset, &key('y')),
            Some(Command::Act(PlantAction::Reset))
        );
        assert_eq!(
            map_event_to_command(Overlay::ConfirmReset, &key('n')),
            Some(Command::Back)
        );
        // watering is not reachable while the prompt is up
        assert_eq!(
            map_event_to_command(Overlay::ConfirmReset, &key('w')),
            Some(Command::Back)
        );
    }

    #[test]
    fn help_swallows_actions() {
        assert_eq!(map_event_to_command(Overlay::Help, &key('w')), None);
        assert_eq!(
            map_event_to_command(Overlay::Help, &key('h')),
            Some(Command::Back)
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ev = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        for o in [Overlay::None, Overlay::Help, Overlay::ConfirmReset] {
            assert_eq!(map_event_to_command(o, &ev), Some(Command::Quit));
        }
    }
}
