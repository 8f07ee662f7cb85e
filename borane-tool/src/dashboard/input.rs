use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::{Action, DashboardState, Field, Tab};

pub fn map_event(state: &DashboardState, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(state, key),
        _ => None,
    }
}

fn map_key(state: &DashboardState, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    if state.confirm_cancel.is_some() {
        return map_confirm_key(key);
    }
    if let Some(form) = &state.form {
        return map_form_key(form.focus, key);
    }
    map_browse_key(state.tab, key)
}

fn map_confirm_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmCancel),
        KeyCode::Char('n') | KeyCode::Esc => Some(Action::DismissCancel),
        _ => None,
    }
}

fn map_form_key(focus: Field, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::CloseForm),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Tab | KeyCode::Down => Some(Action::FocusNext),
        KeyCode::BackTab | KeyCode::Up => Some(Action::FocusPrev),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Left if focus == Field::Equipment => Some(Action::PrevEquipment),
        KeyCode::Right if focus == Field::Equipment => Some(Action::NextEquipment),
        KeyCode::Char(c) => Some(Action::Input(c)),
        _ => None,
    }
}

fn map_browse_key(tab: Tab, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab | KeyCode::Right => Some(Action::NextTab),
        KeyCode::BackTab | KeyCode::Left => Some(Action::PrevTab),
        KeyCode::Char('1') => Some(Action::SelectTab(Tab::Rooms)),
        KeyCode::Char('2') => Some(Action::SelectTab(Tab::Timeline)),
        KeyCode::Char('3') => Some(Action::SelectTab(Tab::MyBookings)),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Enter | KeyCode::Char('b') if tab != Tab::MyBookings => Some(Action::OpenForm),
        KeyCode::Char('c') | KeyCode::Delete if tab == Tab::MyBookings => {
            Some(Action::RequestCancel)
        }
        _ => None,
    }
}
