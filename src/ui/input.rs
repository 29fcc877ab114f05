//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use crossterm::event::KeyCode;

use super::actions::Action;
use super::state::{App, AppMode};
use crate::storage::KeyValueStore;
use crate::store::IdSource;

/// 根据当前模式和按键获取对应的 Action
pub fn get_action(mode: &AppMode, key: KeyCode) -> Option<Action> {
    match mode {
        AppMode::Normal => match key {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
            KeyCode::Char('a') => Some(Action::StartAddItem),
            KeyCode::Char('/') => Some(Action::StartSearch),
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(Action::TogglePurchased),
            KeyCode::Char('f') => Some(Action::ToggleFavorite),
            KeyCode::Char('d') => Some(Action::StartDeleteItem),
            KeyCode::Char('C') => Some(Action::StartClearAll),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        AppMode::Adding(_) => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Right => Some(Action::NextCategory),
            KeyCode::Left => Some(Action::PrevCategory),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::Searching => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::Confirm(_) => match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
    }
}

/// 处理按键事件，返回是否退出
pub fn handle_key_event<S: KeyValueStore, G: IdSource>(app: &mut App<S, G>, key: KeyCode) -> bool {
    match get_action(&app.mode, key) {
        Some(action) => app.dispatch(action),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::state::{AddField, ConfirmAction};
    use crate::models::ItemId;

    #[test]
    fn test_normal_mode_keys() {
        let mode = AppMode::Normal;
        assert_eq!(get_action(&mode, KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(get_action(&mode, KeyCode::Char(' ')), Some(Action::TogglePurchased));
        assert_eq!(get_action(&mode, KeyCode::Char('C')), Some(Action::StartClearAll));
        assert_eq!(get_action(&mode, KeyCode::Char('c')), None);
    }

    #[test]
    fn test_text_modes_capture_characters() {
        for mode in [AppMode::Adding(AddField::Name), AppMode::Searching] {
            assert_eq!(get_action(&mode, KeyCode::Char('q')), Some(Action::Input('q')));
            assert_eq!(get_action(&mode, KeyCode::Enter), Some(Action::Submit));
        }
    }

    #[test]
    fn test_confirm_mode_keys() {
        let mode = AppMode::Confirm(ConfirmAction::Delete(ItemId(1)));
        assert_eq!(get_action(&mode, KeyCode::Char('y')), Some(Action::Submit));
        assert_eq!(get_action(&mode, KeyCode::Esc), Some(Action::Cancel));
        assert_eq!(get_action(&mode, KeyCode::Char('d')), None);
    }
}
