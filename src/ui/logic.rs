//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑和各种业务处理方法

use super::actions::Action;
use super::state::{AddField, App, AppMode, ConfirmAction};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::{AddOutcome, IdSource};

impl<S: KeyValueStore, G: IdSource> App<S, G> {
    /// 核心逻辑分发，返回是否退出
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::StartAddItem => self.start_add_item(),
            Action::StartSearch => self.start_search(),
            Action::StartDeleteItem => self.start_delete_item(),
            Action::StartClearAll => self.start_clear_all(),
            Action::TogglePurchased => self.toggle_purchased(),
            Action::ToggleFavorite => self.toggle_favorite(),

            Action::Cancel => self.cancel(),

            Action::Submit => match &self.mode {
                AppMode::Adding(_) => self.confirm_add_item(),
                AppMode::Searching => self.mode = AppMode::Normal,
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::Normal => {}
            },

            Action::Input(c) => self.input_char(c),
            Action::DeleteChar => self.delete_char(),

            Action::NextField => {
                if let AppMode::Adding(field) = self.mode {
                    self.mode = AppMode::Adding(field.next());
                }
            }
            Action::PrevField => {
                if let AppMode::Adding(field) = self.mode {
                    self.mode = AppMode::Adding(field.prev());
                }
            }
            Action::NextCategory => {
                if self.mode == AppMode::Adding(AddField::Category) {
                    self.draft.category = self.draft.category.next();
                }
            }
            Action::PrevCategory => {
                if self.mode == AppMode::Adding(AddField::Category) {
                    self.draft.category = self.draft.category.prev();
                }
            }
        }
        false
    }

    // ============ 导航相关 ============

    /// 向上移动选择
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.display_list.len() {
            self.selected_index += 1;
        }
    }

    // ============ 文本输入 ============

    fn input_char(&mut self, c: char) {
        match self.mode {
            AppMode::Adding(AddField::Name) => self.draft.name.push(c),
            AppMode::Adding(AddField::Quantity) => {
                if c.is_ascii_digit() {
                    self.draft.quantity.push(c);
                }
            }
            AppMode::Adding(AddField::Urgent) => {
                if c == ' ' {
                    self.draft.urgent = !self.draft.urgent;
                }
            }
            AppMode::Searching => {
                self.search.push(c);
                self.refresh_display_list();
            }
            _ => {}
        }
    }

    fn delete_char(&mut self) {
        match self.mode {
            AppMode::Adding(AddField::Name) => {
                self.draft.name.pop();
            }
            AppMode::Adding(AddField::Quantity) => {
                self.draft.quantity.pop();
            }
            AppMode::Searching => {
                self.search.pop();
                self.refresh_display_list();
            }
            _ => {}
        }
    }

    // ============ 添加条目相关 ============

    /// 打开添加表单（保留上次未提交的输入）
    pub fn start_add_item(&mut self) {
        self.mode = AppMode::Adding(AddField::Name);
        self.message = None;
    }

    /// 提交添加表单
    pub fn confirm_add_item(&mut self) {
        let quantity = self.draft.quantity();
        let result = self.store.add(
            &self.draft.name,
            quantity,
            self.draft.category,
            self.draft.urgent,
        );
        match result {
            Ok(AddOutcome::BlankName) => {
                self.message = Some("名称不能为空".to_string());
                self.mode = AppMode::Adding(AddField::Name);
            }
            Ok(AddOutcome::IdsExhausted) => {
                self.message = Some("无法分配新的条目 ID，未添加".to_string());
                self.mode = AppMode::Normal;
            }
            Ok(AddOutcome::Added(_)) => {
                self.message = Some(format!("已添加 {}", self.draft.name.trim()));
                self.draft.reset_after_add();
                self.after_change();
            }
            Err(e) => {
                self.draft.reset_after_add();
                self.after_change();
                self.report_storage_error(&e);
            }
        }
    }

    // ============ 搜索相关 ============

    /// 开始搜索
    pub fn start_search(&mut self) {
        self.mode = AppMode::Searching;
        self.message = None;
    }

    // ============ 标记相关 ============

    pub fn toggle_purchased(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.store.toggle_purchased(id);
            self.finish_command(result.map(|_| ()));
        }
    }

    pub fn toggle_favorite(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.store.toggle_favorite(id);
            self.finish_command(result.map(|_| ()));
        }
    }

    // ============ 删除/清空相关 ============

    /// 开始删除条目
    pub fn start_delete_item(&mut self) {
        if let Some(id) = self.selected_id() {
            self.mode = AppMode::Confirm(ConfirmAction::Delete(id));
        }
    }

    /// 开始清空清单
    pub fn start_clear_all(&mut self) {
        self.mode = AppMode::Confirm(ConfirmAction::ClearAll);
    }

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        let result = match &self.mode {
            AppMode::Confirm(ConfirmAction::Delete(id)) => {
                let id = *id;
                let name = self.store.items().get(id).map(|e| e.name.clone());
                let result = self.store.delete(id);
                if let (Ok(true), Some(name)) = (&result, name) {
                    self.message = Some(format!("已删除 {name}"));
                }
                result.map(|_| ())
            }
            AppMode::Confirm(ConfirmAction::ClearAll) => {
                let result = self.store.clear();
                if result.is_ok() {
                    self.message = Some("清单已清空".to_string());
                }
                result
            }
            _ => Ok(()),
        };
        self.finish_command(result);
    }

    // ============ 通用操作 ============

    /// 取消当前操作
    pub fn cancel(&mut self) {
        match self.mode {
            AppMode::Searching | AppMode::Normal => {
                self.search.clear();
                self.refresh_display_list();
            }
            _ => {}
        }
        self.mode = AppMode::Normal;
        self.message = None;
    }

    fn finish_command(&mut self, result: Result<(), StorageError>) {
        self.after_change();
        if let Err(e) = result {
            self.report_storage_error(&e);
        }
    }

    fn after_change(&mut self) {
        self.refresh_display_list();
        self.mode = AppMode::Normal;
    }

    fn report_storage_error(&mut self, e: &StorageError) {
        self.message = Some(format!("保存失败: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ItemId};
    use crate::projection::Summary;
    use crate::storage::MemoryStore;
    use crate::store::{ListStore, SequentialIds};

    fn app() -> App<MemoryStore, SequentialIds> {
        let store = ListStore::open(MemoryStore::new(), SequentialIds::default(), "shopping-items");
        App::new(store, Category::Vegetables)
    }

    fn type_text(app: &mut App<MemoryStore, SequentialIds>, text: &str) {
        for c in text.chars() {
            app.dispatch(Action::Input(c));
        }
    }

    fn add(app: &mut App<MemoryStore, SequentialIds>, name: &str) {
        app.dispatch(Action::StartAddItem);
        type_text(app, name);
        app.dispatch(Action::Submit);
    }

    #[test]
    fn test_add_through_form() {
        let mut app = app();
        app.dispatch(Action::StartAddItem);
        type_text(&mut app, "Milk");
        app.dispatch(Action::NextField);
        app.dispatch(Action::DeleteChar);
        type_text(&mut app, "2x");
        app.dispatch(Action::NextField);
        app.dispatch(Action::NextCategory);
        app.dispatch(Action::NextCategory);
        app.dispatch(Action::NextField);
        app.dispatch(Action::Input(' '));
        app.dispatch(Action::Submit);

        assert_eq!(app.mode, AppMode::Normal);
        let milk = &app.store.items()[0];
        assert_eq!(milk.name, "Milk");
        assert_eq!(milk.quantity, 2);
        assert_eq!(milk.category, Category::Dairy);
        assert!(milk.urgent);
        assert_eq!(app.display_list, [milk.id]);
    }

    #[test]
    fn test_draft_reset_keeps_category() {
        let mut app = app();
        app.draft.category = Category::Snacks;
        app.draft.quantity = "5".to_string();
        app.draft.urgent = true;
        add(&mut app, "Chips");

        assert_eq!(app.draft.name, "");
        assert_eq!(app.draft.quantity(), 1);
        assert!(!app.draft.urgent);
        assert_eq!(app.draft.category, Category::Snacks);
    }

    #[test]
    fn test_blank_name_keeps_form_open() {
        let mut app = app();
        app.draft.quantity = "3".to_string();
        add(&mut app, "  ");

        assert!(app.store.items().is_empty());
        assert_eq!(app.mode, AppMode::Adding(AddField::Name));
        assert_eq!(app.draft.name, "  ");
        assert_eq!(app.draft.quantity, "3");
        assert_eq!(app.message.as_deref(), Some("名称不能为空"));
    }

    #[test]
    fn test_exhausted_ids_report_distinct_message() {
        let payload = format!(
            r#"[{{"id":{},"name":"Milk","quantity":1,"category":"Dairy"}}]"#,
            u64::MAX
        );
        let store = ListStore::open(
            MemoryStore::with_slot("shopping-items", &payload),
            SequentialIds::default(),
            "shopping-items",
        );
        let mut app = App::new(store, Category::Vegetables);
        add(&mut app, "Bread");

        assert_eq!(app.store.items().len(), 1);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.draft.name, "Bread");
        assert_eq!(
            app.message.as_deref(),
            Some("无法分配新的条目 ID，未添加")
        );
    }

    #[test]
    fn test_cancel_keeps_draft() {
        let mut app = app();
        app.dispatch(Action::StartAddItem);
        type_text(&mut app, "Tea");
        app.dispatch(Action::Cancel);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.draft.name, "Tea");
    }

    #[test]
    fn test_search_filters_display_list() {
        let mut app = app();
        add(&mut app, "Milk");
        add(&mut app, "Bread");

        app.dispatch(Action::StartSearch);
        type_text(&mut app, "mil");
        assert_eq!(app.display_list, [ItemId(1)]);

        app.dispatch(Action::Submit);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.search, "mil");

        app.dispatch(Action::Cancel);
        assert_eq!(app.search, "");
        assert_eq!(app.display_list.len(), 2);
    }

    #[test]
    fn test_toggles_apply_to_selection() {
        let mut app = app();
        add(&mut app, "Milk");
        add(&mut app, "Bread");

        app.dispatch(Action::MoveSelectionDown);
        app.dispatch(Action::ToggleFavorite);
        app.dispatch(Action::TogglePurchased);

        let summary = Summary::of(app.store.items());
        assert_eq!(summary.favorites, 1);
        assert_eq!(summary.purchased, 1);
        assert!(app.store.items()[1].favorite);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        add(&mut app, "Milk");
        add(&mut app, "Bread");

        app.dispatch(Action::StartDeleteItem);
        assert_eq!(app.mode, AppMode::Confirm(ConfirmAction::Delete(ItemId(1))));
        app.dispatch(Action::Cancel);
        assert_eq!(app.store.items().len(), 2);

        app.dispatch(Action::StartDeleteItem);
        app.dispatch(Action::Submit);
        assert_eq!(app.store.items().len(), 1);
        assert_eq!(app.store.items()[0].name, "Bread");
        assert_eq!(app.selected_id(), Some(ItemId(2)));
    }

    #[test]
    fn test_clear_all() {
        let mut app = app();
        for name in ["a", "b", "c"] {
            add(&mut app, name);
        }
        app.dispatch(Action::MoveSelectionDown);
        app.dispatch(Action::MoveSelectionDown);
        app.dispatch(Action::StartClearAll);
        app.dispatch(Action::Submit);

        assert!(app.store.items().is_empty());
        assert!(app.display_list.is_empty());
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_id(), None);
    }

    #[test]
    fn test_commands_on_empty_list_are_noops() {
        let mut app = app();
        app.dispatch(Action::TogglePurchased);
        app.dispatch(Action::ToggleFavorite);
        app.dispatch(Action::StartDeleteItem);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.store.revision(), 0);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(app.dispatch(Action::Quit));
        assert!(!app.dispatch(Action::MoveSelectionUp));
    }
}
