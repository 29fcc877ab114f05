//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及相关枚举

use crate::models::{Category, ItemId, parse_quantity};
use crate::projection::filter_by_name;
use crate::storage::KeyValueStore;
use crate::store::{IdSource, ListStore};

/// 应用状态
pub struct App<S, G> {
    pub store: ListStore<S, G>,
    pub selected_index: usize,
    pub display_list: Vec<ItemId>, // 过滤后的条目
    pub mode: AppMode,
    pub draft: Draft,
    pub search: String,
    pub message: Option<String>,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Adding(AddField),
    Searching,
    Confirm(ConfirmAction),
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    Delete(ItemId),
    ClearAll,
}

/// 添加表单中的字段
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddField {
    Name,
    Quantity,
    Category,
    Urgent,
}

impl AddField {
    pub fn next(self) -> Self {
        match self {
            AddField::Name => AddField::Quantity,
            AddField::Quantity => AddField::Category,
            AddField::Category => AddField::Urgent,
            AddField::Urgent => AddField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            AddField::Name => AddField::Urgent,
            AddField::Quantity => AddField::Name,
            AddField::Category => AddField::Quantity,
            AddField::Urgent => AddField::Category,
        }
    }
}

/// 待提交的输入
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub quantity: String,
    pub category: Category,
    pub urgent: bool,
}

impl Draft {
    pub fn new(category: Category) -> Self {
        Self {
            name: String::new(),
            quantity: "1".to_string(),
            category,
            urgent: false,
        }
    }

    pub fn quantity(&self) -> u32 {
        parse_quantity(&self.quantity)
    }

    /// 添加成功后重置；分类保持不变
    pub fn reset_after_add(&mut self) {
        self.name.clear();
        self.quantity = "1".to_string();
        self.urgent = false;
    }
}

impl<S: KeyValueStore, G: IdSource> App<S, G> {
    /// 创建新的应用实例
    pub fn new(store: ListStore<S, G>, default_category: Category) -> Self {
        let mut app = Self {
            store,
            selected_index: 0,
            display_list: Vec::new(),
            mode: AppMode::Normal,
            draft: Draft::new(default_category),
            search: String::new(),
            message: None,
        };
        app.refresh_display_list();
        app
    }

    /// 刷新显示列表
    pub fn refresh_display_list(&mut self) {
        self.display_list = filter_by_name(self.store.items(), &self.search)
            .map(|e| e.id)
            .collect();

        // 确保选中索引有效
        if self.display_list.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.display_list.len() {
            self.selected_index = self.display_list.len() - 1;
        }
    }

    /// 获取当前选中的条目 ID
    pub fn selected_id(&self) -> Option<ItemId> {
        self.display_list.get(self.selected_index).copied()
    }
}
