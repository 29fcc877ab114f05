//! 派生视图：搜索过滤与统计
//!
//! 都是纯函数，每次从完整集合重新计算。

use crate::models::{Collection, Entry};

/// 按名称过滤（不区分大小写的子串匹配），空查询返回全部条目
pub fn filter_by_name<'a>(
    items: &'a Collection,
    query: &str,
) -> impl Iterator<Item = &'a Entry> + use<'a> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(move |e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
}

pub fn total(items: &Collection) -> usize {
    items.len()
}

pub fn purchased_count(items: &Collection) -> usize {
    items.iter().filter(|e| e.purchased).count()
}

pub fn pending_count(items: &Collection) -> usize {
    items.iter().filter(|e| !e.purchased).count()
}

pub fn favorite_count(items: &Collection) -> usize {
    items.iter().filter(|e| e.favorite).count()
}

/// 清单统计（基于未过滤的集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub purchased: usize,
    pub pending: usize,
    pub favorites: usize,
}

impl Summary {
    pub fn of(items: &Collection) -> Self {
        Self {
            total: total(items),
            purchased: purchased_count(items),
            pending: pending_count(items),
            favorites: favorite_count(items),
        }
    }
}
