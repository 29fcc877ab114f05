//! 清单状态机
//!
//! `ListStore` 持有当前集合，每条命令生成新集合并立即写回存储槽。

use chrono::Utc;

use crate::models::{Category, Collection, ItemId};
use crate::storage::{KeyValueStore, StorageError, load_items, save_items};

/// ID 生成器端口
pub trait IdSource {
    /// 生成一个新的、严格递增的 ID；ID 空间耗尽时返回 `None`
    fn next_id(&mut self) -> Option<ItemId>;

    /// 确保之后生成的 ID 都大于 `id`
    fn reserve_past(&mut self, id: ItemId);
}

/// 基于时钟的 ID（毫秒时间戳），时钟未前进时顺延
#[derive(Debug, Default)]
pub struct ClockIds {
    last: u64,
}

impl IdSource for ClockIds {
    fn next_id(&mut self) -> Option<ItemId> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last = now.max(self.last.checked_add(1)?);
        Some(ItemId(self.last))
    }

    fn reserve_past(&mut self, id: ItemId) {
        self.last = self.last.max(id.0);
    }
}

/// 顺序计数 ID：1, 2, 3, ...
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: u64,
}

#[cfg(test)]
impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Option<ItemId> {
        self.last = self.last.checked_add(1)?;
        Some(ItemId(self.last))
    }

    fn reserve_past(&mut self, id: ItemId) {
        self.last = self.last.max(id.0);
    }
}

/// `ListStore::add` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(ItemId),
    /// 名称为空白，未添加
    BlankName,
    /// 已有条目占用了最大 ID，无法再分配
    IdsExhausted,
}

impl AddOutcome {
    #[cfg(test)]
    pub fn id(self) -> Option<ItemId> {
        match self {
            AddOutcome::Added(id) => Some(id),
            _ => None,
        }
    }
}

pub struct ListStore<S, G> {
    backend: S,
    ids: G,
    key: String,
    items: Collection,
    revision: u64,
}

impl<S, G> ListStore<S, G> {
    pub fn items(&self) -> &Collection {
        &self.items
    }

    /// 每次集合被替换时递增
    #[allow(dead_code)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    #[cfg(test)]
    pub fn into_backend(self) -> S {
        self.backend
    }
}

impl<S: KeyValueStore, G: IdSource> ListStore<S, G> {
    /// 打开存储槽并加载清单
    pub fn open(backend: S, mut ids: G, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = load_items(&backend, &key);
        if let Some(max) = items.max_id() {
            ids.reserve_past(max);
        }
        Self {
            backend,
            ids,
            key,
            items,
            revision: 0,
        }
    }

    /// 重新从存储槽读取（不修改当前状态）
    #[allow(dead_code)]
    pub fn load(&self) -> Collection {
        load_items(&self.backend, &self.key)
    }

    /// 添加条目；名称为空白或 ID 耗尽时不做任何事
    pub fn add(
        &mut self,
        name: &str,
        quantity: u32,
        category: Category,
        urgent: bool,
    ) -> Result<AddOutcome, StorageError> {
        if name.trim().is_empty() {
            tracing::debug!("ignored add with blank name");
            return Ok(AddOutcome::BlankName);
        }
        // 生成的 ID 总是大于已加载和已分配的 ID，不会与现有条目冲突
        let Some(id) = self.ids.next_id() else {
            tracing::warn!(name, "no item ids left, ignored add");
            return Ok(AddOutcome::IdsExhausted);
        };
        let next = self.items.with_added(id, name, quantity, category, urgent);
        tracing::info!(%id, name, quantity, %category, urgent, "added item");
        self.replace(next)?;
        Ok(AddOutcome::Added(id))
    }

    /// 切换已购买状态；返回是否找到该条目
    pub fn toggle_purchased(&mut self, id: ItemId) -> Result<bool, StorageError> {
        let next = self.items.with_purchased_toggled(id);
        self.apply("toggle_purchased", id, next)
    }

    /// 切换收藏状态；返回是否找到该条目
    pub fn toggle_favorite(&mut self, id: ItemId) -> Result<bool, StorageError> {
        let next = self.items.with_favorite_toggled(id);
        self.apply("toggle_favorite", id, next)
    }

    /// 删除条目；返回是否找到该条目
    pub fn delete(&mut self, id: ItemId) -> Result<bool, StorageError> {
        let next = self.items.without(id);
        self.apply("delete", id, next)
    }

    /// 清空清单（无论当前内容如何都会写回）
    pub fn clear(&mut self) -> Result<(), StorageError> {
        tracing::info!(count = self.items.len(), "cleared list");
        self.replace(Collection::new())?;
        Ok(())
    }

    /// 将当前集合整体写入存储槽
    pub fn persist(&mut self) -> Result<(), StorageError> {
        save_items(&mut self.backend, &self.key, &self.items).inspect_err(|e| {
            tracing::error!(key = %self.key, error = %e, "failed to persist list");
        })
    }

    fn apply(&mut self, command: &str, id: ItemId, next: Collection) -> Result<bool, StorageError> {
        if next.same_as(&self.items) {
            tracing::debug!(command, %id, "no item with this id");
            return Ok(false);
        }
        tracing::info!(command, %id, "updated list");
        self.replace(next)
    }

    fn replace(&mut self, next: Collection) -> Result<bool, StorageError> {
        self.items = next;
        self.revision += 1;
        self.persist()?;
        Ok(true)
    }
}
