use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

/// 条目 ID（创建时分配，单调递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 商品分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    Vegetables,
    Fruits,
    Dairy,
    Snacks,
    Beverages,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Vegetables,
        Category::Fruits,
        Category::Dairy,
        Category::Snacks,
        Category::Beverages,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Vegetables => "Vegetables",
            Category::Fruits => "Fruits",
            Category::Dairy => "Dairy",
            Category::Snacks => "Snacks",
            Category::Beverages => "Beverages",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// 下一个分类（循环）
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// 上一个分类（循环）
    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 将用户输入的数量转换为合法值：非数字、空或 0 都视为 1
pub fn parse_quantity(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(q) if q >= 1 => q,
        _ => 1,
    }
}

fn default_quantity() -> u32 {
    1
}

/// 兼容旧数据：数量可能以数字或字符串形式保存
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawQuantity {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    let quantity = match RawQuantity::deserialize(deserializer)? {
        RawQuantity::Integer(n) => u32::try_from(n).ok().filter(|q| *q >= 1).unwrap_or(1),
        RawQuantity::Float(f) if f.is_finite() && f >= 1.0 && f <= f64::from(u32::MAX) => {
            f as u32
        }
        RawQuantity::Float(_) => 1,
        RawQuantity::Text(s) => parse_quantity(&s),
    };
    Ok(quantity)
}

/// 购物清单条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: ItemId,
    pub name: String,
    #[serde(
        default = "default_quantity",
        deserialize_with = "deserialize_quantity"
    )]
    pub quantity: u32,
    pub category: Category,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub favorite: bool,
}

impl Entry {
    pub fn new(id: ItemId, name: String, quantity: u32, category: Category, urgent: bool) -> Self {
        Self {
            id,
            name,
            quantity: quantity.max(1),
            category,
            urgent,
            purchased: false,
            favorite: false,
        }
    }
}

/// 不可变的条目集合
///
/// 每次修改都返回一个新的集合；无变化时返回同一个值（共享同一块存储），
/// 因此视图层可以用 [`Collection::same_as`] 判断是否发生了变化。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection(Arc<Vec<Entry>>);

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self(Arc::new(entries))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Entry> {
        self.0.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// 最大的 ID，用于让 ID 生成器跳过已有条目
    pub fn max_id(&self) -> Option<ItemId> {
        self.0.iter().map(|e| e.id).max()
    }

    /// 是否与另一个集合共享同一份存储（即未发生替换）
    pub fn same_as(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// 追加一个新条目；名称为空白或 ID 已存在时原样返回
    pub fn with_added(
        &self,
        id: ItemId,
        name: &str,
        quantity: u32,
        category: Category,
        urgent: bool,
    ) -> Self {
        if name.trim().is_empty() || self.contains(id) {
            return self.clone();
        }
        let mut entries = self.0.as_ref().clone();
        entries.push(Entry::new(id, name.to_string(), quantity, category, urgent));
        Self::from_entries(entries)
    }

    pub fn with_purchased_toggled(&self, id: ItemId) -> Self {
        self.map_entry(id, |e| e.purchased = !e.purchased)
    }

    pub fn with_favorite_toggled(&self, id: ItemId) -> Self {
        self.map_entry(id, |e| e.favorite = !e.favorite)
    }

    /// 删除指定条目，其余条目保持原有顺序
    pub fn without(&self, id: ItemId) -> Self {
        if !self.contains(id) {
            return self.clone();
        }
        let entries = self.0.iter().filter(|e| e.id != id).cloned().collect();
        Self::from_entries(entries)
    }

    fn map_entry(&self, id: ItemId, f: impl Fn(&mut Entry)) -> Self {
        if !self.contains(id) {
            return self.clone();
        }
        let entries = self
            .0
            .iter()
            .map(|e| {
                let mut e = e.clone();
                if e.id == id {
                    f(&mut e);
                }
                e
            })
            .collect();
        Self::from_entries(entries)
    }
}

impl std::ops::Index<usize> for Collection {
    type Output = Entry;

    fn index(&self, index: usize) -> &Entry {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
