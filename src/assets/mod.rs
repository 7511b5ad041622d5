/// 被跟踪资产列表与磁盘持久化
///
/// 列表按插入顺序维护（显示顺序、序号导航都依赖它）；id 在集合内
/// 唯一，符号也不允许重复。磁盘格式是 JSON 数组；兼容旧格式——
/// 裸符号字符串数组在读取时升级为结构化条目（favorite=false，补发
/// 新 id）。损坏的文件退回空列表并告警，从不让渲染路径崩溃。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 资产符号的最大长度（与键盘输入缓冲一致）
pub const MAX_SYMBOL_LEN: usize = 5;

/// 单个被跟踪资产
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAsset {
    pub id: Uuid,
    pub symbol: String,
    pub favorite: bool,
}

impl TrackedAsset {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            favorite: false,
        }
    }
}

/// 资产操作错误
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("symbol already tracked: {symbol}")]
    Duplicate { symbol: String },

    #[error("invalid symbol {symbol:?}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("persistence error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 有序资产列表 + 磁盘持久化
pub struct AssetStore {
    path: PathBuf,
    assets: Vec<TrackedAsset>,
}

impl AssetStore {
    /// 从磁盘加载；文件缺失或损坏都退回空列表
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let assets = match fs::read_to_string(&path) {
            Ok(raw) => match Self::parse(&raw) {
                Ok(assets) => assets,
                Err(e) => {
                    log::warn!("资产文件损坏，使用空列表: {}", e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!("资产文件读取失败，使用空列表: {}", e);
                Vec::new()
            }
        };

        Self { path, assets }
    }

    /// 仅内存的空列表（测试用）
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            assets: Vec::new(),
        }
    }

    /// 解析磁盘格式；裸字符串数组按旧格式升级
    fn parse(raw: &str) -> Result<Vec<TrackedAsset>, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(raw)?;

        if let Some(items) = value.as_array() {
            if items.iter().all(|v| v.is_string()) {
                // 旧格式：["BTC", "ETH"] → 升级为结构化条目
                let upgraded = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(TrackedAsset::new)
                    .collect();
                return Ok(upgraded);
            }
        }

        serde_json::from_value(value)
    }

    /// 写回磁盘；路径为空（内存模式）时跳过
    pub fn save(&self) -> Result<(), AssetError> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.assets)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackedAsset> {
        self.assets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedAsset> {
        self.assets.iter()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.symbol.clone()).collect()
    }

    /// 追加一个新资产（插入顺序即显示顺序）
    pub fn add(&mut self, symbol: &str) -> Result<&TrackedAsset, AssetError> {
        let symbol = symbol.trim();
        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
            return Err(AssetError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: format!("length must be 1..={}", MAX_SYMBOL_LEN),
            });
        }
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AssetError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: "only ascii alphanumerics".to_string(),
            });
        }
        if self
            .assets
            .iter()
            .any(|a| a.symbol.eq_ignore_ascii_case(symbol))
        {
            return Err(AssetError::Duplicate {
                symbol: symbol.to_string(),
            });
        }

        self.assets.push(TrackedAsset::new(symbol));
        self.save()?;
        log::info!("新增资产 {}", symbol);
        Ok(self.assets.last().unwrap())
    }

    /// 按序号删除；越界为无操作
    pub fn remove(&mut self, index: usize) -> Option<TrackedAsset> {
        if index >= self.assets.len() {
            return None;
        }
        let removed = self.assets.remove(index);
        if let Err(e) = self.save() {
            log::warn!("删除后写盘失败: {}", e);
        }
        log::info!("删除资产 {}", removed.symbol);
        Some(removed)
    }

    /// 翻转收藏标记，保持顺序不变
    pub fn toggle_favorite(&mut self, index: usize) -> Option<bool> {
        let asset = self.assets.get_mut(index)?;
        asset.favorite = !asset.favorite;
        let flag = asset.favorite;
        if let Err(e) = self.save() {
            log::warn!("收藏状态写盘失败: {}", e);
        }
        Some(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut store = AssetStore::in_memory();
        store.add("BTC").unwrap();
        store.add("ETH").unwrap();
        store.add("SOL").unwrap();
        assert_eq!(store.symbols(), vec!["BTC", "ETH", "SOL"]);
    }

    #[test]
    fn test_duplicate_rejected_case_insensitive() {
        let mut store = AssetStore::in_memory();
        store.add("BTC").unwrap();
        assert!(matches!(
            store.add("btc"),
            Err(AssetError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_symbol_validation() {
        let mut store = AssetStore::in_memory();
        assert!(matches!(
            store.add(""),
            Err(AssetError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            store.add("TOOLONG"),
            Err(AssetError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            store.add("B/C"),
            Err(AssetError::InvalidSymbol { .. })
        ));
        // 大小写保留
        store.add("dOgE").unwrap();
        assert_eq!(store.get(0).unwrap().symbol, "dOgE");
    }

    #[test]
    fn test_toggle_favorite_preserves_order() {
        let mut store = AssetStore::in_memory();
        store.add("A").unwrap();
        store.add("B").unwrap();

        assert_eq!(store.toggle_favorite(0), Some(true));
        assert_eq!(store.symbols(), vec!["A", "B"]);
        assert!(store.get(0).unwrap().favorite);
        assert!(!store.get(1).unwrap().favorite);

        assert_eq!(store.toggle_favorite(0), Some(false));
        assert!(!store.get(0).unwrap().favorite);
    }

    #[test]
    fn test_ids_unique() {
        let mut store = AssetStore::in_memory();
        store.add("A").unwrap();
        store.add("B").unwrap();
        assert_ne!(store.get(0).unwrap().id, store.get(1).unwrap().id);
    }

    #[test]
    fn test_legacy_format_upgrade() {
        let assets = AssetStore::parse(r#"["BTC", "ETH"]"#).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].symbol, "BTC");
        assert!(!assets[0].favorite);
        assert_ne!(assets[0].id, assets[1].id);
    }

    #[test]
    fn test_structured_format_parse() {
        let raw = serde_json::to_string(&vec![TrackedAsset {
            id: Uuid::new_v4(),
            symbol: "BTC".to_string(),
            favorite: true,
        }])
        .unwrap();
        let assets = AssetStore::parse(&raw).unwrap();
        assert!(assets[0].favorite);
    }

    #[test]
    fn test_malformed_file_falls_back_to_empty() {
        let dir = std::env::temp_dir().join("tick_sight_asset_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let store = AssetStore::load(&path);
        assert!(store.is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut store = AssetStore::in_memory();
        store.add("A").unwrap();
        assert!(store.remove(5).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join("tick_sight_asset_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.json");
        let _ = fs::remove_file(&path);

        {
            let mut store = AssetStore::load(&path);
            store.add("BTC").unwrap();
            store.toggle_favorite(0);
        }

        let reloaded = AssetStore::load(&path);
        assert_eq!(reloaded.symbols(), vec!["BTC"]);
        assert!(reloaded.get(0).unwrap().favorite);
        let _ = fs::remove_file(&path);
    }
}
