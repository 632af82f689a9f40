// ==========================================
// RFCV 转换系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::transform_config_trait::{ConfigError, TransformConfigReader};
use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::types::FlushPolicy;
use crate::engine::orchestrator::MAX_WORKERS;
use crate::engine::vehicle_detector::DEFAULT_VEHICLE_KEYWORDS;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 配置键: 车辆识别关键词表（JSON 字符串数组）
pub const KEY_VEHICLE_KEYWORDS: &str = "vehicle_keywords";

/// 配置键: 默认 worker 池上限
pub const KEY_DEFAULT_WORKER_LIMIT: &str = "default_worker_limit";

/// 配置键: 序列计数器落盘策略
pub const KEY_FLUSH_POLICY: &str = "sequence_flush_policy";

/// 默认 worker 池上限（未配置时）
const DEFAULT_WORKER_LIMIT: usize = 4;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;
        Self::bootstrap(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 创建内存配置（测试使用）
    pub fn new_in_memory() -> Result<Self, ConfigError> {
        let conn = open_in_memory_connection()?;
        Self::bootstrap(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
            Self::bootstrap(&guard)?;
        }
        Ok(Self { conn })
    }

    fn bootstrap(conn: &Connection) -> Result<(), ConfigError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL DEFAULT 'global',
                key      TEXT NOT NULL,
                value    TEXT NOT NULL,
                PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆写）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;

        Ok(())
    }
}

// ==========================================
// TransformConfigReader 实现
// ==========================================

#[async_trait]
impl TransformConfigReader for ConfigManager {
    async fn vehicle_keywords(&self) -> Result<Vec<String>, ConfigError> {
        match self.get_config_value(KEY_VEHICLE_KEYWORDS)? {
            Some(raw) => {
                let keywords: Vec<String> = serde_json::from_str(&raw)
                    .map_err(|e| format!("vehicle_keywords 配置解析失败: {}", e))?;
                Ok(keywords)
            }
            None => Ok(DEFAULT_VEHICLE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect()),
        }
    }

    async fn default_worker_limit(&self) -> Result<usize, ConfigError> {
        match self.get_config_value(KEY_DEFAULT_WORKER_LIMIT)? {
            Some(raw) => {
                let limit: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("default_worker_limit 配置值无效: {}", raw))?;
                if limit == 0 || limit > MAX_WORKERS {
                    warn!(
                        configured = limit,
                        max = MAX_WORKERS,
                        "配置的 worker 上限超出允许范围,回落为默认值"
                    );
                    return Ok(DEFAULT_WORKER_LIMIT);
                }
                Ok(limit)
            }
            None => Ok(DEFAULT_WORKER_LIMIT),
        }
    }

    async fn flush_policy(&self) -> Result<FlushPolicy, ConfigError> {
        match self.get_config_value(KEY_FLUSH_POLICY)? {
            Some(raw) if raw.trim() == "per_issuance" => Ok(FlushPolicy::PerIssuance),
            Some(raw) => {
                // 未识别的策略值不静默吞掉: 落盘策略事关重号风险
                Err(format!("不支持的落盘策略配置: {}", raw).into())
            }
            None => Ok(FlushPolicy::PerIssuance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_when_keys_absent() {
        let config = ConfigManager::new_in_memory().unwrap();

        let keywords = config.vehicle_keywords().await.unwrap();
        assert!(keywords.contains(&"VEHICULE".to_string()));
        assert_eq!(config.default_worker_limit().await.unwrap(), 4);
        assert_eq!(config.flush_policy().await.unwrap(), FlushPolicy::PerIssuance);
    }

    #[tokio::test]
    async fn test_configured_keywords_override_defaults() {
        let config = ConfigManager::new_in_memory().unwrap();
        config
            .set_global_config_value(KEY_VEHICLE_KEYWORDS, r#"["AMBULANCE","GRUE"]"#)
            .unwrap();

        let keywords = config.vehicle_keywords().await.unwrap();
        assert_eq!(keywords, vec!["AMBULANCE", "GRUE"]);
    }

    #[tokio::test]
    async fn test_unknown_flush_policy_is_rejected() {
        let config = ConfigManager::new_in_memory().unwrap();
        config
            .set_global_config_value(KEY_FLUSH_POLICY, "batched:100")
            .unwrap();

        assert!(config.flush_policy().await.is_err());
    }
}
