// ==========================================
// RFCV 转换系统 - 序列计数器仓储
// ==========================================
// 职责: 按键 (wmi, vds, 年份码, 工厂码) 持久化"已发末号",
//       提供原子的 reserve（读-增-提交）操作
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 计数器提交先于返回 —— 崩溃只跳号,绝不重号
// ==========================================
// 并发模型:
// - 进程内: Arc<Mutex<Connection>> 串行化所有调用方
// - 跨进程: IMMEDIATE 事务保证读-改-写原子性
// ==========================================

use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::types::FlushPolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 序列段上限（6 位十进制,000001-999999）
pub const MAX_SEQUENCE: u32 = 999_999;

// ==========================================
// SequenceKey - 计数器作用域键
// ==========================================

/// 序列计数器的作用域键
///
/// 同键的两次 reserve 调用（并发或跨进程重启）
/// 返回的序列段永不重叠
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    /// 制造商代码（3 位）
    pub wmi: String,
    /// 描述段代码（5 位）
    pub vds: String,
    /// 年份码（1 位）
    pub year_code: char,
    /// 工厂码（1 位）
    pub plant_code: char,
}

impl SequenceKey {
    pub fn new(wmi: &str, vds: &str, year_code: char, plant_code: char) -> Self {
        Self {
            wmi: wmi.to_string(),
            vds: vds.to_string(),
            year_code,
            plant_code,
        }
    }
}

// ==========================================
// ReservedRange - 已预留序列段
// ==========================================

/// reserve 的返回值: 半开语义的已预留段
///
/// `granted == 0` 表示该键的序列空间已耗尽
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedRange {
    /// 首个已预留序号（granted > 0 时有效）
    pub start: u32,
    /// 实际授予数量（空间不足时小于请求量）
    pub granted: u32,
}

impl ReservedRange {
    /// 迭代已预留的序号
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..self.start + self.granted
    }
}

// ==========================================
// SequenceStore - 序列计数器存储
// ==========================================

pub struct SequenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SequenceStore {
    /// 打开（或创建）磁盘上的序列计数器存储
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::bootstrap(&conn)?;

        info!(db_path = %db_path, "序列计数器存储已打开");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 打开内存存储（测试与一次性批次使用,不跨进程持久化）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::bootstrap(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 按显式落盘策略打开存储
    ///
    /// 本版本仅支持 `FlushPolicy::PerIssuance`（每次 reserve 同步提交）。
    /// `Batched` 作为配置面保留,但在此处被显式拒绝,
    /// 避免"隐式批量落盘"造成崩溃后静默重号
    pub fn open_with_policy(db_path: &str, policy: FlushPolicy) -> RepositoryResult<Self> {
        match policy {
            FlushPolicy::PerIssuance => Self::open(db_path),
            FlushPolicy::Batched { .. } => {
                Err(RepositoryError::UnsupportedFlushPolicy(policy.to_string()))
            }
        }
    }

    /// 从已有连接创建（与配置存储共库时使用）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            Self::bootstrap(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 默认存储路径（平台数据目录下）
    pub fn default_store_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rfcv-transform")
            .join("sequence.db")
    }

    /// 建表（幂等）
    fn bootstrap(conn: &Connection) -> RepositoryResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vin_sequence (
                wmi        TEXT NOT NULL,
                vds        TEXT NOT NULL,
                year_code  TEXT NOT NULL,
                plant_code TEXT NOT NULL,
                last_seq   INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (wmi, vds, year_code, plant_code)
            );
            "#,
        )?;
        Ok(())
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 核心操作
    // ==========================================

    /// 原子预留 n 个连续序号
    ///
    /// 在单个 IMMEDIATE 事务内完成 读取 last_seq → 递增 → 提交,
    /// 提交成功后才返回预留段; 因此返回给调用方的序号
    /// 一定已持久化,崩溃不会导致重发
    ///
    /// # 参数
    /// - `key`: 计数器作用域键
    /// - `n`: 请求数量
    ///
    /// # 返回
    /// - `Ok(ReservedRange)`: granted 为实际授予量（空间不足时 < n）
    /// - `Err(...)`: 锁/事务/查询失败,此时**没有**序号被发出
    pub fn reserve(&self, key: &SequenceKey, n: u32) -> RepositoryResult<ReservedRange> {
        if n == 0 {
            return Ok(ReservedRange { start: 0, granted: 0 });
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let year_code = key.year_code.to_string();
        let plant_code = key.plant_code.to_string();
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        // 键不存在时先落一条 0 计数（幂等）
        tx.execute(
            r#"
            INSERT INTO vin_sequence (wmi, vds, year_code, plant_code, last_seq, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            ON CONFLICT (wmi, vds, year_code, plant_code) DO NOTHING
            "#,
            params![key.wmi, key.vds, year_code, plant_code, now],
        )?;

        let last_seq: u32 = tx.query_row(
            r#"
            SELECT last_seq FROM vin_sequence
            WHERE wmi = ?1 AND vds = ?2 AND year_code = ?3 AND plant_code = ?4
            "#,
            params![key.wmi, key.vds, year_code, plant_code],
            |row| row.get(0),
        )?;

        let granted = n.min(MAX_SEQUENCE.saturating_sub(last_seq));

        if granted > 0 {
            tx.execute(
                r#"
                UPDATE vin_sequence
                SET last_seq = ?5, updated_at = ?6
                WHERE wmi = ?1 AND vds = ?2 AND year_code = ?3 AND plant_code = ?4
                "#,
                params![
                    key.wmi,
                    key.vds,
                    year_code,
                    plant_code,
                    last_seq + granted,
                    now
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(
            wmi = %key.wmi,
            vds = %key.vds,
            year_code = %key.year_code,
            plant_code = %key.plant_code,
            requested = n,
            granted = granted,
            first = last_seq + 1,
            "序列段已预留"
        );

        Ok(ReservedRange {
            start: last_seq + 1,
            granted,
        })
    }

    /// 读取某键的已发末号（0 表示尚未发号）
    pub fn last_issued(&self, key: &SequenceKey) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT last_seq FROM vin_sequence
            WHERE wmi = ?1 AND vds = ?2 AND year_code = ?3 AND plant_code = ?4
            "#,
            params![
                key.wmi,
                key.vds,
                key.year_code.to_string(),
                key.plant_code.to_string()
            ],
            |row| row.get(0),
        );

        match result {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SequenceKey {
        SequenceKey::new("VF1", "RFB00", 'G', 'T')
    }

    #[test]
    fn test_reserve_starts_at_one() {
        let store = SequenceStore::open_in_memory().unwrap();
        let range = store.reserve(&test_key(), 3).unwrap();
        assert_eq!(range.start, 1);
        assert_eq!(range.granted, 3);
        assert_eq!(store.last_issued(&test_key()).unwrap(), 3);
    }

    #[test]
    fn test_reserve_zero_is_noop() {
        let store = SequenceStore::open_in_memory().unwrap();
        let range = store.reserve(&test_key(), 0).unwrap();
        assert_eq!(range.granted, 0);
        assert_eq!(store.last_issued(&test_key()).unwrap(), 0);
    }

    #[test]
    fn test_reserve_clamps_at_max_sequence() {
        let store = SequenceStore::open_in_memory().unwrap();
        let key = test_key();
        let first = store.reserve(&key, MAX_SEQUENCE - 1).unwrap();
        assert_eq!(first.granted, MAX_SEQUENCE - 1);

        // 只剩 1 个可用序号
        let second = store.reserve(&key, 10).unwrap();
        assert_eq!(second.start, MAX_SEQUENCE);
        assert_eq!(second.granted, 1);

        // 空间耗尽
        let third = store.reserve(&key, 1).unwrap();
        assert_eq!(third.granted, 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = SequenceStore::open_in_memory().unwrap();
        let key_a = SequenceKey::new("VF1", "RFB00", 'G', 'T');
        let key_b = SequenceKey::new("VF1", "RFB00", 'H', 'T');

        store.reserve(&key_a, 5).unwrap();
        let range_b = store.reserve(&key_b, 5).unwrap();
        assert_eq!(range_b.start, 1);
    }
}
