// ==========================================
// RFCV 转换系统 - 标识生成引擎
// ==========================================
// 职责: 为无底盘号的车辆行生成校验合规的 17 位 VIN
// 依据: ISO 3779 版式 —— WMI(3) + VDS(5) + 校验位(第9位)
//       + 年份码(第10位) + 工厂码(第11位) + 序列段(12-17)
// 红线: 序列段来自持久化计数器,发号先落盘 —— 崩溃只跳号不重号
// ==========================================

use crate::domain::batch::IdentityConfig;
use crate::domain::record::DocumentRecord;
use crate::engine::error::{TransformError, TransformResult};
use crate::repository::sequence_repo::{SequenceKey, SequenceStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// VIN 总长度
pub const VIN_LENGTH: usize = 17;

/// VIN 合法字符表（排除视觉易混淆的 I/O/Q）
pub const VIN_ALPHABET: &str = "0123456789ABCDEFGHJKLMNPRSTUVWXYZ";

/// 校验位所在下标（0 起,即第 9 位）
pub const CHECK_DIGIT_INDEX: usize = 8;

/// ISO 3779 位置权重（校验位自身权重为 0）
const CHECK_WEIGHTS: [u32; VIN_LENGTH] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// 年份码 30 年循环表（1980 = 'A',排除 I/O/Q/U/Z 与 0）
const YEAR_CODE_TABLE: &[u8; 30] = b"ABCDEFGHJKLMNPRSTVWXY123456789";

// ==========================================
// 校验位计算
// ==========================================

/// ISO 3779 字符转码值; I/O/Q 及其他非法字符返回 None
fn transliterate(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='H' => Some(c as u32 - 'A' as u32 + 1),
        'J'..='N' => Some(c as u32 - 'J' as u32 + 1),
        'P' => Some(7),
        'R' => Some(9),
        'S'..='Z' => Some(c as u32 - 'S' as u32 + 2),
        _ => None,
    }
}

/// 计算校验位字符
///
/// # 参数
/// - `vin`: 17 位候选串,校验位位置的占位内容不参与计算
///   （其权重为 0,但字符必须合法）
///
/// # 返回
/// - '0'-'9' 或 'X'（余数 10）
pub fn compute_check_digit(vin: &str) -> TransformResult<char> {
    if vin.chars().count() != VIN_LENGTH {
        return Err(TransformError::InvalidIdentityConfig {
            field: "vin".to_string(),
            message: format!("VIN 长度必须为 {}, 实际 {}", VIN_LENGTH, vin.len()),
        });
    }

    let mut sum: u32 = 0;
    for (idx, c) in vin.chars().enumerate() {
        if idx == CHECK_DIGIT_INDEX {
            continue;
        }
        let value = transliterate(c).ok_or_else(|| TransformError::InvalidIdentityConfig {
            field: "vin".to_string(),
            message: format!("非法字符 '{}' (位置 {})", c, idx + 1),
        })?;
        sum += value * CHECK_WEIGHTS[idx];
    }

    let remainder = sum % 11;
    Ok(if remainder == 10 {
        'X'
    } else {
        char::from(b'0' + remainder as u8)
    })
}

/// 校验 VIN: 重算校验位并与内嵌值比对
pub fn validate_check_digit(vin: &str) -> bool {
    if vin.chars().count() != VIN_LENGTH {
        return false;
    }
    let embedded = match vin.chars().nth(CHECK_DIGIT_INDEX) {
        Some(c) => c,
        None => return false,
    };
    match compute_check_digit(vin) {
        Ok(expected) => expected == embedded,
        Err(_) => false,
    }
}

/// 年份 → 年份码（30 年循环,1980 = 'A'）
pub fn year_code(year: i32) -> char {
    let idx = (year - 1_980).rem_euclid(30) as usize;
    char::from(YEAR_CODE_TABLE[idx])
}

// ==========================================
// VinGenerator - 标识生成器
// ==========================================

pub struct VinGenerator {
    store: Arc<SequenceStore>,
}

impl VinGenerator {
    /// 创建新的标识生成器
    ///
    /// # 参数
    /// - store: 持久化序列计数器存储（跨 worker 共享）
    pub fn new(store: Arc<SequenceStore>) -> Self {
        Self { store }
    }

    /// 生成 n 个互不重复、校验合规的 VIN
    ///
    /// 序列段预留（含落盘）发生在返回之前;
    /// 仓储层任何失败都映射为 SequencePersistenceFailure,
    /// 该次调用不发出任何标识
    ///
    /// # 返回
    /// 实际生成的 VIN 列表（序列空间不足时少于 n,并记 warn）
    pub fn generate(&self, cfg: &IdentityConfig, n: u32) -> TransformResult<Vec<String>> {
        let (wmi, vds, plant_code) = Self::validate_config(cfg)?;
        let yc = year_code(cfg.model_year);
        let key = SequenceKey::new(&wmi, &vds, yc, plant_code);

        let range = self
            .store
            .reserve(&key, n)
            .map_err(|e| TransformError::SequencePersistenceFailure(e.to_string()))?;

        if range.granted < n {
            // 生成预算耗尽: 记警告,照常返回可生成的部分
            warn!(
                wmi = %wmi,
                vds = %vds,
                year_code = %yc,
                requested = n,
                granted = range.granted,
                "序列空间不足,超额部分不予赋号"
            );
        }

        let mut vins = Vec::with_capacity(range.granted as usize);
        for seq in range.iter() {
            vins.push(self.compose(&wmi, &vds, yc, plant_code, seq)?);
        }

        debug!(count = vins.len(), "VIN 生成完成");
        Ok(vins)
    }

    /// 为记录中符合资格的商品行赋 VIN
    ///
    /// 资格: 有车辆识别提示且尚无底盘号。
    /// 配置数量超出资格行数时,超额仅记 warn 并不予赋号
    /// （IdentityExhausted 语义 —— 不是错误,处理继续）
    ///
    /// # 返回
    /// 实际赋号数量
    pub fn assign(&self, record: &mut DocumentRecord, cfg: &IdentityConfig) -> TransformResult<u32> {
        let eligible: Vec<usize> = record
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.eligible_for_identity())
            .map(|(idx, _)| idx)
            .collect();

        if cfg.quantity as usize > eligible.len() {
            warn!(
                requested = cfg.quantity,
                eligible = eligible.len(),
                "申请数量超出可赋号行数,超额部分不予赋号"
            );
        }

        // 先收敛需求量再预留序列,避免烧掉用不上的序号
        let wanted = (cfg.quantity as usize).min(eligible.len()) as u32;
        let vins = self.generate(cfg, wanted)?;
        let assigned = vins.len() as u32;

        for (idx, vin) in eligible.into_iter().zip(vins) {
            record.items[idx].chassis_number = Some(vin);
        }

        info!(
            requested = cfg.quantity,
            assigned = assigned,
            "标识赋号完成"
        );

        Ok(assigned)
    }

    /// 校验并标准化生成配置
    fn validate_config(cfg: &IdentityConfig) -> TransformResult<(String, String, char)> {
        let wmi = cfg.wmi.trim().to_uppercase();
        if wmi.chars().count() != 3 || !Self::all_vin_chars(&wmi) {
            return Err(TransformError::InvalidIdentityConfig {
                field: "wmi".to_string(),
                message: format!("制造商代码必须为 3 位合法 VIN 字符, 实际 {:?}", cfg.wmi),
            });
        }

        let vds = cfg.vds.trim().to_uppercase();
        if vds.chars().count() != 5 || !Self::all_vin_chars(&vds) {
            return Err(TransformError::InvalidIdentityConfig {
                field: "vds".to_string(),
                message: format!("描述段代码必须为 5 位合法 VIN 字符, 实际 {:?}", cfg.vds),
            });
        }

        let plant_code = cfg.plant_code.to_ascii_uppercase();
        if !VIN_ALPHABET.contains(plant_code) {
            return Err(TransformError::InvalidIdentityConfig {
                field: "plant_code".to_string(),
                message: format!("工厂码必须为合法 VIN 字符, 实际 {:?}", cfg.plant_code),
            });
        }

        Ok((wmi, vds, plant_code))
    }

    fn all_vin_chars(value: &str) -> bool {
        value.chars().all(|c| VIN_ALPHABET.contains(c))
    }

    /// 组装单个 VIN: 固定段 + 序列段,末了计算并插入校验位
    ///
    /// 校验位不参与序列计数,仅作为完整性校验嵌入
    fn compose(
        &self,
        wmi: &str,
        vds: &str,
        yc: char,
        plant_code: char,
        seq: u32,
    ) -> TransformResult<String> {
        // 占位 '0' 先填校验位,计算后替换
        let candidate = format!("{}{}0{}{}{:06}", wmi, vds, yc, plant_code, seq);
        let check = compute_check_digit(&candidate)?;

        let mut vin: Vec<char> = candidate.chars().collect();
        vin[CHECK_DIGIT_INDEX] = check;
        Ok(vin.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_check_digit() {
        // 公开参考例: 11111111111111111 校验位为 1
        assert!(validate_check_digit("11111111111111111"));
        // 公开参考例: 1M8GDM9AXKP042788 校验位为 X
        assert!(validate_check_digit("1M8GDM9AXKP042788"));
    }

    #[test]
    fn test_year_code_cycle() {
        assert_eq!(year_code(1980), 'A');
        assert_eq!(year_code(2000), 'Y');
        assert_eq!(year_code(2001), '1');
        assert_eq!(year_code(2009), '9');
        // 30 年循环
        assert_eq!(year_code(2010), 'A');
        assert_eq!(year_code(2016), 'G');
    }

    #[test]
    fn test_transliterate_excludes_ambiguous() {
        assert_eq!(transliterate('I'), None);
        assert_eq!(transliterate('O'), None);
        assert_eq!(transliterate('Q'), None);
        assert_eq!(transliterate('A'), Some(1));
        assert_eq!(transliterate('Z'), Some(9));
    }
}
