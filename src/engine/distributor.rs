// ==========================================
// RFCV 转换系统 - 比例分摊引擎
// ==========================================
// 职责: 将保险总额按 FOB 权重分摊到商品行
// 算法: 最大余数法 (Largest Remainder Method)
// 红线: Σ份额 == 总额 **精确**成立 —— 海关对账依赖此守恒;
//       朴素浮点按比例取整会静默破坏守恒,
//       因此全部分配在 u128 整数域内完成
// ==========================================

use crate::domain::record::DocumentRecord;
use tracing::{debug, info};

/// 权重定标因子: FOB 小数权重 → 整数毫单位
///
/// 定标一次后整个分配过程无浮点参与
const WEIGHT_SCALE: f64 = 1_000.0;

/// 单行定标权重上限
///
/// 约束: amount < 2^63 且每个权重 ≤ 2^64-1,
/// 则 amount × w_i < 2^127,乘积在 u128 内不溢出;
/// 截断只压缩极端权重的比例,守恒不受影响
const MAX_SCALED_WEIGHT: u128 = u64::MAX as u128;

// ==========================================
// ValueDistributor - 比例分摊引擎
// ==========================================

// 无状态引擎
pub struct ValueDistributor;

impl ValueDistributor {
    pub fn new() -> Self {
        Self
    }

    /// 最大余数法分摊
    ///
    /// # 参数
    /// - `total`: 聚合总额 A（非负整数）
    /// - `weights`: 各行权重 w_i（非负; NaN/负值按 0 计）
    ///
    /// # 返回
    /// 份额序列,满足 `Σ s_i == total` 精确成立
    /// （W = Σw_i 为 0 时全部份额为 0; 空序列返回空）
    ///
    /// # 算法
    /// 1. s_i = floor(A × w_i / W) 作临时份额
    /// 2. 余量 r = A − Σs_i
    /// 3. 按小数余数降序（同值按原始顺序）给前 r 行各 +1
    pub fn distribute(&self, total: i64, weights: &[f64]) -> Vec<i64> {
        if weights.is_empty() {
            return Vec::new();
        }
        if total <= 0 {
            return vec![0; weights.len()];
        }

        // 定标为整数毫单位,单行截断到 MAX_SCALED_WEIGHT
        // (浮点→整数转换本身为饱和语义,这里再收紧到乘积安全域)
        let scaled: Vec<u128> = weights
            .iter()
            .map(|w| {
                if w.is_finite() && *w > 0.0 {
                    ((w * WEIGHT_SCALE).round() as u128).min(MAX_SCALED_WEIGHT)
                } else {
                    0
                }
            })
            .collect();

        let weight_sum: u128 = scaled.iter().sum();
        if weight_sum == 0 {
            debug!("全部权重为 0,份额全 0");
            return vec![0; weights.len()];
        }

        let amount = total as u128;

        // 临时份额（floor）与整数余数
        let mut floors: Vec<u128> = Vec::with_capacity(scaled.len());
        let mut remainders: Vec<u128> = Vec::with_capacity(scaled.len());
        for w in &scaled {
            let product = amount * w;
            floors.push(product / weight_sum);
            remainders.push(product % weight_sum);
        }

        let assigned: u128 = floors.iter().sum();
        let leftover = (amount - assigned) as usize;

        // 小数余数降序,同值按原始下标升序
        let mut order: Vec<usize> = (0..scaled.len()).collect();
        order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]).then(a.cmp(b)));

        for idx in order.into_iter().take(leftover) {
            floors[idx] += 1;
        }

        debug!(
            total = total,
            lines = weights.len(),
            leftover = leftover,
            "最大余数法分摊完成"
        );

        floors.into_iter().map(|v| v as i64).collect()
    }

    /// 将估价块中的保险额分摊到商品行
    ///
    /// - 保险缺席（None）⇒ 分摊器不被调用,各行份额保持 None
    /// - 无商品行 ⇒ 不做任何分配
    pub fn apply_insurance(&self, record: &mut DocumentRecord) {
        let Some(insurance) = record.valuation.insurance else {
            debug!("保险额缺席,分摊整体跳过");
            return;
        };
        if record.items.is_empty() {
            debug!("无商品行,分摊跳过");
            return;
        }

        let weights: Vec<f64> = record
            .items
            .iter()
            .map(|item| item.fob_value.unwrap_or(0.0))
            .collect();

        let shares = self.distribute(insurance, &weights);
        for (item, share) in record.items.iter_mut().zip(shares) {
            item.insurance_share = Some(share);
        }

        info!(
            insurance = insurance,
            lines = record.items.len(),
            "保险额分摊完成"
        );
    }
}

impl Default for ValueDistributor {
    fn default() -> Self {
        Self::new()
    }
}
