// ==========================================
// RFCV 转换系统 - 商品行分组引擎
// ==========================================
// 职责: 无标识行按税号合并 + 件数再计量
// 红线: 携带唯一标识（底盘号）的行永不修改、永不合并
//       —— 监管规则: 已个体识别的货物必须保持个体申报
// 说明: 全函数,对任何良构行序无失败路径;
//       空序列返回空序列
// ==========================================

use crate::domain::item::LineItem;
use tracing::{debug, info};

// ==========================================
// GroupingEngine - 分组引擎
// ==========================================

// 无状态引擎,全部输入通过参数传入
pub struct GroupingEngine;

impl GroupingEngine {
    /// 创建新的分组引擎
    pub fn new() -> Self {
        Self
    }

    /// 执行分组与件数再计量
    ///
    /// # 参数
    /// - `items`: 文档全部商品行（有序）
    /// - `total_packages`: 申报总件数（汇总字段）
    ///
    /// # 算法
    /// 1. 按是否携带标识切分为 withIdentity / withoutIdentity
    /// 2. withIdentity 原样保留（相对顺序不变）
    /// 3. withoutIdentity 按税号精确分组
    /// 4. 不存在重复税号（各组均为单行）⇒ 显式 no-op,数量不动
    /// 5. 否则每组保留首行作代表; 总件数赋给**第一组**代表的数量,
    ///    其余各组代表数量置 0
    /// 6. 输出顺序: withIdentity 在前,代表行按首现顺序在后
    pub fn group(&self, items: Vec<LineItem>, total_packages: Option<u32>) -> Vec<LineItem> {
        if items.is_empty() {
            return items;
        }

        let (with_identity, without_identity): (Vec<LineItem>, Vec<LineItem>) =
            items.into_iter().partition(|item| item.has_identity());

        // 按税号分组,组序 = 首现顺序
        let mut group_order: Vec<String> = Vec::new();
        let mut groups: std::collections::HashMap<String, Vec<LineItem>> =
            std::collections::HashMap::new();

        for item in without_identity {
            if !groups.contains_key(&item.hs_code) {
                group_order.push(item.hs_code.clone());
            }
            groups.entry(item.hs_code.clone()).or_default().push(item);
        }

        // 合并的触发条件是税号重复; 各组均为单行时无可合并,显式 no-op
        let has_duplicates = groups.values().any(|members| members.len() >= 2);
        if !has_duplicates {
            debug!(
                distinct_codes = group_order.len(),
                "无标识行税号互不重复,分组跳过,数量保持不变"
            );
            let mut output = with_identity;
            for code in &group_order {
                if let Some(members) = groups.remove(code) {
                    output.extend(members);
                }
            }
            return output;
        }

        // 总件数缺失时无法再计量,同样走 no-op 路径
        let Some(total_packages) = total_packages else {
            debug!("申报总件数缺失,无法再计量,分组跳过");
            let mut output = with_identity;
            for code in &group_order {
                if let Some(members) = groups.remove(code) {
                    output.extend(members);
                }
            }
            return output;
        };

        let group_count = group_order.len();
        let mut output = with_identity;

        for (group_idx, code) in group_order.iter().enumerate() {
            let members = groups.remove(code).unwrap_or_default();
            let merged_count = members.len();

            let Some(mut representative) = self.merge_group(members) else {
                continue;
            };

            // 总件数落在第一组代表上,其余组代表数量置 0
            representative.quantity = if group_idx == 0 {
                f64::from(total_packages)
            } else {
                0.0
            };

            debug!(
                hs_code = %code,
                merged = merged_count,
                quantity = representative.quantity,
                "分组代表行生成"
            );

            output.push(representative);
        }

        info!(
            groups = group_count,
            total_packages = total_packages,
            "商品行分组完成"
        );

        output
    }

    /// 合并一组为代表行; 空组返回 None
    ///
    /// 代表为组内首行（原始顺序）,保留其税号与描述;
    /// FOB 与重量按组累加 —— 代表行承载整组价值,
    /// 后续保险分摊按组合计权重进行
    fn merge_group(&self, members: Vec<LineItem>) -> Option<LineItem> {
        let mut iter = members.into_iter();
        let mut representative = iter.next()?;

        for member in iter {
            representative.fob_value = sum_optional(representative.fob_value, member.fob_value);
            representative.gross_weight_kg =
                sum_optional(representative.gross_weight_kg, member.gross_weight_kg);
            representative.net_weight_kg =
                sum_optional(representative.net_weight_kg, member.net_weight_kg);
        }

        Some(representative)
    }
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Option 加法: 双方均缺失时保持缺失
fn sum_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (x, y) => Some(x.unwrap_or(0.0) + y.unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(hs_code: &str, quantity: f64, chassis: Option<&str>) -> LineItem {
        LineItem {
            line_no: 0,
            origin_line_no: None,
            hs_code: hs_code.to_string(),
            description: None,
            quantity,
            gross_weight_kg: None,
            net_weight_kg: None,
            fob_value: None,
            chassis_number: chassis.map(|v| v.to_string()),
            identity_hint: None,
            insurance_share: None,
        }
    }

    #[test]
    fn test_empty_sequence_returns_empty() {
        let out = GroupingEngine::new().group(vec![], Some(10));
        assert!(out.is_empty());
    }

    #[test]
    fn test_identified_items_are_never_merged() {
        let items = vec![
            item("87032319", 1.0, Some("VIN-A")),
            item("87032319", 1.0, Some("VIN-B")),
        ];
        let out = GroupingEngine::new().group(items, Some(5));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].quantity, 1.0);
        assert_eq!(out[1].quantity, 1.0);
    }

    #[test]
    fn test_merged_group_sums_weights() {
        let mut a = item("84089000", 1.0, None);
        a.fob_value = Some(100.0);
        let mut b = item("84089000", 2.0, None);
        b.fob_value = Some(50.0);
        let mut c = item("84148090", 3.0, None);
        c.fob_value = Some(10.0);

        let out = GroupingEngine::new().group(vec![a, b, c], Some(42));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].fob_value, Some(150.0));
        assert_eq!(out[0].quantity, 42.0);
        assert_eq!(out[1].quantity, 0.0);
    }
}
