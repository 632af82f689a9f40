// ==========================================
// RFCV 转换系统 - 记录构建引擎
// ==========================================
// 职责: 提取中间形态 + 调用方汇率 → DocumentRecord
// 契约: 任一必填字段无法解析 ⇒ MalformedDocument,
//       报告**首个**出错字段（按声明顺序检查）
// 红线: 汇率由调用方强制提供,缺失即失败（fail closed）
// ==========================================

use crate::domain::extraction::{RawContainerRow, RawExtraction, RawItemRow};
use crate::domain::item::{ContainerInfo, LineItem};
use crate::domain::record::{
    DocumentRecord, Financial, Identification, Trader, Transport, Valuation,
};
use crate::domain::types::{TraderRole, TransportMode};
use crate::engine::error::{TransformError, TransformResult};
use crate::engine::numeric::{
    compute_insurance, parse_optional_decimal, parse_optional_u32, parse_strict_decimal,
};
use crate::engine::vehicle_detector::VehicleDetector;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

// ==========================================
// BuildOptions - 单文档构建选项
// ==========================================

/// 记录构建的调用方输入
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// 汇率（强制,任何货币换算在其缺失时直接失败）
    pub exchange_rate: f64,
    /// 付款参考号（可选,原样存储; 缺失时字段置空串）
    pub payment_reference: Option<String>,
}

// ==========================================
// RecordBuilder - 记录构建引擎
// ==========================================

pub struct RecordBuilder {
    detector: VehicleDetector,
}

impl RecordBuilder {
    /// 使用显式车辆识别引擎创建
    pub fn new(detector: VehicleDetector) -> Self {
        Self { detector }
    }

    /// 使用默认关键词表创建
    pub fn with_defaults() -> Self {
        Self::new(VehicleDetector::with_defaults())
    }

    /// 构建文档记录
    ///
    /// # 参数
    /// - `raw`: 字段提取器输出
    /// - `opts`: 汇率 + 可选付款参考号
    ///
    /// # 返回
    /// - `Ok(DocumentRecord)`: 全部块构建完成
    /// - `Err(MalformedDocument | InvalidNumericFormat)`: 首个出错字段
    pub fn build(&self, raw: &RawExtraction, opts: &BuildOptions) -> TransformResult<DocumentRecord> {
        // 汇率最先校验: 估价与保险全依赖它
        if !(opts.exchange_rate.is_finite() && opts.exchange_rate > 0.0) {
            return Err(TransformError::malformed(
                "exchange_rate",
                format!("汇率必须为正数, 实际 {}", opts.exchange_rate),
            ));
        }

        let identification = self.build_identification(raw, opts)?;
        let traders = self.build_traders(raw);
        let transport = self.build_transport(raw);
        let financial = self.build_financial(raw, opts)?;
        let valuation = self.build_valuation(raw, opts)?;
        let items = self.build_items(raw)?;
        let containers = self.build_containers(raw);

        info!(
            rfcv_number = %identification.rfcv_number,
            items = items.len(),
            containers = containers.len(),
            insurance = ?valuation.insurance,
            "文档记录构建完成"
        );

        Ok(DocumentRecord {
            identification,
            traders,
            transport,
            financial,
            valuation,
            items,
            containers,
        })
    }

    // ==========================================
    // 标识块（必填字段,声明顺序即检查顺序）
    // ==========================================

    fn build_identification(
        &self,
        raw: &RawExtraction,
        _opts: &BuildOptions,
    ) -> TransformResult<Identification> {
        let rfcv_number = self.required(raw, "rfcv_number")?;
        let issue_date = self.parse_date("issue_date", &self.required(raw, "issue_date")?)?;
        let fdi_number = self.required(raw, "fdi_number")?;

        Ok(Identification {
            rfcv_number,
            issue_date,
            fdi_number,
            incoterm: raw.field("incoterm").map(|v| v.to_uppercase()),
        })
    }

    /// 读取必填字段
    fn required(&self, raw: &RawExtraction, key: &str) -> TransformResult<String> {
        raw.field(key)
            .map(|v| v.to_string())
            .ok_or_else(|| TransformError::malformed(key, "必填字段缺失"))
    }

    /// 解析日期（模板形态 DD/MM/YYYY,兼容 DD-MM-YYYY）
    fn parse_date(&self, field: &str, value: &str) -> TransformResult<NaiveDate> {
        NaiveDate::parse_from_str(value, "%d/%m/%Y")
            .or_else(|_| NaiveDate::parse_from_str(value, "%d-%m-%Y"))
            .map_err(|_| {
                TransformError::malformed(field, format!("期望 DD/MM/YYYY, 实际 {}", value))
            })
    }

    // ==========================================
    // 贸易方块（三方条目,字段全部可选）
    // ==========================================

    fn build_traders(&self, raw: &RawExtraction) -> Vec<Trader> {
        let mut traders = Vec::with_capacity(3);

        traders.push(Trader {
            role: TraderRole::Exporter,
            name: raw.field("exporter_name").map(|v| v.to_string()),
            code: None,
        });
        traders.push(Trader {
            role: TraderRole::Importer,
            name: raw.field("importer_name").map(|v| v.to_string()),
            code: raw.field("importer_code").map(|v| v.to_string()),
        });
        traders.push(Trader {
            role: TraderRole::Declarant,
            name: raw.field("declarant_name").map(|v| v.to_string()),
            code: raw.field("declarant_code").map(|v| v.to_string()),
        });

        traders
    }

    // ==========================================
    // 运输块
    // ==========================================

    fn build_transport(&self, raw: &RawExtraction) -> Transport {
        Transport {
            mode: raw.field("transport_mode").map(TransportMode::parse),
            vessel_name: raw.field("vessel_name").map(|v| v.to_string()),
            bill_of_lading: raw.field("bill_of_lading").map(|v| v.to_string()),
            country_of_origin: raw
                .field("country_of_origin")
                .map(|v| v.to_uppercase()),
            country_of_provenance: raw
                .field("country_of_provenance")
                .map(|v| v.to_uppercase()),
        }
    }

    // ==========================================
    // 财务块
    // ==========================================

    fn build_financial(
        &self,
        raw: &RawExtraction,
        opts: &BuildOptions,
    ) -> TransformResult<Financial> {
        // 付款参考号: 提供则原样存储,否则空串（非 None）
        // 以便下游系统人工补录
        let payment_reference = opts.payment_reference.clone().unwrap_or_default();

        Ok(Financial {
            payment_reference,
            currency: raw.field("currency").map(|v| v.to_uppercase()),
            total_packages: parse_optional_u32("total_packages", raw.field("total_packages"))?,
            gross_weight_kg: parse_optional_decimal("gross_weight", raw.field("gross_weight"))?,
        })
    }

    // ==========================================
    // 估价块
    // ==========================================

    fn build_valuation(
        &self,
        raw: &RawExtraction,
        opts: &BuildOptions,
    ) -> TransformResult<Valuation> {
        let fob_total = parse_optional_decimal("fob_total", raw.field("fob_total"))?;
        let freight_total = parse_optional_decimal("freight_total", raw.field("freight_total"))?;

        // 不变式: insurance 为 Some 当且仅当三项输入均存在且为正
        let insurance = compute_insurance(fob_total, freight_total, opts.exchange_rate);
        if insurance.is_none() {
            warn!(
                fob_total = ?fob_total,
                freight_total = ?freight_total,
                "保险输入不完整,保险额置空,分摊将整体跳过"
            );
        }

        Ok(Valuation {
            fob_total,
            freight_total,
            insurance,
            exchange_rate: opts.exchange_rate,
        })
    }

    // ==========================================
    // 商品行
    // ==========================================

    fn build_items(&self, raw: &RawExtraction) -> TransformResult<Vec<LineItem>> {
        let mut items = Vec::with_capacity(raw.item_rows.len());

        for row in &raw.item_rows {
            match self.build_item(row, items.len() as u32 + 1)? {
                Some(item) => items.push(item),
                None => continue,
            }
        }

        Ok(items)
    }

    /// 构建单行商品; 税号空白的行跳过（返回 None）
    fn build_item(&self, row: &RawItemRow, line_no: u32) -> TransformResult<Option<LineItem>> {
        let Some(hs_code) = row.hs_code.as_deref().map(str::trim).filter(|v| !v.is_empty())
        else {
            warn!(row = row.row_number, "税号空白,商品行已跳过");
            return Ok(None);
        };

        let field = |name: &str| format!("item[{}].{}", row.row_number, name);

        let quantity = match row.quantity.as_deref() {
            Some(v) if !v.trim().is_empty() => parse_strict_decimal(&field("quantity"), v)?,
            _ => {
                warn!(row = row.row_number, "数量缺失,记 0");
                0.0
            }
        };

        let gross_weight_kg =
            parse_optional_decimal(&field("gross_weight"), row.gross_weight.as_deref())?;
        let net_weight_kg =
            parse_optional_decimal(&field("net_weight"), row.net_weight.as_deref())?;
        let fob_value = parse_optional_decimal(&field("fob_value"), row.fob_value.as_deref())?;
        let origin_line_no =
            parse_optional_u32(&field("origin_line_no"), row.origin_line_no.as_deref())?;

        // 底盘号: 去空白 + 大写; 空白视为缺失
        let chassis_number = row
            .chassis_number
            .as_deref()
            .map(|v| v.trim().to_uppercase())
            .filter(|v| !v.is_empty());

        let identity_hint = self.detector.detect(hs_code, row.description.as_deref());
        if let Some(hint) = &identity_hint {
            debug!(
                hs_code = hs_code,
                confidence = %hint.confidence,
                "车辆识别提示"
            );
        }

        Ok(Some(LineItem {
            line_no,
            origin_line_no,
            hs_code: hs_code.to_string(),
            description: row.description.clone(),
            quantity,
            gross_weight_kg,
            net_weight_kg,
            fob_value,
            chassis_number,
            identity_hint,
            insurance_share: None,
        }))
    }

    // ==========================================
    // 集装箱
    // ==========================================

    fn build_containers(&self, raw: &RawExtraction) -> Vec<ContainerInfo> {
        raw.container_rows
            .iter()
            .filter_map(|row: &RawContainerRow| {
                let number = row
                    .container_number
                    .as_deref()
                    .map(|v| v.trim().to_uppercase())
                    .filter(|v| !v.is_empty())?;

                Some(ContainerInfo {
                    container_number: number,
                    seal_number: row.seal_number.clone(),
                    type_code: row.type_code.as_deref().map(|v| v.to_uppercase()),
                })
            })
            .collect()
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}
