// ==========================================
// RFCV 转换系统 - 字段定位器
// ==========================================
// 职责: 在页面文本行中按标签定位头部字段
// 依据: RFCV 固定模板 —— 字段位置与标签由单一已知模板确定
// 说明: 标签为法语(含别名),标准键为 snake_case 英文
// ==========================================

use crate::domain::extraction::RawPage;
use crate::extractor::normalizer::{normalize_label, normalize_line};
use std::collections::HashMap;
use tracing::debug;

/// 标准键 → 标签别名表
///
/// 别名已按 normalize_label 形态书写（大写、标准撇号）。
/// 模板固定,但扫描版式存在标签变体,故逐键维护别名
const LABEL_ALIASES: &[(&str, &[&str])] = &[
    ("rfcv_number", &["N° RFCV", "NO RFCV", "NUMERO RFCV"]),
    ("issue_date", &["DATE D'EMISSION", "DATE EMISSION"]),
    ("fdi_number", &["N° FDI", "NO FDI", "NUMERO FDI"]),
    ("exporter_name", &["EXPORTATEUR", "NOM EXPORTATEUR"]),
    ("importer_name", &["IMPORTATEUR", "NOM IMPORTATEUR"]),
    ("importer_code", &["CODE IMPORTATEUR"]),
    ("declarant_name", &["DECLARANT", "NOM DECLARANT"]),
    ("declarant_code", &["CODE DECLARANT"]),
    ("country_of_origin", &["PAYS D'ORIGINE"]),
    ("country_of_provenance", &["PAYS DE PROVENANCE"]),
    ("transport_mode", &["MODE DE TRANSPORT", "TRANSPORT"]),
    ("vessel_name", &["NAVIRE", "NOM DU NAVIRE"]),
    ("bill_of_lading", &["N° CONNAISSEMENT", "CONNAISSEMENT", "BL N°"]),
    ("incoterm", &["INCOTERME", "INCOTERM"]),
    ("currency", &["DEVISE", "MONNAIE"]),
    ("total_packages", &["NOMBRE DE COLIS", "TOTAL COLIS", "COLIS"]),
    ("gross_weight", &["POIDS BRUT TOTAL", "POIDS BRUT"]),
    ("fob_total", &["VALEUR FOB TOTALE", "VALEUR FOB", "FOB TOTAL"]),
    ("freight_total", &["VALEUR FRET", "FRET TOTAL", "FRET"]),
];

// ==========================================
// FieldLocator - 字段定位器
// ==========================================

pub struct FieldLocator;

impl FieldLocator {
    pub fn new() -> Self {
        Self
    }

    /// 扫描全部页面,返回 标准键 → 字段值
    ///
    /// 规则:
    /// - 行形态为 `LABEL : VALUE`（冒号前后空白任意）
    /// - 同一标准键首次命中生效,后续出现不覆盖
    /// - 别名按表内顺序尝试,长别名优先于短别名书写
    pub fn locate(&self, pages: &[RawPage]) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = HashMap::new();

        for page in pages {
            for line in &page.lines {
                let normalized = normalize_line(line);
                if normalized.is_empty() {
                    continue;
                }

                if let Some((key, value)) = self.match_line(&normalized) {
                    fields.entry(key.to_string()).or_insert_with(|| {
                        debug!(key = key, value = %value, "字段定位命中");
                        value
                    });
                }
            }
        }

        fields
    }

    /// 尝试将单行匹配为 `LABEL : VALUE`
    fn match_line(&self, line: &str) -> Option<(&'static str, String)> {
        let upper = normalize_label(line);

        for (key, aliases) in LABEL_ALIASES {
            for alias in *aliases {
                if !upper.starts_with(alias) {
                    continue;
                }

                // 标签后必须紧跟冒号（允许空白）
                let rest = &line[alias.len()..];
                let rest = rest.trim_start();
                if let Some(value) = rest.strip_prefix(':') {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some((key, value.to_string()));
                    }
                }
            }
        }

        None
    }
}

impl Default for FieldLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(lines: &[&str]) -> RawPage {
        RawPage {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_locate_basic_labels() {
        let pages = vec![page(&[
            "N° RFCV : CI20260812345",
            "DATE D\u{2019}EMISSION : 15/01/2026",
            "PAYS D'ORIGINE : FRANCE",
        ])];

        let fields = FieldLocator::new().locate(&pages);
        assert_eq!(fields.get("rfcv_number").unwrap(), "CI20260812345");
        assert_eq!(fields.get("issue_date").unwrap(), "15/01/2026");
        assert_eq!(fields.get("country_of_origin").unwrap(), "FRANCE");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let pages = vec![page(&["DEVISE : EUR", "DEVISE : USD"])];
        let fields = FieldLocator::new().locate(&pages);
        assert_eq!(fields.get("currency").unwrap(), "EUR");
    }

    #[test]
    fn test_label_without_value_is_skipped() {
        let pages = vec![page(&["NAVIRE :", "NAVIRE : MSC ANYA"])];
        let fields = FieldLocator::new().locate(&pages);
        assert_eq!(fields.get("vessel_name").unwrap(), "MSC ANYA");
    }
}
