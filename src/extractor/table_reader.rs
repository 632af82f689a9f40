// ==========================================
// RFCV 转换系统 - 表格读取器
// ==========================================
// 职责: 从已检测表格中识别商品表/集装箱表,
//       按表头别名建立列映射并输出原始字符串行
// 红线: 此层不做类型转换,数值/日期解析归 RecordBuilder
// ==========================================

use crate::domain::extraction::{RawContainerRow, RawItemRow, RawTable};
use crate::extractor::normalizer::{normalize_cell, normalize_label};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 商品表列别名（标准列 → 表头别名,已按 normalize_label 形态书写）
const ITEM_COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("hs_code", &["POSITION TARIFAIRE", "CODE SH", "NTS"]),
    ("description", &["DESIGNATION", "DESIGNATION COMMERCIALE", "DESCRIPTION"]),
    ("quantity", &["QUANTITE", "QTE"]),
    ("gross_weight", &["POIDS BRUT"]),
    ("net_weight", &["POIDS NET"]),
    ("fob_value", &["VALEUR FOB", "FOB"]),
    ("chassis_number", &["N° CHASSIS", "CHASSIS", "VIN"]),
    ("origin_line_no", &["N° LIGNE", "LIGNE", "ART"]),
];

/// 集装箱表列别名
const CONTAINER_COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("container_number", &["N° CONTENEUR", "CONTENEUR", "TC N°"]),
    ("seal_number", &["N° SCELLE", "SCELLE", "PLOMB"]),
    ("type_code", &["TYPE TC", "TYPE"]),
];

// ==========================================
// TableReader - 表格读取器
// ==========================================

pub struct TableReader;

impl TableReader {
    pub fn new() -> Self {
        Self
    }

    /// 从全部表格中读取商品行与集装箱行
    ///
    /// 识别规则:
    /// - 商品表: 表头同时命中 `hs_code` 与 `quantity` 列
    /// - 集装箱表: 表头命中 `container_number` 列
    /// - 同类表格可跨页出现多张,行按出现顺序累加
    pub fn read(&self, tables: &[RawTable]) -> (Vec<RawItemRow>, Vec<RawContainerRow>) {
        let mut items: Vec<RawItemRow> = Vec::new();
        let mut containers: Vec<RawContainerRow> = Vec::new();

        for (table_idx, table) in tables.iter().enumerate() {
            let Some(header) = table.rows.first() else {
                continue;
            };

            if let Some(columns) = self.map_columns(header, ITEM_COLUMN_ALIASES) {
                if columns.contains_key("hs_code") && columns.contains_key("quantity") {
                    debug!(table = table_idx, "识别为商品表");
                    self.read_item_rows(table, &columns, &mut items);
                    continue;
                }
            }

            if let Some(columns) = self.map_columns(header, CONTAINER_COLUMN_ALIASES) {
                if columns.contains_key("container_number") {
                    debug!(table = table_idx, "识别为集装箱表");
                    self.read_container_rows(table, &columns, &mut containers);
                    continue;
                }
            }

            warn!(table = table_idx, "未识别的表格,已跳过");
        }

        (items, containers)
    }

    /// 表头行 → 标准列名到列下标的映射
    ///
    /// 无任何命中时返回 None
    fn map_columns(
        &self,
        header: &[String],
        aliases: &[(&'static str, &[&str])],
    ) -> Option<HashMap<&'static str, usize>> {
        let mut columns: HashMap<&'static str, usize> = HashMap::new();

        for (idx, cell) in header.iter().enumerate() {
            let label = normalize_label(cell);
            if label.is_empty() {
                continue;
            }

            for (key, names) in aliases {
                if columns.contains_key(key) {
                    continue;
                }
                if names.iter().any(|name| label == *name) {
                    columns.insert(key, idx);
                }
            }
        }

        if columns.is_empty() {
            None
        } else {
            Some(columns)
        }
    }

    fn cell(
        &self,
        row: &[String],
        columns: &HashMap<&'static str, usize>,
        key: &str,
    ) -> Option<String> {
        columns
            .get(key)
            .and_then(|idx| row.get(*idx))
            .and_then(|v| normalize_cell(v))
    }

    fn read_item_rows(
        &self,
        table: &RawTable,
        columns: &HashMap<&'static str, usize>,
        out: &mut Vec<RawItemRow>,
    ) {
        for (row_idx, row) in table.rows.iter().enumerate().skip(1) {
            // 全空行（分页产物）跳过
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }

            out.push(RawItemRow {
                hs_code: self.cell(row, columns, "hs_code"),
                description: self.cell(row, columns, "description"),
                quantity: self.cell(row, columns, "quantity"),
                gross_weight: self.cell(row, columns, "gross_weight"),
                net_weight: self.cell(row, columns, "net_weight"),
                fob_value: self.cell(row, columns, "fob_value"),
                chassis_number: self.cell(row, columns, "chassis_number"),
                origin_line_no: self.cell(row, columns, "origin_line_no"),
                row_number: row_idx,
            });
        }
    }

    fn read_container_rows(
        &self,
        table: &RawTable,
        columns: &HashMap<&'static str, usize>,
        out: &mut Vec<RawContainerRow>,
    ) {
        for (row_idx, row) in table.rows.iter().enumerate().skip(1) {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }

            out.push(RawContainerRow {
                container_number: self.cell(row, columns, "container_number"),
                seal_number: self.cell(row, columns, "seal_number"),
                type_code: self.cell(row, columns, "type_code"),
                row_number: row_idx,
            });
        }
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_item_table_detection() {
        let tables = vec![table(&[
            &["Position Tarifaire", "Designation", "Quantite", "Valeur FOB"],
            &["84089000", "MOTEUR DIESEL", "3", "12683.65"],
            &["", "", "", ""],
        ])];

        let (items, containers) = TableReader::new().read(&tables);
        assert_eq!(items.len(), 1);
        assert!(containers.is_empty());
        assert_eq!(items[0].hs_code.as_deref(), Some("84089000"));
        assert_eq!(items[0].fob_value.as_deref(), Some("12683.65"));
    }

    #[test]
    fn test_container_table_detection() {
        let tables = vec![table(&[
            &["N° Conteneur", "N° Scelle", "Type"],
            &["MSKU1234567", "S-9981", "40HC"],
        ])];

        let (items, containers) = TableReader::new().read(&tables);
        assert!(items.is_empty());
        assert_eq!(containers.len(), 1);
        assert_eq!(
            containers[0].container_number.as_deref(),
            Some("MSKU1234567")
        );
    }

    #[test]
    fn test_item_rows_accumulate_across_tables() {
        let header: &[&str] = &["Code SH", "Quantite"];
        let tables = vec![
            table(&[header, &["84089000", "1"]]),
            table(&[header, &["84148090", "2"]]),
        ];

        let (items, _) = TableReader::new().read(&tables);
        assert_eq!(items.len(), 2);
    }
}
