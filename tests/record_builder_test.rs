// ==========================================
// RecordBuilder 单元测试
// ==========================================

use std::collections::HashMap;

use rfcv_transform::domain::extraction::{RawExtraction, RawItemRow};
use rfcv_transform::engine::error::TransformError;
use rfcv_transform::engine::record_builder::{BuildOptions, RecordBuilder};

/// 构造最小良构提取结果（必填字段齐全）
fn create_test_extraction() -> RawExtraction {
    let mut fields = HashMap::new();
    fields.insert("rfcv_number".to_string(), "CI20260815001".to_string());
    fields.insert("issue_date".to_string(), "15/08/2026".to_string());
    fields.insert("fdi_number".to_string(), "FDI-2026-04471".to_string());
    RawExtraction {
        fields,
        item_rows: Vec::new(),
        container_rows: Vec::new(),
    }
}

fn opts(exchange_rate: f64) -> BuildOptions {
    BuildOptions {
        exchange_rate,
        payment_reference: None,
    }
}

#[test]
fn test_minimal_document_builds() {
    println!("\n=== 测试：最小良构文档构建 ===");
    let builder = RecordBuilder::with_defaults();
    let record = builder.build(&create_test_extraction(), &opts(573.139)).unwrap();

    assert_eq!(record.identification.rfcv_number, "CI20260815001");
    assert_eq!(record.identification.fdi_number, "FDI-2026-04471");
    assert_eq!(record.traders.len(), 3);
    assert!(record.valuation.insurance.is_none());
}

#[test]
fn test_insurance_reference_scenario() {
    println!("\n=== 测试：保险额参考场景 ===");
    let mut raw = create_test_extraction();
    raw.fields
        .insert("fob_total".to_string(), "12683.65".to_string());
    raw.fields
        .insert("freight_total".to_string(), "2000".to_string());

    let builder = RecordBuilder::with_defaults();
    let record = builder.build(&raw, &opts(573.139)).unwrap();

    // ceil(2500 + (12683.65 + 2000) × 573.139 × 0.0015) = 15124
    assert_eq!(record.valuation.insurance, Some(15_124));
}

#[test]
fn test_insurance_absent_when_freight_missing() {
    let mut raw = create_test_extraction();
    raw.fields
        .insert("fob_total".to_string(), "12683.65".to_string());

    let builder = RecordBuilder::with_defaults();
    let record = builder.build(&raw, &opts(573.139)).unwrap();
    assert!(record.valuation.insurance.is_none());
}

#[test]
fn test_comma_decimal_separator_is_rejected() {
    println!("\n=== 测试：逗号小数分隔符拒绝 ===");
    let mut raw = create_test_extraction();
    raw.fields
        .insert("fob_total".to_string(), "12,683.65".to_string());

    let builder = RecordBuilder::with_defaults();
    let err = builder.build(&raw, &opts(573.139)).unwrap_err();

    match err {
        TransformError::InvalidNumericFormat { field, value } => {
            assert_eq!(field, "fob_total");
            assert_eq!(value, "12,683.65");
        }
        other => panic!("期望 InvalidNumericFormat, 实际 {:?}", other),
    }
}

#[test]
fn test_first_missing_field_is_reported() {
    println!("\n=== 测试：首个出错字段定位 ===");
    // rfcv_number 与 fdi_number 同时缺失: 报告声明顺序靠前者
    let mut raw = create_test_extraction();
    raw.fields.remove("rfcv_number");
    raw.fields.remove("fdi_number");

    let builder = RecordBuilder::with_defaults();
    let err = builder.build(&raw, &opts(573.139)).unwrap_err();
    assert_eq!(err.field(), Some("rfcv_number"));
}

#[test]
fn test_invalid_date_is_reported_with_field() {
    let mut raw = create_test_extraction();
    raw.fields
        .insert("issue_date".to_string(), "2026-08-15".to_string());

    let builder = RecordBuilder::with_defaults();
    let err = builder.build(&raw, &opts(573.139)).unwrap_err();
    assert_eq!(err.field(), Some("issue_date"));
}

#[test]
fn test_exchange_rate_must_be_positive() {
    let builder = RecordBuilder::with_defaults();
    let err = builder
        .build(&create_test_extraction(), &opts(0.0))
        .unwrap_err();
    assert_eq!(err.field(), Some("exchange_rate"));
}

#[test]
fn test_payment_reference_stored_verbatim_or_empty() {
    println!("\n=== 测试：付款参考号原样存储 ===");
    let builder = RecordBuilder::with_defaults();
    let raw = create_test_extraction();

    let with_ref = builder
        .build(
            &raw,
            &BuildOptions {
                exchange_rate: 573.139,
                payment_reference: Some("  TR/2026/0815-A  ".to_string()),
            },
        )
        .unwrap();
    // 原样存储: 不去空白,不变形
    assert_eq!(with_ref.financial.payment_reference, "  TR/2026/0815-A  ");

    let without_ref = builder.build(&raw, &opts(573.139)).unwrap();
    // 缺失时为空串而非 None
    assert_eq!(without_ref.financial.payment_reference, "");
}

#[test]
fn test_blank_hs_code_row_is_skipped() {
    let mut raw = create_test_extraction();
    raw.item_rows.push(RawItemRow {
        hs_code: Some("  ".to_string()),
        quantity: Some("5".to_string()),
        row_number: 1,
        ..Default::default()
    });
    raw.item_rows.push(RawItemRow {
        hs_code: Some("87032319".to_string()),
        quantity: Some("1".to_string()),
        chassis_number: Some(" vf1rfb00966248657 ".to_string()),
        row_number: 2,
        ..Default::default()
    });

    let builder = RecordBuilder::with_defaults();
    let record = builder.build(&raw, &opts(573.139)).unwrap();

    assert_eq!(record.items.len(), 1);
    assert_eq!(record.items[0].line_no, 1);
    // 底盘号去空白 + 大写
    assert_eq!(
        record.items[0].chassis_number.as_deref(),
        Some("VF1RFB00966248657")
    );
}

#[test]
fn test_missing_item_quantity_defaults_to_zero() {
    let mut raw = create_test_extraction();
    raw.item_rows.push(RawItemRow {
        hs_code: Some("84089000".to_string()),
        row_number: 1,
        ..Default::default()
    });

    let builder = RecordBuilder::with_defaults();
    let record = builder.build(&raw, &opts(573.139)).unwrap();
    assert_eq!(record.items[0].quantity, 0.0);
}

#[test]
fn test_vehicle_hint_from_chapter_87() {
    let mut raw = create_test_extraction();
    raw.item_rows.push(RawItemRow {
        hs_code: Some("87032319".to_string()),
        description: Some("BERLINE 5 PORTES".to_string()),
        quantity: Some("1".to_string()),
        row_number: 1,
        ..Default::default()
    });
    raw.item_rows.push(RawItemRow {
        hs_code: Some("84089000".to_string()),
        description: Some("MOTEUR DIESEL".to_string()),
        quantity: Some("2".to_string()),
        row_number: 2,
        ..Default::default()
    });

    let builder = RecordBuilder::with_defaults();
    let record = builder.build(&raw, &opts(573.139)).unwrap();

    assert!(record.items[0].identity_hint.is_some());
    assert!(record.items[1].identity_hint.is_none());
}
