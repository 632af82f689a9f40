// ==========================================
// FieldExtractor 端到端测试（页面 + 表格 → DocumentRecord）
// ==========================================

use rfcv_transform::domain::extraction::{RawPage, RawTable};
use rfcv_transform::domain::types::{TraderRole, TransportMode};
use rfcv_transform::engine::record_builder::{BuildOptions, RecordBuilder};
use rfcv_transform::extractor::FieldExtractor;

fn page(lines: &[&str]) -> RawPage {
    RawPage {
        lines: lines.iter().map(|l| l.to_string()).collect(),
    }
}

fn table(rows: &[&[&str]]) -> RawTable {
    RawTable {
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

/// 模板形态的两页文档（头部字段 + 商品表 + 集装箱表）
fn create_test_pages() -> Vec<RawPage> {
    vec![
        page(&[
            "REPUBLIQUE DE COTE D'IVOIRE",
            "N° RFCV : CI20260815001",
            // 弯撇号变体（扫描版式常见）
            "DATE D\u{2019}EMISSION : 15/08/2026",
            "N° FDI : FDI-2026-04471",
            "EXPORTATEUR : RENAULT TRUCKS SAS",
            "IMPORTATEUR : SOCIETE IVOIRIENNE DE NEGOCE",
            "CODE IMPORTATEUR : 1104492B",
        ]),
        page(&[
            "PAYS D'ORIGINE : France",
            "MODE DE TRANSPORT : Maritime",
            "NAVIRE : MSC ANYA",
            "DEVISE : EUR",
            "NOMBRE DE COLIS : 342",
            "VALEUR FOB TOTALE : 12683.65",
            "VALEUR FRET : 2000",
        ]),
    ]
}

fn create_test_tables() -> Vec<RawTable> {
    vec![
        table(&[
            &["Position Tarifaire", "Designation", "Quantite", "Valeur FOB", "N° Chassis"],
            &["87032319", "VOITURE PARTICULIERE", "1", "9500", "VF1RFB00966248657"],
            &["84089000", "MOTEUR DIESEL", "120", "2000", ""],
            &["84148090", "COMPRESSEUR D'AIR", "222", "1183.65", ""],
        ]),
        table(&[
            &["N° Conteneur", "N° Scelle", "Type"],
            &["MSKU1234567", "S-9981", "40HC"],
        ]),
    ]
}

#[test]
fn test_end_to_end_extraction_and_build() {
    println!("\n=== 测试：页面+表格端到端转换 ===");
    let raw = FieldExtractor::new().extract(&create_test_pages(), &create_test_tables());

    assert_eq!(raw.fields.get("rfcv_number").unwrap(), "CI20260815001");
    assert_eq!(raw.fields.get("issue_date").unwrap(), "15/08/2026");
    assert_eq!(raw.item_rows.len(), 3);
    assert_eq!(raw.container_rows.len(), 1);

    let builder = RecordBuilder::with_defaults();
    let record = builder
        .build(
            &raw,
            &BuildOptions {
                exchange_rate: 573.139,
                payment_reference: Some("TR/2026/0815-A".to_string()),
            },
        )
        .unwrap();

    // 头部字段
    assert_eq!(record.identification.rfcv_number, "CI20260815001");
    assert_eq!(
        record.trader(TraderRole::Importer).unwrap().code.as_deref(),
        Some("1104492B")
    );
    assert_eq!(record.transport.mode, Some(TransportMode::Maritime));
    assert_eq!(record.transport.country_of_origin.as_deref(), Some("FRANCE"));
    assert_eq!(record.financial.total_packages, Some(342));
    assert_eq!(record.financial.currency.as_deref(), Some("EUR"));

    // 估价: fob 12683.65 + fret 2000, 汇率 573.139 ⇒ 保险 15124
    assert_eq!(record.valuation.insurance, Some(15_124));

    // 商品与集装箱
    assert_eq!(record.items.len(), 3);
    assert_eq!(
        record.items[0].chassis_number.as_deref(),
        Some("VF1RFB00966248657")
    );
    assert_eq!(record.containers[0].container_number, "MSKU1234567");
}

#[test]
fn test_curly_apostrophe_label_is_located() {
    println!("\n=== 测试：弯撇号标签定位 ===");
    let pages = vec![page(&["PAYS D\u{2019}ORIGINE : ESPAGNE"])];
    let raw = FieldExtractor::new().extract(&pages, &[]);
    assert_eq!(raw.fields.get("country_of_origin").unwrap(), "ESPAGNE");
}

#[test]
fn test_unrecognized_table_is_ignored() {
    let tables = vec![table(&[
        &["Rubrique", "Montant"],
        &["Taxe", "1000"],
    ])];
    let raw = FieldExtractor::new().extract(&[], &tables);
    assert!(raw.item_rows.is_empty());
    assert!(raw.container_rows.is_empty());
}
