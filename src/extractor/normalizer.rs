// ==========================================
// RFCV 转换系统 - 文本标准化器
// ==========================================
// 职责: 提取文本的字符级标准化
// 背景: 源 PDF 中存在两个视觉上相同的撇号码位
//       (U+2019 / U+02BC),标签匹配前必须归一
// ==========================================

/// 标准撇号（U+0027）
const APOSTROPHE: char = '\'';

/// 需要归一为标准撇号的码位
const APOSTROPHE_VARIANTS: [char; 3] = ['\u{2019}', '\u{02BC}', '\u{00B4}'];

/// 标准化单行文本
///
/// - 撇号变体归一为 U+0027
/// - 不间断空格归一为普通空格
/// - 连续空白折叠为单个空格,首尾去空白
pub fn normalize_line(value: &str) -> String {
    let mapped: String = value
        .chars()
        .map(|c| {
            if APOSTROPHE_VARIANTS.contains(&c) {
                APOSTROPHE
            } else if c == '\u{00A0}' {
                ' '
            } else {
                c
            }
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 标准化标签文本（用于别名匹配,附加大写化）
pub fn normalize_label(value: &str) -> String {
    normalize_line(value).to_uppercase()
}

/// 标准化单元格文本（空串视为缺失）
pub fn normalize_cell(value: &str) -> Option<String> {
    let cleaned = normalize_line(value);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
