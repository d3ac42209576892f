//! 分類レビューのExcel出力

use super::review::{ReviewRow, REVIEW_HEADER};
use crate::error::{FeedcatError, Result};
use crate::feed::write_atomic;
use feedcat_common::Confidence;
use rust_xlsxwriter::*;
use std::path::Path;

/// 列幅（文字数）
const COLUMN_WIDTHS: [f64; 14] = [
    14.0, 40.0, 50.0, 16.0, 14.0, 36.0, 12.0, 36.0, 12.0, 8.0, 20.0, 26.0, 9.0, 9.0,
];

pub fn write_review_excel(path: &Path, rows: &[ReviewRow]) -> Result<()> {
    let buffer = generate_review_buffer(rows).map_err(FeedcatError::ExcelGeneration)?;
    write_atomic(path, &buffer)
}

pub fn generate_review_buffer(rows: &[ReviewRow]) -> std::result::Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    // 要確認行
    let priority_format = Format::new().set_background_color(Color::RGB(0xFFF2CC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("review")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, (header, width)) in REVIEW_HEADER.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        worksheet
            .set_column_width(col, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let record = row.to_record();
        for (col, value) in record.iter().enumerate() {
            let col = col as u16;
            // スコアは数値セルにする
            if col == 9 {
                worksheet
                    .write_number(r, col, row.score)
                    .map_err(|e| format!("セル書き込みエラー: {}", e))?;
            } else if row.high_priority {
                worksheet
                    .write_string_with_format(r, col, value, &priority_format)
                    .map_err(|e| format!("セル書き込みエラー: {}", e))?;
            } else {
                worksheet
                    .write_string(r, col, value)
                    .map_err(|e| format!("セル書き込みエラー: {}", e))?;
            }
        }
    }

    if !rows.is_empty() {
        worksheet
            .autofilter(0, 0, rows.len() as u32, (REVIEW_HEADER.len() - 1) as u16)
            .map_err(|e| format!("フィルター設定エラー: {}", e))?;
    }

    let summary = workbook.add_worksheet();
    summary
        .set_name("summary")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;
    let counts = [
        ("MANUAL", Confidence::Manual),
        ("HIGH", Confidence::High),
        ("MEDIUM", Confidence::Medium),
        ("LOW", Confidence::Low),
    ];
    summary
        .write_string_with_format(0, 0, "confidence", &header_format)
        .map_err(|e| format!("セル書き込みエラー: {}", e))?;
    summary
        .write_string_with_format(0, 1, "count", &header_format)
        .map_err(|e| format!("セル書き込みエラー: {}", e))?;
    for (i, (label, confidence)) in counts.iter().enumerate() {
        let count = rows.iter().filter(|r| r.confidence == *confidence).count();
        let r = (i + 1) as u32;
        summary
            .write_string(r, 0, *label)
            .map_err(|e| format!("セル書き込みエラー: {}", e))?;
        summary
            .write_number(r, 1, count as f64)
            .map_err(|e| format!("セル書き込みエラー: {}", e))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
