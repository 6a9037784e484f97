// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Plain-text replies for chat transports that do not render cards.

use crate::category::Category;
use crate::dispatch::{CategorySelectionOutcome, DispatchError};
use crate::nearest::QueryResult;

const CHINESE_NUMERALS: [&str; 11] = [
    "零", "一", "二", "三", "四", "五", "六", "七", "八", "九", "十",
];

fn count_text(n: usize) -> String {
    CHINESE_NUMERALS
        .get(n)
        .map(|s| s.to_string())
        .unwrap_or_else(|| n.to_string())
}

pub fn menu(categories: &[Category]) -> String {
    let mut text = String::from("請選擇查詢類別：");
    for category in categories {
        text.push('\n');
        text.push_str(category.keyword());
    }
    text
}

pub fn location_prompt(category: Category) -> String {
    format!("已選擇「{}」，請傳送您的位置資訊。", category.keyword())
}

pub fn unrecognized(trigger_keyword: &str) -> String {
    format!("請輸入「{}」開始查詢。", trigger_keyword)
}

pub fn selection(outcome: &CategorySelectionOutcome, trigger_keyword: &str) -> String {
    match outcome {
        CategorySelectionOutcome::ShowMenu(categories) => menu(categories),
        CategorySelectionOutcome::PromptForLocation(category) => location_prompt(*category),
        CategorySelectionOutcome::Unrecognized => unrecognized(trigger_keyword),
    }
}

pub fn dispatch_error(err: &DispatchError) -> String {
    match err {
        DispatchError::NoCategorySelected => "請先選擇查詢類別，再傳送位置資訊。".to_string(),
        DispatchError::CategoryNotImplemented(category) => {
            format!("「{}」查詢功能尚未開放，敬請期待。", category.keyword())
        }
    }
}

pub fn results(result: &QueryResult) -> String {
    if result.is_empty() {
        return "附近沒有找到任何據點。".to_string();
    }

    let mut text = format!("距離您最近的{}個據點是：", count_text(result.len()));
    for m in result {
        text.push_str(&format!("\n{}，距離：{:.2}公里", m.record.name, m.distance_km));
        if let Some(address) = &m.record.address {
            text.push_str(&format!("\n地址：{}", address));
        }
        if let Some(phone) = &m.record.phone {
            text.push_str(&format!("\n電話：{}", phone));
        }
        text.push_str(&format!("\n地圖：{}", m.record.map_link()));
    }
    text
}

pub fn location(outcome: &Result<QueryResult, DispatchError>) -> String {
    match outcome {
        Ok(result) => results(result),
        Err(err) => dispatch_error(err),
    }
}
