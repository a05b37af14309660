//! Regex-driven metadata extraction from recognized text.
//!
//! Pure functions, no I/O. Dates are validated through chrono and normalized
//! to `YYYY-MM-DD`; matches that fail to parse are dropped silently. All
//! lists are de-duplicated preserving first-seen order.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured data pulled out of a document's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub document_numbers: Vec<String>,
}

static DATE_DMY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})\b").unwrap());

static DATE_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[/-](\d{1,2})[/-](\d{1,2})\b").unwrap());

static DATE_TEXTUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s(\d{2,4})\b")
        .unwrap()
});

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[$€£₹]|RS\.?)\s?\d{1,3}(?:[.,]\d{3})*(?:[.,]\d{2})\b").unwrap()
});

static DOC_NUMBER_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:Invoice|Policy|ID|Ref|Receipt|Bill)\s?[#: ]+([A-Z0-9-]{4,20})").unwrap()
});

static DOC_NUMBER_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z]{2}\d{2}[A-Z]{1,2}\d{4}\b").unwrap());

/// Scan text for dates, currency amounts, and document/reference numbers.
pub fn extract(text: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        dates: find_dates(text),
        amounts: find_amounts(text),
        document_numbers: find_document_numbers(text),
    }
}

fn find_dates(text: &str) -> Vec<String> {
    let mut results = Vec::new();

    for caps in DATE_DMY.captures_iter(text) {
        let (d, m, y) = (num(&caps, 1), num(&caps, 2), year(num(&caps, 3)));
        if let Some(date) = NaiveDate::from_ymd_opt(y, m as u32, d as u32) {
            push_unique(&mut results, date.format("%Y-%m-%d").to_string());
        }
    }

    for caps in DATE_YMD.captures_iter(text) {
        let (y, m, d) = (num(&caps, 1), num(&caps, 2), num(&caps, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(y, m as u32, d as u32) {
            push_unique(&mut results, date.format("%Y-%m-%d").to_string());
        }
    }

    for caps in DATE_TEXTUAL.captures_iter(text) {
        let d = num(&caps, 1);
        let month = month_number(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
        let y = year(num(&caps, 3));
        if let Some(m) = month {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d as u32) {
                push_unique(&mut results, date.format("%Y-%m-%d").to_string());
            }
        }
    }

    results
}

fn find_amounts(text: &str) -> Vec<String> {
    let mut results = Vec::new();
    for m in AMOUNT.find_iter(text) {
        push_unique(&mut results, m.as_str().to_string());
    }
    results
}

fn find_document_numbers(text: &str) -> Vec<String> {
    let mut results = Vec::new();
    for caps in DOC_NUMBER_LABELED.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push_unique(&mut results, m.as_str().trim().to_string());
        }
    }
    for m in DOC_NUMBER_GENERIC.find_iter(text) {
        push_unique(&mut results, m.as_str().trim().to_string());
    }
    results
}

fn num(caps: &regex::Captures<'_>, idx: usize) -> i32 {
    caps.get(idx)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Two-digit years read as 2000-based.
fn year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

fn month_number(name: &str) -> Option<u32> {
    match name.to_ascii_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}
