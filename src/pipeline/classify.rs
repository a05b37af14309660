//! Three-tier document classification.
//!
//! Deterministic and pure: learned user corrections, then exclusive
//! markers, then a weighted signal scan. Learned keywords always win —
//! user feedback out-ranks every heuristic.

use uuid::Uuid;

use super::traits::DocumentStore;
use crate::db::DatabaseError;
use crate::models::{Category, LearnedKeyword};

/// Minimum weighted score a category must reach; below it the result is
/// `Other`. The boundary is inclusive.
const MIN_SIGNAL_SCORE: i32 = 5;

/// Phrases strong enough to assign a category without scoring.
/// First match in table order wins.
const EXCLUSIVE_MARKERS: &[(&str, Category)] = &[
    ("passport", Category::IdPersonal),
    ("aadhaar", Category::IdPersonal),
    ("pan card", Category::IdPersonal),
    ("voter id", Category::IdPersonal),
    ("driving license", Category::IdPersonal),
    ("prescription", Category::Medical),
    ("lab report", Category::Medical),
    ("blood test", Category::Medical),
    ("x-ray", Category::Medical),
    ("vaccination", Category::Medical),
    ("invoice", Category::Receipts),
    ("receipt", Category::Receipts),
    ("salary slip", Category::Financial),
    ("payslip", Category::Financial),
    ("bank statement", Category::Financial),
    ("marksheet", Category::Education),
    ("transcript", Category::Education),
    ("rent agreement", Category::Property),
    ("lease", Category::Property),
    ("rc book", Category::Vehicle),
    ("chassis", Category::Vehicle),
];

/// Per-category signal vocabulary with weights. Iteration order is the
/// tie-break for equal scores, so the table order is part of the contract.
const SIGNAL_VOCABULARY: &[(Category, &[(&str, i32)])] = &[
    (
        Category::IdPersonal,
        &[
            ("identity", 5),
            ("government", 3),
            ("national", 3),
            ("personal", 2),
            ("card", 2),
            ("citizen", 4),
            ("address", 2),
        ],
    ),
    (
        Category::Financial,
        &[
            ("bank", 5),
            ("account", 4),
            ("tax", 8),
            ("income", 5),
            ("salary", 6),
            ("investment", 5),
            ("portfolio", 5),
            ("loan", 5),
            ("credit", 4),
            ("debit", 4),
            ("interest", 4),
        ],
    ),
    (
        Category::Receipts,
        &[
            ("total", 3),
            ("subtotal", 3),
            ("amount paid", 5),
            ("bill to", 4),
            ("transaction", 4),
            ("order id", 6),
            ("payment", 3),
            ("checkout", 4),
            ("gst", 5),
            ("vat", 5),
        ],
    ),
    (
        Category::Medical,
        &[
            ("hospital", 6),
            ("clinic", 6),
            ("doctor", 5),
            ("patient", 5),
            ("diagnosis", 8),
            ("medicine", 6),
            ("symptoms", 5),
            ("pharmacy", 5),
            ("surgery", 7),
            ("treatment", 5),
        ],
    ),
    (
        Category::Education,
        &[
            ("university", 6),
            ("college", 6),
            ("school", 4),
            ("degree", 8),
            ("marks", 5),
            ("grade", 5),
            ("semester", 5),
            ("diploma", 8),
            ("educational", 4),
            ("certificate", 3),
        ],
    ),
    (
        Category::Vehicle,
        &[
            ("registration", 6),
            ("engine", 5),
            ("insurance", 5),
            ("puc", 8),
            ("service", 4),
            ("vehicle", 5),
            ("chassis", 8),
            ("odometer", 6),
            ("model", 3),
        ],
    ),
    (
        Category::Property,
        &[
            ("property", 6),
            ("apartment", 5),
            ("house", 5),
            ("mortgage", 8),
            ("deed", 10),
            ("utility", 4),
            ("maintenance", 5),
            ("electricity bill", 7),
            ("water bill", 7),
        ],
    ),
];

/// Classify a document from its recognized text and filename.
pub fn classify(text: &str, filename: &str, learned: &[LearnedKeyword]) -> Category {
    let combined = format!("{text} {filename}").to_lowercase();

    // Tier 1: learned corrections. Longest matching keyword wins so the
    // outcome never depends on store iteration order.
    let mut best_learned: Option<&LearnedKeyword> = None;
    for keyword in learned {
        if keyword.keyword.is_empty() {
            continue;
        }
        if combined.contains(&keyword.keyword.to_lowercase()) {
            let better = match best_learned {
                Some(current) => {
                    keyword.keyword.len() > current.keyword.len()
                        || (keyword.keyword.len() == current.keyword.len()
                            && keyword.keyword < current.keyword)
                }
                None => true,
            };
            if better {
                best_learned = Some(keyword);
            }
        }
    }
    if let Some(keyword) = best_learned {
        return Category::from_name(&keyword.assigned_category);
    }

    // Tier 2: exclusive markers short-circuit the weighted scan.
    for (marker, category) in EXCLUSIVE_MARKERS {
        if combined.contains(marker) {
            return *category;
        }
    }

    // Tier 3: weighted signal scan. Strict comparison keeps the first
    // category in table order on a tie.
    let mut best: Option<(Category, i32)> = None;
    for (category, signals) in SIGNAL_VOCABULARY {
        let score: i32 = signals
            .iter()
            .filter(|(keyword, _)| combined.contains(keyword))
            .map(|(_, weight)| weight)
            .sum();
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((*category, score));
        }
    }

    match best {
        Some((category, score)) if score >= MIN_SIGNAL_SCORE => category,
        _ => Category::Other,
    }
}

/// Apply a user category correction: set the document's override and learn
/// the keyword so future imports containing it classify the same way.
pub fn learn_correction(
    store: &dyn DocumentStore,
    document_id: &Uuid,
    category: &str,
    keyword: &str,
) -> Result<(), DatabaseError> {
    store.update_category(document_id, category)?;
    let keyword = keyword.trim().to_lowercase();
    if !keyword.is_empty() {
        store.learn_keyword(&LearnedKeyword::new(keyword, category))?;
    }
    Ok(())
}
