pub mod accumulate;
pub mod classify;
pub mod links;
pub mod sections;

use accumulate::RecordKind;

use crate::model::DigestDocument;

/// Four-pass pipeline: date → top-level blocks → sub-blocks → accumulated items.
///
/// Never fails. Unrecognised lines are appended to the open record or ignored, and a missing
/// date yields `IssueDate::Unknown`.
pub fn parse_document(text: &str) -> DigestDocument {
    let lines: Vec<&str> = text.lines().collect();
    let date = sections::extract_date(&lines);
    let selected = sections::select_blocks(sections::top_level_blocks(&lines));

    let news = selected
        .news
        .map(|block| sections::parse_block(&block, RecordKind::News))
        .unwrap_or_default();
    let social = selected
        .social
        .map(|block| sections::parse_block(&block, RecordKind::Social))
        .unwrap_or_default();

    DigestDocument { date, news, social }
}
