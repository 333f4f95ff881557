use std::sync::LazyLock;

use regex::Regex;

use super::model::{col, PassengerTable};

/// Deck value for rows without a cabin code.
pub const UNKNOWN_DECK: &str = "Unknown";

/// The honorific is the word of ASCII letters between a space and a period,
/// e.g. the "Mr" in "Braund, Mr. Owen Harris".
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([A-Za-z]+)\.").expect("title pattern"));

/// Compute the derived columns: `Deck` (first character of the cabin code,
/// "Unknown" when absent), `Family_Size` (SibSp + Parch + 1, missing counts
/// as zero) and `Title` (honorific from the name, absent when no match).
///
/// Pure: the input is untouched; existing columns are never removed. Column
/// names are appended only when not already present, but values are always
/// recomputed, so stale derived data from a re-loaded file gets refreshed.
pub fn derive(table: &PassengerTable) -> PassengerTable {
    let mut out = table.clone();

    for passenger in &mut out.passengers {
        passenger.deck = Some(match passenger.cabin.as_deref().and_then(|c| c.chars().next()) {
            Some(first) => first.to_string(),
            None => UNKNOWN_DECK.to_string(),
        });
        passenger.family_size =
            Some(passenger.sib_sp.unwrap_or(0) + passenger.parch.unwrap_or(0) + 1);
        passenger.title = passenger.name.as_deref().and_then(extract_title);
    }

    out.push_column(col::DECK);
    out.push_column(col::FAMILY_SIZE);
    out.push_column(col::TITLE);
    out.rebuild_index();
    out
}

fn extract_title(name: &str) -> Option<String> {
    TITLE_RE
        .captures(name)
        .map(|captures| captures[1].to_string())
}
