//! Carrier attribution for searched routes.

use rustc_hash::FxHashMap;

use crate::records::EdgeRecord;

/// Placeholder reported for a leg whose carrier cannot be resolved.
pub const UNKNOWN_CARRIER: &str = "(n/a)";

/// Operating carrier of the (origin, dest) leg, resolved from the raw edge
/// table: the first matching row's primary carrier if set, else the first
/// entry of its carrier list.
pub fn leg_carrier(records: &[EdgeRecord], origin: &str, dest: &str) -> Option<String> {
    let row = records
        .iter()
        .find(|r| r.origin == origin && r.dest == dest)?;
    let primary = row.primary_carrier.trim();
    if !primary.is_empty() {
        return Some(primary.to_string());
    }
    let first = row.carriers.split(',').next().unwrap_or("").trim();
    if !first.is_empty() {
        return Some(first.to_string());
    }
    None
}

/// Dominant carrier across a route's legs.
///
/// Empty entries are ignored. A single carrier, or a strict winner by leg
/// count, is reported directly; a tie among the top carriers produces an
/// explicit no-winner message naming the top three in descending count
/// (first-seen order breaks count ties). `N/A` when no leg resolved.
pub fn summarize_carriers(leg_carriers: &[&str]) -> String {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();
    for &carrier in leg_carriers {
        if carrier.is_empty() {
            continue;
        }
        let n = counts.entry(carrier).or_insert(0);
        if *n == 0 {
            order.push(carrier);
        }
        *n += 1;
    }
    if order.is_empty() {
        return "N/A".to_string();
    }

    // Stable sort keeps first-seen order among equal counts.
    order.sort_by_key(|c| std::cmp::Reverse(counts[*c]));
    let top: Vec<&str> = order.into_iter().take(3).collect();

    if top.len() == 1 || counts[top[0]] > counts[top[1]] {
        return top[0].to_string();
    }
    format!("No clear winner - top-3: {}", top.join(", "))
}
