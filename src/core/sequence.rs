//! Per-project sequence numbers
//!
//! Tasks, RFIs and submittals each carry a display number that counts up
//! within their project. Numbers come from scanning the live records for
//! that project and incrementing the maximum, so deleting a record never
//! frees its number and gaps are expected.

/// Next number for a project/kind pair given the numbers already in use
pub fn next_number(existing: impl Iterator<Item = u32>) -> u32 {
    existing.max().unwrap_or(0) + 1
}

/// Resolve the number for a new record: an explicitly requested number
/// wins, otherwise the next sequential one is assigned
pub fn assign(requested: Option<u32>, existing: impl Iterator<Item = u32>) -> u32 {
    match requested {
        Some(n) => n,
        None => next_number(existing),
    }
}
