//! Pluralization for log lines.

/// Format count with noun, handling pluralization
///
/// - `plural_count(1, "chunk")` -> `"1 chunk"`
/// - `plural_count(3, "chunk")` -> `"3 chunks"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
