//! Inspection and debugging tools for fieldmask.
//!
//! - Describe a record layout bit by bit, with its fingerprint
//! - Run a small scripted broadcast and show what each receiver is sent
//! - Decode a mask header against a record layout

mod demo;
mod mask;

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use schema::{BitInfo, BitRole, RecordLayout};
use serde::Serialize;

pub use demo::{run_demo, BlockSummary, DemoTick, FrameSummary, BOAR, BYSTANDER, LOOTER};
pub use mask::{decode_mask, MaskReport};

/// A record layout as the `layout` command prints it.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub name: &'static str,
    pub hash: String,
    pub bit_count: u32,
    pub block_count: usize,
    pub bits: Vec<BitInfo>,
}

/// Looks up a record layout by name, listing the known ones on a miss.
pub fn find_layout(name: &str) -> Result<&'static RecordLayout> {
    match records::layout_by_name(name) {
        Some(layout) => Ok(layout),
        None => {
            let known: Vec<_> = records::LAYOUTS.iter().map(|layout| layout.name).collect();
            bail!("unknown record {name:?}; known records: {}", known.join(", "))
        }
    }
}

#[must_use]
pub fn layout_report(layout: &RecordLayout) -> LayoutReport {
    LayoutReport {
        name: layout.name,
        hash: format!("0x{:016x}", schema::layout_hash(layout)),
        bit_count: layout.bit_count(),
        block_count: layout.block_count(),
        bits: layout.bits(),
    }
}

/// One line per mask bit; array elements are folded into their base line.
#[must_use]
pub fn format_layout_pretty(report: &LayoutReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} bits in {} blocks, hash {}",
        report.name, report.bit_count, report.block_count, report.hash
    );
    for info in &report.bits {
        let role = match info.role {
            BitRole::Group => "group".to_string(),
            BitRole::Slot(kind) => format!("{kind:?}").to_lowercase(),
            BitRole::ArrayBase => {
                let len = report
                    .bits
                    .iter()
                    .filter(|other| {
                        other.name == info.name && matches!(other.role, BitRole::ArrayElement(_))
                    })
                    .count();
                format!("array[{len}]")
            }
            BitRole::ArrayElement(_) => continue,
        };
        let indent = if info.role == BitRole::Group { "" } else { "  " };
        let _ = write!(out, "{:>5} {indent}{} ({role})", info.bit, info.name);
        if !info.visibility.is_empty() {
            let _ = write!(out, " visible to {:?}", info.visibility);
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Parses hex digits, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        bail!("invalid hex digit {bad:?}");
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits ({})", digits.len());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte {:?}", &digits[i..i + 2]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_report_counts_bits() {
        let report = layout_report(&records::object::LAYOUT);
        assert_eq!(report.name, "ObjectData");
        assert_eq!(report.bits.len(), report.bit_count as usize);
        assert!(report.hash.starts_with("0x"));
        assert_eq!(report.hash.len(), 18);
    }

    #[test]
    fn pretty_layout_folds_arrays() {
        let report = layout_report(&records::unit::LAYOUT);
        let text = format_layout_pretty(&report);
        assert!(text.starts_with("UnitData:"));
        assert!(text.contains("stats (array[5])"));
        assert!(!text.contains("element"));
    }

    #[test]
    fn unknown_layout_lists_known() {
        let err = find_layout("Nope").unwrap_err().to_string();
        assert!(err.contains("UnitData"));
        assert!(find_layout("playerdata").is_ok());
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(parse_hex("0x00 ab10").unwrap(), vec![0x00, 0xab, 0x10]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
