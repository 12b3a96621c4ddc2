use std::io::{self, Write};

use concord_engine::{MatchKind, ReconciliationReport, TransactionRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub show_unmatched: bool,
    pub top_vendors: usize,
    /// Per-date totals of both sides.
    pub daily: bool,
}

pub fn write_report<W: Write>(
    out: &mut W,
    report: &ReconciliationReport,
    options: RenderOptions,
) -> io::Result<()> {
    write_summary(out, report)?;
    write_matches(out, report)?;

    if options.top_vendors > 0 {
        let vendors = report.top_unmatched_vendors(options.top_vendors);
        if !vendors.is_empty() {
            writeln!(out)?;
            writeln!(out, "Top unmatched vendors")?;
            for (vendor, count) in vendors {
                let vendor = if vendor.is_empty() { "(blank)" } else { vendor.as_str() };
                writeln!(out, "  {count:>4}  {vendor}")?;
            }
        }
    }

    if options.daily {
        write_daily(out, report)?;
    }

    if options.show_unmatched {
        write_records(out, "Unmatched internal", &report.unmatched_internal)?;
        write_records(out, "Unmatched bank", &report.unmatched_bank)?;
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, report: &ReconciliationReport) -> io::Result<()> {
    let s = &report.summary;
    writeln!(out, "Internal txns       {:>8}", s.internal_count)?;
    writeln!(out, "Bank txns           {:>8}", s.bank_count)?;
    writeln!(out, "Matches             {:>8}", s.matched_count)?;
    writeln!(out, "Match %             {:>7.2}%", s.match_percent())?;
    writeln!(out, "Unmatched internal  {:>8}", s.unmatched_internal_count)?;
    writeln!(out, "Unmatched bank      {:>8}", s.unmatched_bank_count)?;
    writeln!(out, "Matched amount      {:>8}", s.matched_amount.to_string())?;
    Ok(())
}

fn write_matches<W: Write>(out: &mut W, report: &ReconciliationReport) -> io::Result<()> {
    if report.matches.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(
        out,
        "{:<14} {:<10} {:>12} {:<14} {:<10} {:>12} {:>5} {:>10} {:<6}",
        "Internal", "Date", "Amount", "Bank", "Date", "Amount", "Sim", "Diff", "Kind"
    )?;
    for m in &report.matches {
        writeln!(
            out,
            "{:<14} {:<10} {:>12} {:<14} {:<10} {:>12} {:>5.2} {:>10} {:<6}",
            m.internal.id.as_str(),
            m.internal.date,
            m.internal.amount.to_string(),
            m.bank.id.as_str(),
            m.bank.date,
            m.bank.amount.to_string(),
            m.vendor_similarity,
            m.amount_diff.to_string(),
            kind_label(m.kind),
        )?;
    }
    Ok(())
}

fn write_daily<W: Write>(out: &mut W, report: &ReconciliationReport) -> io::Result<()> {
    let totals = report.daily_totals();
    if totals.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Daily totals")?;
    writeln!(out, "  {:<10} {:>12} {:>12}", "Date", "Internal", "Bank")?;
    for (date, total) in totals {
        writeln!(
            out,
            "  {:<10} {:>12} {:>12}",
            date.to_string(),
            total.internal.to_string(),
            total.bank.to_string()
        )?;
    }
    Ok(())
}

fn write_records<W: Write>(out: &mut W, title: &str, records: &[TransactionRecord]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title} ({})", records.len())?;
    for r in records {
        writeln!(
            out,
            "  {:<14} {:<10} {:>12}  {}",
            r.id.as_str(),
            r.date,
            r.amount.to_string(),
            r.raw_vendor
        )?;
    }
    Ok(())
}

fn kind_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Exact => "exact",
        MatchKind::DateAndAmount => "date+amount",
        MatchKind::Fuzzy => "fuzzy",
    }
}
