#![allow(clippy::format_push_string)]

use crate::runner::ReplayReport;
use put_overlay_strategy::{BenchmarkPoint, FallbackReason, RebalanceOutcome, Selection, SkipReason};

/// Roll counts pulled out of a replay report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollSummary {
    pub rolls: usize,
    pub hedged: usize,
    pub no_chain: usize,
    pub no_qualifying_put: usize,
    pub skipped_no_data: usize,
}

impl RollSummary {
    #[must_use]
    pub fn from_report(report: &ReplayReport<RebalanceOutcome>) -> Self {
        let mut summary = Self::default();
        for (_, outcome) in &report.week_ends {
            match outcome {
                RebalanceOutcome::Rolled(decision) => {
                    summary.rolls += 1;
                    match decision.selection {
                        Selection::Hedged(_) => summary.hedged += 1,
                        Selection::Unhedged(FallbackReason::NoChain) => summary.no_chain += 1,
                        Selection::Unhedged(FallbackReason::NoQualifyingPut) => {
                            summary.no_qualifying_put += 1;
                        }
                    }
                }
                RebalanceOutcome::Skipped(SkipReason::NoMarketData) => {
                    summary.skipped_no_data += 1;
                }
                RebalanceOutcome::Skipped(SkipReason::NotRollWeek { .. }) => {}
            }
        }
        summary
    }
}

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &ReplayReport<RebalanceOutcome>, benchmark: &[BenchmarkPoint]) -> String {
        let summary = RollSummary::from_report(report);
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    REPLAY RESULTS                             \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Time Period\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Algorithm:             {}\n", report.algorithm));
        output.push_str(&format!("Start:                 {}\n", report.start));
        output.push_str(&format!("End:                   {}\n", report.end));
        output.push_str(&format!("Trading Days:          {}\n", report.trading_days));
        output.push('\n');

        output.push_str("Monthly Rolls\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Rolls:                 {}\n", summary.rolls));
        output.push_str(&format!("Hedged:                {}\n", summary.hedged));
        output.push_str(&format!("No Chain:              {}\n", summary.no_chain));
        output.push_str(&format!("No Qualifying Put:     {}\n", summary.no_qualifying_put));
        output.push_str(&format!("Skipped (No Data):     {}\n", summary.skipped_no_data));
        output.push('\n');

        for (_, outcome) in &report.week_ends {
            if let RebalanceOutcome::Rolled(decision) = outcome {
                let line = match &decision.selection {
                    Selection::Hedged(contract) => contract.display_name(),
                    Selection::Unhedged(reason) => format!("equity only ({reason:?})"),
                };
                output.push_str(&format!("  {}  {}\n", decision.date, line));
            }
        }
        if summary.rolls > 0 {
            output.push('\n');
        }

        output.push_str("Benchmark\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        match (benchmark.first(), benchmark.last()) {
            (Some(first), Some(last)) => {
                output.push_str(&format!("Points:                {}\n", benchmark.len()));
                output.push_str(&format!("First Value:           ${:.2}\n", first.value));
                output.push_str(&format!("Final Value:           ${:.2}\n", last.value));
            }
            _ => output.push_str("Points:                0\n"),
        }

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        if summary.rolls == 0 {
            output.push_str("\n⚠️  No rolls happened during this replay.\n");
            output.push_str("    Check that the data spans at least three week ends of a month.\n\n");
        }

        output
    }
}
