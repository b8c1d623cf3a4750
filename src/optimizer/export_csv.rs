//! CSV export of ranked allocations.

use std::io::Write;

use crate::error::DataError;
use crate::optimizer::ranking::RankedAllocation;

const HEADER: [&str; 12] = [
    "rank",
    "allocation",
    "special_level",
    "common_1_level",
    "common_2_level",
    "score",
    "expected_successes",
    "p_at_least_one_success",
    "expected_tentacles",
    "expected_elder_signs",
    "total_dice",
    "level_ups",
];

pub fn write_ranked_csv<W: Write>(writer: W, ranked: &[RankedAllocation]) -> Result<(), DataError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;
    for entry in ranked {
        out.write_record([
            entry.rank.to_string(),
            entry.allocation.label(),
            entry.levels[0].to_string(),
            entry.levels[1].to_string(),
            entry.levels[2].to_string(),
            format!("{:.4}", entry.score),
            format!("{:.4}", entry.expected_successes),
            format!("{:.4}", entry.p_at_least_one_success),
            format!("{:.4}", entry.expected_tentacles),
            format!("{:.4}", entry.expected_elder_signs),
            entry.total_dice.to_string(),
            entry.allocation.total().to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

pub fn ranked_to_csv_string(ranked: &[RankedAllocation]) -> Result<String, DataError> {
    let mut buffer = Vec::new();
    write_ranked_csv(&mut buffer, ranked)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
