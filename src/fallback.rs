use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::export::sort_by_kickoff;
use crate::rows::ExportRow;
use crate::timestamps::parse_instant;

/// Reads sample rows shaped like the `data` sheet.
pub fn read_rows(path: &Path) -> Result<Vec<ExportRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed opening {}", path.display()))?;
    let mut out = Vec::new();
    for (idx, record) in reader.deserialize::<ExportRow>().enumerate() {
        let row = record.with_context(|| format!("bad row {} in {}", idx + 1, path.display()))?;
        out.push(row);
    }
    Ok(out)
}

/// Keeps rows involving `team` (substring, any case) dated within
/// `[from, to]`, ordered by kickoff.
pub fn filter_rows(
    rows: Vec<ExportRow>,
    team: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<ExportRow> {
    let needle = team.to_lowercase();
    let involves = |name: Option<&str>| name.is_some_and(|n| n.to_lowercase().contains(&needle));

    let mut out: Vec<ExportRow> = rows
        .into_iter()
        .filter(|r| involves(r.home.as_deref()) || involves(r.away.as_deref()))
        .filter(|r| {
            parse_instant(&r.date_utc)
                .map(|at| at.date_naive())
                .is_some_and(|day| day >= from && day <= to)
        })
        .collect();
    sort_by_kickoff(&mut out);
    out
}
