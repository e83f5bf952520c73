use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

use crate::rows::{COLUMNS, ExportRow, Outcome};
use crate::timestamps::parse_instant;

/// Win/draw/loss tallies from the subject team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub team: String,
    pub period: String,
    pub matches: usize,
    /// `None` when no row has a result yet.
    pub record: Option<Record>,
}

impl Summary {
    pub fn from_rows(rows: &[ExportRow], team: &str, period: &str) -> Self {
        let record = rows.iter().any(|r| r.outcome.is_some()).then(|| {
            let mut rec = Record {
                wins: 0,
                draws: 0,
                losses: 0,
            };
            for row in rows {
                match (row.outcome, row.team_side) {
                    (Some(Outcome::Draw), _) => rec.draws += 1,
                    (Some(outcome), Some(side)) if outcome == side.winning_outcome() => {
                        rec.wins += 1
                    }
                    (Some(_), Some(_)) => rec.losses += 1,
                    _ => {}
                }
            }
            rec
        });

        Self {
            team: team.to_string(),
            period: period.to_string(),
            matches: rows.len(),
            record,
        }
    }
}

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

enum Cell {
    Text(String),
    DateTime(ExcelDateTime),
    Number(f64),
    Blank,
}

fn text(v: Option<&str>) -> Cell {
    v.map_or(Cell::Blank, |s| Cell::Text(s.to_string()))
}

fn num<T: Into<f64>>(v: Option<T>) -> Cell {
    v.map_or(Cell::Blank, |n| Cell::Number(n.into()))
}

/// Kickoff as an Excel datetime when it parses, otherwise the raw text.
fn kickoff_cell(raw: &str) -> Cell {
    parse_instant(raw)
        .and_then(|at| excel_datetime(&at))
        .map_or_else(|| Cell::Text(raw.to_string()), Cell::DateTime)
}

fn excel_datetime(at: &DateTime<Utc>) -> Option<ExcelDateTime> {
    let year = u16::try_from(at.year()).ok()?;
    ExcelDateTime::from_ymd(year, at.month() as u8, at.day() as u8)
        .and_then(|d| d.and_hms(at.hour() as u16, at.minute() as u8, at.second()))
        .ok()
}

fn row_cells(row: &ExportRow) -> Vec<Cell> {
    vec![
        kickoff_cell(&row.date_utc),
        text(row.league.as_deref()),
        num(row.season),
        text(row.round.as_deref()),
        text(row.home.as_deref()),
        text(row.away.as_deref()),
        num(row.kickoff_timestamp.map(|t| t as f64)),
        num(row.fixture_id.map(|id| id as f64)),
        text(row.status.as_deref()),
        num(row.home_goals),
        num(row.away_goals),
        text(row.outcome.map(|o| o.code())),
        num(row.odds_home),
        num(row.odds_draw),
        num(row.odds_away),
        text(row.team_side.map(|s| s.label())),
        num(row.team_odds),
    ]
}

fn summary_sheet(summary: &Summary) -> (Vec<&'static str>, Vec<Cell>) {
    let mut headers = vec!["Team", "Period", "Matches"];
    let mut cells = vec![
        Cell::Text(summary.team.clone()),
        Cell::Text(summary.period.clone()),
        Cell::Number(summary.matches as f64),
    ];
    if let Some(rec) = summary.record {
        headers.extend(["Wins(H/A)", "Draws", "Losses(H/A)"]);
        cells.extend([
            Cell::Number(rec.wins as f64),
            Cell::Number(rec.draws as f64),
            Cell::Number(rec.losses as f64),
        ]);
    }
    (headers, cells)
}

/// Orders rows by kickoff instant; unparsable dates go first.
pub fn sort_by_kickoff(rows: &mut [ExportRow]) {
    rows.sort_by_key(|r| parse_instant(&r.date_utc));
}

/// Writes the `data` and `summary` sheets to `path`.
pub fn export_workbook(
    path: &Path,
    rows: &[ExportRow],
    team: &str,
    period: &str,
) -> Result<Summary> {
    let mut sorted = rows.to_vec();
    sort_by_kickoff(&mut sorted);
    let summary = Summary::from_rows(&sorted, team, period);

    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("data")?;
        write_header(sheet, &COLUMNS)?;
        for (idx, row) in sorted.iter().enumerate() {
            write_cells(sheet, idx as u32 + 1, &row_cells(row), &date_format)?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("summary")?;
        let (headers, cells) = summary_sheet(&summary);
        write_header(sheet, &headers)?;
        write_cells(sheet, 1, &cells, &date_format)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(summary)
}

fn write_header(worksheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    for (col_idx, name) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *name)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    Ok(())
}

fn write_cells(
    worksheet: &mut Worksheet,
    row_idx: u32,
    cells: &[Cell],
    date_format: &Format,
) -> Result<()> {
    for (col_idx, cell) in cells.iter().enumerate() {
        let col = col_idx as u16;
        match cell {
            Cell::Text(s) => {
                worksheet
                    .write_string(row_idx, col, s)
                    .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
            }
            Cell::DateTime(dt) => {
                worksheet
                    .write_datetime_with_format(row_idx, col, dt, date_format)
                    .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
            }
            Cell::Number(n) => {
                worksheet
                    .write_number(row_idx, col, *n)
                    .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
            }
            Cell::Blank => {}
        }
    }
    Ok(())
}
