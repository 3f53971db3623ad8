// batch driver: raw csv rows -> cleaned records + per-row report

use crate::preprocess::preprocess_text;
use crate::record::{self, MessageRecord, RawRow, RowError};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub source_id: Option<String>,
    pub error: RowError,
}

impl SkippedRow {
    /// Identifier used in reports: the source message id when readable,
    /// otherwise the csv line.
    pub fn label(&self) -> String {
        match &self.source_id {
            Some(id) => id.clone(),
            None => format!("line {}", self.line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Cleaned(MessageRecord),
    Skipped(SkippedRow),
}

/// One outcome per input row, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RowOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub cleaned: usize,
    pub malformed: usize,
    pub skipped_ids: Vec<String>,
}

impl BatchReport {
    pub fn cleaned(&self) -> impl Iterator<Item = &MessageRecord> {
        self.outcomes.iter().filter_map(|o| match o {
            RowOutcome::Cleaned(r) => Some(r),
            RowOutcome::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedRow> {
        self.outcomes.iter().filter_map(|o| match o {
            RowOutcome::Skipped(s) => Some(s),
            RowOutcome::Cleaned(_) => None,
        })
    }

    pub fn summary(&self) -> BatchSummary {
        let skipped_ids: Vec<String> = self.skipped().map(SkippedRow::label).collect();
        BatchSummary {
            rows: self.outcomes.len(),
            cleaned: self.outcomes.len() - skipped_ids.len(),
            malformed: skipped_ids.len(),
            skipped_ids,
        }
    }
}

/// Decode one row and clean its message.
pub fn clean_row(raw: &RawRow) -> RowOutcome {
    match raw.decode() {
        Ok(mut rec) => {
            rec.message = preprocess_text(&rec.message);
            RowOutcome::Cleaned(rec)
        }
        Err(error) => {
            let skipped = SkippedRow {
                line: raw.line,
                source_id: raw.source_id(),
                error,
            };
            warn!(line = skipped.line, id = %skipped.label(), error = %skipped.error, "skipping malformed row");
            RowOutcome::Skipped(skipped)
        }
    }
}

pub fn clean_batch<I>(rows: I) -> BatchReport
where
    I: IntoIterator<Item = RawRow>,
{
    BatchReport {
        outcomes: rows.into_iter().map(|r| clean_row(&r)).collect(),
    }
}

/// Clean a scraper csv into a preprocessed csv.
pub fn clean_file(input: &Path, output: &Path) -> Result<BatchSummary> {
    let rows = record::read_raw_rows_from_path(input)?;
    info!(input = %input.display(), rows = rows.len(), "cleaning messages");
    let report = clean_batch(rows);
    let written = record::write_records_to_path(output, report.cleaned())?;
    let summary = report.summary();
    info!(
        output = %output.display(),
        written,
        malformed = summary.malformed,
        "cleaning finished"
    );
    Ok(summary)
}
