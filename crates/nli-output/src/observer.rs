//! `SummaryObserver`: one CSV row of population counts per tick.

use std::path::Path;

use nli_schedule::Step;
use nli_sim::{Progress, RunStatus, SimObserver, SimState};

use crate::atomic::StagedCsv;
use crate::row::TickSummaryRow;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that appends a [`TickSummaryRow`] after every tick.
///
/// Rows are staged in `<path>.part`; the file appears under `path` when the
/// run finalizes.  Observer methods cannot fail, so write errors are kept
/// and can be collected with [`take_error`][Self::take_error] once the run
/// returns.
pub struct SummaryObserver {
    out:        StagedCsv,
    last_error: Option<OutputError>,
}

impl SummaryObserver {
    /// Create the staging file (and parent directories) and write the header.
    pub fn create(path: &Path) -> OutputResult<Self> {
        let mut out = StagedCsv::new(path, &TickSummaryRow::HEADER);
        out.open()?;
        Ok(Self { out, last_error: None })
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    fn write_row(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.out.write_record([
            row.tick.to_string(),
            row.time.to_string(),
            row.fungus.to_string(),
            row.macrophage.to_string(),
            row.neutrophil.to_string(),
            row.epithelium.to_string(),
            row.internalized.to_string(),
        ])?;
        Ok(())
    }
}

impl SimObserver for SummaryObserver {
    fn on_status(&mut self, _state: &SimState, status: RunStatus, _progress: Progress) {
        if status == RunStatus::Finalize {
            let result = self.out.publish();
            self.store_err(result);
        }
    }

    fn on_tick_end(&mut self, _step: &Step, state: &SimState) {
        let result = self.write_row(&TickSummaryRow::from_state(state));
        self.store_err(result);
    }
}
