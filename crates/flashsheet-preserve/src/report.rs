use std::collections::BTreeMap;
use std::fmt;

use flashsheet_core::CellCoord;
use serde::{Serialize, Serializer};

/// Result of reapplying one captured snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CellRestoreOutcome {
    /// The cell still carried its captured style; nothing was reapplied
    Unchanged,
    Restored,
    Failed {
        reason: String,
        /// Whether the cell's value was written again after the failure
        value_reasserted: bool,
    },
}

impl CellRestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(
            self,
            CellRestoreOutcome::Unchanged | CellRestoreOutcome::Restored
        )
    }
}

/// Per-cell account of a format-preserving write
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RestoreReport {
    /// Number of cells assigned during the overwrite phase
    pub cells_written: usize,
    #[serde(serialize_with = "by_a1")]
    outcomes: BTreeMap<CellCoord, CellRestoreOutcome>,
    /// Destination cells whose value could not be written, with the reason
    #[serde(serialize_with = "by_a1", skip_serializing_if = "BTreeMap::is_empty")]
    write_failures: BTreeMap<CellCoord, String>,
}

fn by_a1<S: Serializer, V: Serialize>(
    entries: &BTreeMap<CellCoord, V>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(coord, value)| (coord.to_a1(), value)))
}

impl RestoreReport {
    pub fn new(cells_written: usize) -> Self {
        Self {
            cells_written,
            outcomes: BTreeMap::new(),
            write_failures: BTreeMap::new(),
        }
    }

    pub fn record_write_failure(&mut self, coord: CellCoord, reason: impl Into<String>) {
        self.write_failures.insert(coord, reason.into());
    }

    pub fn write_failures(&self) -> impl Iterator<Item = (CellCoord, &str)> + '_ {
        self.write_failures
            .iter()
            .map(|(coord, reason)| (*coord, reason.as_str()))
    }

    pub fn write_failed_count(&self) -> usize {
        self.write_failures.len()
    }

    pub fn record(&mut self, coord: CellCoord, outcome: CellRestoreOutcome) {
        self.outcomes.insert(coord, outcome);
    }

    pub fn outcome(&self, coord: CellCoord) -> Option<&CellRestoreOutcome> {
        self.outcomes.get(&coord)
    }

    /// All outcomes in row-major order
    pub fn outcomes(&self) -> impl Iterator<Item = (CellCoord, &CellRestoreOutcome)> + '_ {
        self.outcomes.iter().map(|(coord, outcome)| (*coord, outcome))
    }

    pub fn failures(&self) -> impl Iterator<Item = (CellCoord, &CellRestoreOutcome)> + '_ {
        self.outcomes().filter(|(_, outcome)| !outcome.is_restored())
    }

    /// Number of snapshots the restore phase processed
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn restored_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_restored()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.attempted() - self.restored_count()
    }

    /// Every value was written and no restoration failed
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0 && self.write_failures.is_empty()
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cells written, formatting restored on {} of {} cells",
            self.cells_written,
            self.restored_count(),
            self.attempted()
        )?;
        if self.failed_count() > 0 {
            write!(f, " ({} failed)", self.failed_count())?;
        }
        if !self.write_failures.is_empty() {
            write!(f, "; {} values not written", self.write_failed_count())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_display() {
        let mut report = RestoreReport::new(4);
        report.record(CellCoord::new(0, 0), CellRestoreOutcome::Restored);
        report.record(
            CellCoord::new(2, 1),
            CellRestoreOutcome::Failed {
                reason: "style table is full (64000 distinct styles)".into(),
                value_reasserted: true,
            },
        );

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.restored_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_clean());
        assert_eq!(
            report.failures().map(|(c, _)| c).collect::<Vec<_>>(),
            vec![CellCoord::new(2, 1)]
        );
        assert_eq!(
            report.to_string(),
            "4 cells written, formatting restored on 1 of 2 cells (1 failed)"
        );
    }

    #[test]
    fn test_write_failures() {
        let mut report = RestoreReport::new(1);
        report.record(CellCoord::new(0, 0), CellRestoreOutcome::Unchanged);
        assert!(report.is_clean());

        report.record_write_failure(CellCoord::new(1, 0), "locked");
        assert!(!report.is_clean());
        assert_eq!(report.failed_count(), 0);
        assert_eq!(
            report.write_failures().collect::<Vec<_>>(),
            vec![(CellCoord::new(1, 0), "locked")]
        );
        assert_eq!(
            report.to_string(),
            "1 cells written, formatting restored on 1 of 1 cells; 1 values not written"
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["write_failures"]["A2"], "locked");
        assert_eq!(json["outcomes"]["A1"]["status"], "unchanged");
    }

    #[test]
    fn test_serializes_with_a1_keys() {
        let mut report = RestoreReport::new(1);
        report.record(CellCoord::new(0, 1), CellRestoreOutcome::Restored);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cells_written": 1,
                "outcomes": { "B1": { "status": "restored" } }
            })
        );
    }
}
