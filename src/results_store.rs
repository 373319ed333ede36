use crate::analysis::{compute, AnalysisResults};
use crate::errors::AnalysisError;
use crate::input::AnalysisSettings;
use crate::observation_table::ObservationTable;
use crate::AnalysisFlags;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// One published set of results, together with where it came from.
#[derive(Debug)]
pub struct AnalysisSnapshot {
    /// Starts at 1 and increases with every successful computation.
    pub version: u64,
    /// The revision of the observation table the results were computed from.
    pub table_revision: u64,
    pub results: AnalysisResults,
}

/// Holds the current results. A new snapshot replaces the old one as a unit, so a reader sees
/// either the previous results or the new ones, never a mixture. Failed computations leave the
/// current snapshot in place.
#[derive(Debug, Default)]
pub struct ResultsStore {
    current: ArcSwapOption<AnalysisSnapshot>,
    versions: AtomicU64,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<AnalysisSnapshot>> {
        self.current.load_full()
    }

    /// Snapshots the table, runs the analysis and publishes the outcome.
    pub fn compute(
        &self,
        table: &ObservationTable,
        settings: &AnalysisSettings,
        flags: &AnalysisFlags,
    ) -> Result<Arc<AnalysisSnapshot>, AnalysisError> {
        let table_revision = table.revision();
        let results = compute(&table.observations(), settings, flags)?;

        let snapshot = Arc::new(AnalysisSnapshot {
            version: self.versions.fetch_add(1, Ordering::SeqCst) + 1,
            table_revision,
            results,
        });
        if self.publish(&snapshot) {
            info!(
                version = snapshot.version,
                table_revision, "published analysis results"
            );
        } else {
            debug!(
                version = snapshot.version,
                "a newer snapshot was published first, keeping it"
            );
        }

        Ok(snapshot)
    }

    /// Installs the snapshot unless one with a higher version is already current, so computes
    /// finishing out of order never roll the results back. Returns whether it was installed.
    fn publish(&self, snapshot: &Arc<AnalysisSnapshot>) -> bool {
        let previous = self.current.rcu(|current| match current {
            Some(existing) if existing.version > snapshot.version => Some(Arc::clone(existing)),
            _ => Some(Arc::clone(snapshot)),
        });

        previous.map_or(true, |previous| previous.version < snapshot.version)
    }

    /// Whether the table or the settings (such as the area) have changed since the current
    /// results were computed. Stale results remain readable; it is up to the caller whether to
    /// show them.
    pub fn is_stale(&self, table: &ObservationTable, settings: &AnalysisSettings) -> bool {
        self.current.load_full().is_some_and(|snapshot| {
            snapshot.table_revision != table.revision() || snapshot.results.settings != *settings
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{AreaUnit, EnergyUnit, ObservationField, RawObservation};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn table() -> ObservationTable {
        ObservationTable::with_rows((0..12).map(|i| {
            RawObservation::new(
                "2023",
                &format!("M{}", i + 1),
                &(1_000 + 10 * i).to_string(),
                &(100 + 5 * i).to_string(),
                "0",
            )
        }))
    }

    #[fixture]
    fn settings() -> AnalysisSettings {
        AnalysisSettings::new("100", AreaUnit::SquareMetres, EnergyUnit::KilowattHours)
    }

    #[rstest]
    fn test_empty_store_has_no_results(table: ObservationTable, settings: AnalysisSettings) {
        let store = ResultsStore::new();

        assert!(store.current().is_none());
        assert!(!store.is_stale(&table, &settings));
    }

    #[rstest]
    fn test_compute_publishes_versioned_snapshots(
        table: ObservationTable,
        settings: AnalysisSettings,
    ) {
        let store = ResultsStore::new();
        let first = store
            .compute(&table, &settings, &AnalysisFlags::empty())
            .unwrap();
        let second = store
            .compute(&table, &settings, &AnalysisFlags::empty())
            .unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(store.current().unwrap().version, 2);
        assert_eq!(first.results, second.results);
    }

    #[rstest]
    fn test_failed_compute_keeps_previous_results(
        table: ObservationTable,
        settings: AnalysisSettings,
    ) {
        let store = ResultsStore::new();
        store
            .compute(&table, &settings, &AnalysisFlags::empty())
            .unwrap();

        let bad_settings = AnalysisSettings {
            area: "-5".into(),
            ..settings
        };
        let result = store.compute(&table, &bad_settings, &AnalysisFlags::empty());

        assert!(matches!(result, Err(AnalysisError::InvalidArea { .. })));
        let current = store.current().unwrap();
        assert_eq!(current.version, 1);
        assert_eq!(current.results.area, 100.);
    }

    #[rstest]
    fn test_editing_table_marks_results_stale_without_clearing(
        mut table: ObservationTable,
        settings: AnalysisSettings,
    ) {
        let store = ResultsStore::new();
        store
            .compute(&table, &settings, &AnalysisFlags::empty())
            .unwrap();
        assert!(!store.is_stale(&table, &settings));

        let first = table.iter().next().unwrap().0;
        table
            .update(first, ObservationField::Energy, "5000")
            .unwrap();

        assert!(store.is_stale(&table, &settings));
        assert_eq!(store.current().unwrap().results.normalised[0].actual_energy, 1_000.);
    }

    #[rstest]
    fn test_editing_area_marks_results_stale(table: ObservationTable, settings: AnalysisSettings) {
        let store = ResultsStore::new();
        store
            .compute(&table, &settings, &AnalysisFlags::empty())
            .unwrap();

        let resized = AnalysisSettings {
            area: "250".into(),
            ..settings.clone()
        };

        assert!(!store.is_stale(&table, &settings));
        assert!(store.is_stale(&table, &resized));
    }

    #[rstest]
    fn test_older_snapshot_never_replaces_newer(table: ObservationTable, settings: AnalysisSettings) {
        let store = ResultsStore::new();
        let results = compute(&table.observations(), &settings, &AnalysisFlags::empty()).unwrap();
        let snapshot = |version| {
            Arc::new(AnalysisSnapshot {
                version,
                table_revision: 0,
                results: results.clone(),
            })
        };

        assert!(store.publish(&snapshot(2)));
        assert!(!store.publish(&snapshot(1)));
        assert_eq!(store.current().unwrap().version, 2);
        assert!(store.publish(&snapshot(3)));
        assert_eq!(store.current().unwrap().version, 3);
    }

    #[rstest]
    fn test_concurrent_computes_leave_latest_version(
        table: ObservationTable,
        settings: AnalysisSettings,
    ) {
        let store = ResultsStore::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    store
                        .compute(&table, &settings, &AnalysisFlags::empty())
                        .unwrap()
                });
            }
        });

        assert_eq!(store.current().unwrap().version, 8);
    }
}
