use crate::core::validation::{validate_area, MINIMUM_VALID_ROWS};
use crate::errors::TableError;
use crate::input::{ObservationField, RawObservation};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Identifies a row for editing. Ids are handed out in increasing order and never reused, so a
/// removed row's id cannot come back to refer to a different row.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RowId(u64);

impl Display for RowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The editable list of monthly rows. Only the row order is significant to the analysis.
#[derive(Clone, Debug)]
pub struct ObservationTable {
    rows: IndexMap<RowId, RawObservation>,
    next_id: u64,
    revision: u64,
}

impl Default for ObservationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationTable {
    /// A table holding a single blank row.
    pub fn new() -> Self {
        Self::with_rows([RawObservation::default()])
    }

    pub fn with_rows(rows: impl IntoIterator<Item = RawObservation>) -> Self {
        let mut table = Self {
            rows: IndexMap::new(),
            next_id: 1,
            revision: 0,
        };
        for row in rows {
            table.push(row);
        }
        table
    }

    fn push(&mut self, row: RawObservation) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Incremented on every edit, so a computed result can tell whether its input has moved on.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: RowId) -> Option<&RawObservation> {
        self.rows.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, &RawObservation)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// The rows in table order, without their ids.
    pub fn observations(&self) -> Vec<RawObservation> {
        self.rows.values().cloned().collect()
    }

    /// Appends a blank row.
    pub fn add_row(&mut self) -> RowId {
        self.append(RawObservation::default())
    }

    pub fn append(&mut self, row: RawObservation) -> RowId {
        let id = self.push(row);
        self.touch();
        id
    }

    pub fn update(
        &mut self,
        id: RowId,
        field: ObservationField,
        value: impl Into<String>,
    ) -> Result<(), TableError> {
        self.rows
            .get_mut(&id)
            .ok_or(TableError::UnknownRow(id.0))?
            .set_field(field, value.into());
        self.touch();
        Ok(())
    }

    /// Removes a row, keeping the order of the others. The table never becomes empty.
    pub fn remove_row(&mut self, id: RowId) -> Result<RawObservation, TableError> {
        if !self.rows.contains_key(&id) {
            return Err(TableError::UnknownRow(id.0));
        }
        if self.rows.len() <= 1 {
            return Err(TableError::LastRow);
        }
        let removed = self
            .rows
            .shift_remove(&id)
            .ok_or(TableError::UnknownRow(id.0))?;
        self.touch();
        Ok(removed)
    }

    /// Replaces every row with a single blank one.
    pub fn clear(&mut self) -> RowId {
        self.rows.clear();
        let id = self.push(RawObservation::default());
        self.touch();
        id
    }

    /// Whether a computation is worth attempting: a usable area and at least a year's worth of
    /// rows. Rows are not validated here, so computing may still fail on insufficient data.
    pub fn ready_to_compute(&self, area: &str) -> bool {
        validate_area(area).is_ok() && self.rows.len() >= MINIMUM_VALID_ROWS
    }
}
