use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datetime::day_date_serde;

/// A single dated to-do item. The snapshot file holds an array of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,

    pub text: String,

    #[serde(with = "day_date_serde")]
    pub date: NaiveDate,
}

impl Task {
    pub fn new(id: u64, text: String, date: NaiveDate) -> Self {
        Self { id, text, date }
    }
}

/// Rows for the list view: ascending by date, insertion order preserved for
/// equal dates (stable sort).
pub fn date_sorted(tasks: &[Task]) -> Vec<&Task> {
    let mut rows: Vec<&Task> = tasks.iter().collect();
    rows.sort_by_key(|task| task.date);
    rows
}
