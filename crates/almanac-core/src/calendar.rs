use anyhow::anyhow;
use chrono::{Datelike, Duration, NaiveDate};

use crate::task::Task;

/// The displayed month. Initialized from the real current date, moved only by
/// month navigation, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Moves the cursor by `delta` months, carrying into the year on
    /// overflow in either direction.
    pub fn change_month(&mut self, delta: i32) {
        let total = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        self.year = (total.div_euclid(12)) as i32;
        self.month = (total.rem_euclid(12)) as u32 + 1;
    }

    pub fn label(&self) -> String {
        format!("{}년 {}월", self.year, self.month)
    }
}

/// One day cell of the month grid. `tasks` holds every task dated exactly on
/// this cell, in collection order.
#[derive(Debug, Clone)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub label: String,
    /// Blank cells before day 1, one per weekday slot (Sunday-indexed).
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Projects the task collection onto the cursor's month. The today flag
    /// is computed against `today` here, at build time.
    #[tracing::instrument(skip(tasks, today))]
    pub fn build(cursor: MonthCursor, tasks: &[Task], today: NaiveDate) -> anyhow::Result<Self> {
        let first = NaiveDate::from_ymd_opt(cursor.year, cursor.month, 1)
            .ok_or_else(|| anyhow!("invalid month cursor: {}-{}", cursor.year, cursor.month))?;
        let leading_blanks = first.weekday().num_days_from_sunday();
        let last_day = last_day_of_month(cursor.year, cursor.month)?;

        let mut cells = Vec::with_capacity(last_day as usize);
        for day in 1..=last_day {
            let date = first + Duration::days(i64::from(day) - 1);
            let day_tasks: Vec<Task> = tasks
                .iter()
                .filter(|task| task.date == date)
                .cloned()
                .collect();

            cells.push(DayCell {
                day,
                date,
                is_today: date == today,
                tasks: day_tasks,
            });
        }

        Ok(Self {
            year: cursor.year,
            month: cursor.month,
            label: cursor.label(),
            leading_blanks,
            cells,
        })
    }
}

/// Day count via "day 0 of the next month": the day before the first of the
/// month after the target one.
fn last_day_of_month(year: i32, month: u32) -> anyhow::Result<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| anyhow!("invalid month: {year}-{month}"))?;
    Ok((first_of_next - Duration::days(1)).day())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{MonthCursor, MonthGrid};
    use crate::task::Task;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn may_2024_grid_shape() {
        // May 1st 2024 is a Wednesday: three blank slots, then 31 days.
        let cursor = MonthCursor {
            year: 2024,
            month: 5,
        };
        let grid = MonthGrid::build(cursor, &[], day(2024, 5, 10)).expect("build grid");

        assert_eq!(grid.leading_blanks, 3);
        assert_eq!(grid.cells.len(), 31);
        assert_eq!(grid.label, "2024년 5월");
    }

    #[test]
    fn task_lands_only_on_its_day() {
        let cursor = MonthCursor {
            year: 2024,
            month: 5,
        };
        let tasks = vec![Task::new(7, "dentist".to_string(), day(2024, 5, 15))];
        let grid = MonthGrid::build(cursor, &tasks, day(2024, 5, 10)).expect("build grid");

        for cell in &grid.cells {
            if cell.day == 15 {
                assert_eq!(cell.tasks.len(), 1);
                assert_eq!(cell.tasks[0].text, "dentist");
            } else {
                assert!(cell.tasks.is_empty(), "day {} should be empty", cell.day);
            }
        }
    }

    #[test]
    fn cell_tasks_keep_collection_order() {
        let cursor = MonthCursor {
            year: 2024,
            month: 5,
        };
        let tasks = vec![
            Task::new(2, "later entry".to_string(), day(2024, 5, 3)),
            Task::new(1, "earlier entry".to_string(), day(2024, 5, 3)),
        ];
        let grid = MonthGrid::build(cursor, &tasks, day(2024, 5, 10)).expect("build grid");

        let cell = grid
            .cells
            .iter()
            .find(|cell| cell.day == 3)
            .expect("cell for day 3");
        let ids: Vec<u64> = cell.tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn today_flag_marks_exactly_one_cell() {
        let cursor = MonthCursor {
            year: 2024,
            month: 5,
        };
        let grid = MonthGrid::build(cursor, &[], day(2024, 5, 15)).expect("build grid");
        let flagged: Vec<u32> = grid
            .cells
            .iter()
            .filter(|cell| cell.is_today)
            .map(|cell| cell.day)
            .collect();
        assert_eq!(flagged, vec![15]);

        let other_month = MonthGrid::build(cursor, &[], day(2024, 6, 15)).expect("build grid");
        assert!(other_month.cells.iter().all(|cell| !cell.is_today));
    }

    #[test]
    fn february_day_counts() {
        let leap = MonthGrid::build(
            MonthCursor {
                year: 2024,
                month: 2,
            },
            &[],
            day(2024, 1, 1),
        )
        .expect("build grid");
        assert_eq!(leap.cells.len(), 29);

        let common = MonthGrid::build(
            MonthCursor {
                year: 2025,
                month: 2,
            },
            &[],
            day(2024, 1, 1),
        )
        .expect("build grid");
        assert_eq!(common.cells.len(), 28);
    }

    #[test]
    fn month_navigation_rolls_over_years() {
        let mut cursor = MonthCursor {
            year: 2024,
            month: 12,
        };
        cursor.change_month(1);
        assert_eq!((cursor.year, cursor.month), (2025, 1));

        cursor.change_month(-1);
        assert_eq!((cursor.year, cursor.month), (2024, 12));

        let mut cursor = MonthCursor {
            year: 2024,
            month: 1,
        };
        cursor.change_month(-1);
        assert_eq!((cursor.year, cursor.month), (2023, 12));

        cursor.change_month(13);
        assert_eq!((cursor.year, cursor.month), (2025, 1));
    }
}
