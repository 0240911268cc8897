//! Missing-value repair and duplicate handling on raw rows.

use std::collections::HashSet;

use crate::domain::RawRecord;

/// Total missing cells across all rows and columns.
pub fn count_missing(records: &[RawRecord]) -> usize {
    records.iter().map(RawRecord::missing_cells).sum()
}

/// Rows that repeat an earlier row exactly (the first occurrence is not counted).
pub fn count_duplicates(records: &[RawRecord]) -> usize {
    let unique: HashSet<_> = records.iter().map(RawRecord::key).collect();
    records.len() - unique.len()
}

/// Fill each missing cell with the nearest earlier value in its column.
pub fn forward_fill(records: &mut [RawRecord]) {
    let mut last = RawRecord::default();
    for rec in records.iter_mut() {
        fill_row(rec, &mut last);
    }
}

/// Fill each missing cell with the nearest later value in its column.
pub fn back_fill(records: &mut [RawRecord]) {
    let mut last = RawRecord::default();
    for rec in records.iter_mut().rev() {
        fill_row(rec, &mut last);
    }
}

/// Drop exact duplicate rows, keeping the first occurrence in input order.
pub fn drop_duplicates(records: &mut Vec<RawRecord>) {
    let mut seen = HashSet::with_capacity(records.len());
    records.retain(|rec| seen.insert(rec.key()));
}

fn fill_row(rec: &mut RawRecord, last: &mut RawRecord) {
    fill_cell(&mut rec.timestamp, &mut last.timestamp);
    fill_cell(&mut rec.open, &mut last.open);
    fill_cell(&mut rec.high, &mut last.high);
    fill_cell(&mut rec.low, &mut last.low);
    fill_cell(&mut rec.close, &mut last.close);
    fill_cell(&mut rec.volume, &mut last.volume);
}

fn fill_cell<T: Clone>(cell: &mut Option<T>, last: &mut Option<T>) {
    if cell.is_some() {
        last.clone_from(cell);
    } else {
        cell.clone_from(last);
    }
}
