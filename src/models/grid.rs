//! Dense layer grid.
//!
//! A grid is a zero-initialized `dates x axis values` array of integer
//! layer codes. Coordinates are resolved through the window (date to day
//! index) and a precomputed label lookup (axis value to column index); all
//! writes go through [`LayerGrid::add_weight`], which skips coordinates
//! outside the grid instead of failing.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::DateWindow;

/// Integer code stored in a grid cell: a sum of layer weights.
pub type LayerCode = u32;

/// A dense occupancy grid for one specification group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerGrid {
    window: DateWindow,
    axis_labels: Vec<String>,
    #[serde(skip)]
    axis_index: HashMap<String, usize>,
    /// Row-major by date: `cells[day * axis_len + axis]`.
    cells: Vec<LayerCode>,
}

impl LayerGrid {
    /// Creates a zero-filled grid over the window and axis labels.
    ///
    /// Duplicate labels keep their first position.
    pub fn zeros(window: DateWindow, axis_labels: Vec<String>) -> Self {
        let mut axis_index = HashMap::with_capacity(axis_labels.len());
        for (i, label) in axis_labels.iter().enumerate() {
            axis_index.entry(label.clone()).or_insert(i);
        }
        let cells = vec![0; window.len_days() * axis_labels.len()];
        Self {
            window,
            axis_labels,
            axis_index,
            cells,
        }
    }

    /// Returns a zero-filled grid with the same shape.
    pub fn blank(&self) -> Self {
        Self {
            window: self.window,
            axis_labels: self.axis_labels.clone(),
            axis_index: self.axis_index.clone(),
            cells: vec![0; self.cells.len()],
        }
    }

    /// Date window covered by the grid.
    pub fn window(&self) -> DateWindow {
        self.window
    }

    /// Axis labels in column order.
    pub fn axis_labels(&self) -> &[String] {
        &self.axis_labels
    }

    /// Number of days (rows).
    #[inline]
    pub fn num_days(&self) -> usize {
        self.window.len_days()
    }

    /// Number of axis values (columns).
    #[inline]
    pub fn num_axis(&self) -> usize {
        self.axis_labels.len()
    }

    /// Column index of an axis label.
    pub fn axis_position(&self, label: &str) -> Option<usize> {
        self.axis_index.get(label).copied()
    }

    fn offset(&self, date: NaiveDate, axis_value: &str) -> Option<usize> {
        let day = self.window.index_of(date)?;
        let axis = self.axis_position(axis_value)?;
        Some(day * self.axis_labels.len() + axis)
    }

    /// Adds `amount` to the cell at `(date, axis_value)`.
    ///
    /// Returns `false` without writing when the date lies outside the window
    /// or the axis value is unknown.
    pub fn add_weight(&mut self, date: NaiveDate, axis_value: &str, amount: LayerCode) -> bool {
        match self.offset(date, axis_value) {
            Some(i) => {
                self.cells[i] += amount;
                true
            }
            None => false,
        }
    }

    /// Cell value at `(date, axis_value)`; `None` outside the grid.
    pub fn get(&self, date: NaiveDate, axis_value: &str) -> Option<LayerCode> {
        self.offset(date, axis_value).map(|i| self.cells[i])
    }

    /// Cell value by indices.
    #[inline]
    pub fn at(&self, day: usize, axis: usize) -> LayerCode {
        self.cells[day * self.axis_labels.len() + axis]
    }

    /// Raw cells, row-major by date.
    pub fn cells(&self) -> &[LayerCode] {
        &self.cells
    }

    /// Values of one axis value across all days (one row of the transposed
    /// grid, as a renderer draws it).
    pub fn axis_series(&self, axis: usize) -> Vec<LayerCode> {
        (0..self.num_days()).map(|day| self.at(day, axis)).collect()
    }

    /// Grid transposed to `axis values x dates`.
    pub fn transposed(&self) -> Vec<Vec<LayerCode>> {
        (0..self.num_axis()).map(|a| self.axis_series(a)).collect()
    }

    /// Largest code in the grid.
    pub fn max_code(&self) -> LayerCode {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Number of non-zero cells.
    pub fn active_cells(&self) -> usize {
        self.cells.iter().filter(|c| **c != 0).count()
    }

    /// Whether every cell is zero.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| *c == 0)
    }

    /// Cell-wise sum with a grid of the same shape.
    ///
    /// Returns `None` when shapes differ.
    pub fn sum(&self, other: &Self) -> Option<Self> {
        if self.window != other.window || self.axis_labels != other.axis_labels {
            return None;
        }
        let mut out = self.clone();
        for (a, b) in out.cells.iter_mut().zip(&other.cells) {
            *a += *b;
        }
        Some(out)
    }
}
