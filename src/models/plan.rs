//! Protocol time plan.
//!
//! A time plan is the prospective counterpart of a timetable: instead of
//! compiling observed events, it holds a hand-written rule grid of protocol
//! rows ("fMRI", "iv Flu.", ...) over a number of study days, each cell an
//! integer code. Day labels are 1-based.

use serde::{Deserialize, Serialize};

use super::LayerCode;

/// A labelled rule grid over `duration` days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePlan {
    /// Row labels, one per protocol line.
    pub labels: Vec<String>,
    /// Number of study days.
    pub duration: usize,
    /// Row-major codes: `rules[row][day]`.
    pub rules: Vec<Vec<LayerCode>>,
}

impl TimePlan {
    /// Creates an empty plan.
    pub fn new<I, S>(labels: I, duration: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let rules = vec![vec![0; duration]; labels.len()];
        Self {
            labels,
            duration,
            rules,
        }
    }

    /// Sets one day of a row. Out-of-range coordinates are ignored.
    pub fn mark(&mut self, row: usize, day: usize, code: LayerCode) -> &mut Self {
        if let Some(cell) = self.rules.get_mut(row).and_then(|r| r.get_mut(day)) {
            *cell = code;
        }
        self
    }

    /// Sets days `[from, to)` of a row, clamped to the plan.
    pub fn mark_range(&mut self, row: usize, from: usize, to: usize, code: LayerCode) -> &mut Self {
        if let Some(r) = self.rules.get_mut(row) {
            let to = to.min(r.len());
            for cell in r.iter_mut().take(to).skip(from) {
                *cell = code;
            }
        }
        self
    }

    /// Sets every `stride`-th day of a row counting back from the last day.
    pub fn mark_every(&mut self, row: usize, stride: usize, code: LayerCode) -> &mut Self {
        if stride == 0 {
            return self;
        }
        if let Some(r) = self.rules.get_mut(row) {
            for cell in r.iter_mut().rev().step_by(stride) {
                *cell = code;
            }
        }
        self
    }

    /// Code at a coordinate, `None` outside the plan.
    pub fn get(&self, row: usize, day: usize) -> Option<LayerCode> {
        self.rules.get(row).and_then(|r| r.get(day)).copied()
    }

    /// 1-based day labels.
    pub fn day_labels(&self) -> Vec<usize> {
        (1..=self.duration).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol() -> TimePlan {
        let mut plan = TimePlan::new(["fMRI", "iv Flu.", "ip Flu."], 57);
        plan.mark_every(0, 14, 1)
            .mark(0, 7, 1)
            .mark_range(0, 0, 2, 1)
            .mark(1, 14, 2)
            .mark_range(2, 15, 42, 3);
        plan
    }

    #[test]
    fn test_protocol_rows() {
        let plan = protocol();
        // every 14th day from the end: 56, 42, 28, 14, 0
        for day in [0, 14, 28, 42, 56] {
            assert_eq!(plan.get(0, day), Some(1));
        }
        assert_eq!(plan.get(0, 1), Some(1));
        assert_eq!(plan.get(0, 7), Some(1));
        assert_eq!(plan.get(0, 8), Some(0));
        assert_eq!(plan.get(1, 14), Some(2));
        assert_eq!(plan.rules[2].iter().filter(|c| **c == 3).count(), 27);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut plan = TimePlan::new(["a"], 3);
        plan.mark(5, 0, 1).mark(0, 10, 1).mark_range(0, 2, 10, 4);
        assert_eq!(plan.rules, vec![vec![0, 0, 4]]);
        assert_eq!(plan.get(1, 0), None);
    }

    #[test]
    fn test_day_labels_one_based() {
        let plan = TimePlan::new(["a"], 3);
        assert_eq!(plan.day_labels(), vec![1, 2, 3]);
    }
}
