//! Plain-text surface.
//!
//! Draws one line per entity and one character per day:
//! `.` for an empty cell, the shade code as a digit, and the saturate code
//! as a letter (`a` = 1, `b` = 2, ...). Saturate wins where both are set.
//! A header row prints the date or offset label every `label_every` days.

use super::{axis_title, RenderSurface};
use crate::compile::Timetable;
use crate::error::Result;
use crate::models::{LayerCode, TimePlan};

/// Renders timetables and time plans as text.
#[derive(Debug, Clone)]
pub struct TextSurface {
    label_every: usize,
}

impl Default for TextSurface {
    fn default() -> Self {
        Self { label_every: 7 }
    }
}

impl TextSurface {
    /// Creates a surface labelling every 7th day.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header label interval (minimum 1).
    pub fn with_label_every(mut self, every: usize) -> Self {
        self.label_every = every.max(1);
        self
    }

    /// Renders a protocol time plan with the same cell glyphs as shade codes.
    pub fn render_plan(&self, plan: &TimePlan) -> String {
        let width = label_width(plan.labels.iter().map(String::as_str), "Day");
        let labels: Vec<String> = plan.day_labels().iter().map(|d| d.to_string()).collect();
        let mut out = header("Day", width, &labels, self.label_every);
        for (label, row) in plan.labels.iter().zip(&plan.rules) {
            let cells: String = row.iter().map(|c| shade_glyph(*c)).collect();
            out.push_str(&format!("{label:<width$} {cells}\n"));
        }
        out
    }
}

impl RenderSurface for TextSurface {
    type Output = String;

    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&mut self, timetable: &Timetable) -> Result<String> {
        let title = axis_title(&timetable.axis_key);
        let width = label_width(timetable.axis_labels.iter().map(String::as_str), &title);
        let labels: Vec<String> = (0..timetable.num_days())
            .filter_map(|i| timetable.date_axis.label(i))
            .collect();
        let mut out = header(&title, width, &labels, self.label_every);

        for (axis, label) in timetable.axis_labels.iter().enumerate() {
            let cells: String = (0..timetable.num_days())
                .map(|day| {
                    let saturate = timetable.saturate.at(day, axis);
                    if saturate > 0 {
                        saturate_glyph(saturate)
                    } else {
                        shade_glyph(timetable.shade.at(day, axis))
                    }
                })
                .collect();
            out.push_str(&format!("{label:<width$} {cells}\n"));
        }
        Ok(out)
    }
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>, title: &str) -> usize {
    labels
        .map(|label| label.chars().count())
        .chain([title.chars().count()])
        .max()
        .unwrap_or(0)
}

/// Header line: labels placed at every `every`-th column, truncated so they
/// never overlap the next one. The last label may run past the grid.
fn header(title: &str, width: usize, labels: &[String], every: usize) -> String {
    let mut line = vec![' '; labels.len()];
    for (i, label) in labels.iter().enumerate().step_by(every) {
        for (j, ch) in label.chars().take(every).enumerate() {
            match line.get_mut(i + j) {
                Some(slot) => *slot = ch,
                None => line.push(ch),
            }
        }
    }
    let line: String = line.into_iter().collect();
    format!("{title:<width$} {}\n", line.trim_end())
}

fn shade_glyph(code: LayerCode) -> char {
    match code {
        0 => '.',
        1..=9 => char::from_digit(code, 10).unwrap_or('#'),
        _ => '#',
    }
}

fn saturate_glyph(code: LayerCode) -> char {
    match code {
        1..=26 => char::from(b'a' + (code - 1) as u8),
        _ => '*',
    }
}
