//! Greedy word wrapping for tile labels.

use super::{TextMeasurer, TextStyle};
use std::collections::VecDeque;

/// Breaks `text` into lines no wider than `max_width`, splitting only at whitespace.
///
/// A line is closed when appending the next word makes it overflow and it already holds more
/// than one word; a single word wider than `max_width` stays whole on its own line. Whitespace is
/// normalized, so `lines.join(" ")` equals the input's words joined by single spaces.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut words = text.split_whitespace().collect::<VecDeque<_>>();
    let mut lines: Vec<String> = Vec::new();
    let mut line: Vec<&str> = Vec::new();

    while let Some(word) = words.pop_front() {
        line.push(word);
        if line.len() > 1 && measure(&line.join(" ")) > max_width {
            line.pop();
            lines.push(line.join(" "));
            line.clear();
            line.push(word);
        }
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }
    lines
}

pub fn wrap_text_measurer(
    text: &str,
    max_width: f64,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
) -> Vec<String> {
    wrap_text(text, max_width, |line| measurer.measure_width(line, style))
}
