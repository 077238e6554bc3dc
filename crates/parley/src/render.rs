// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-terminal rendering of timeline entries.
//!
//! Each entry becomes:
//! - a `-- Monday 09:30 --` line when it carries a timestamp label,
//! - a blank separator line unless it is tightened (or the very first line),
//! - the message itself, `>` for ours and `<` for theirs.

use colored::Colorize;
use parley_core::types::{Direction, TimelineEntry};

/// Renders one entry. `first` suppresses the leading separator.
pub fn render_entry(entry: &TimelineEntry, first: bool, color: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(label) = &entry.timestamp_label {
        if !first {
            lines.push(String::new());
        }
        let text = format!("-- {label} --");
        lines.push(if color {
            text.dimmed().to_string()
        } else {
            text
        });
    } else if !entry.tighten_spacing && !first {
        lines.push(String::new());
    }

    let content = &entry.message.content;
    let line = match entry.message.direction {
        Direction::Sent => {
            let line = format!("  > {content}");
            if color {
                line.cyan().to_string()
            } else {
                line
            }
        }
        Direction::Received => {
            let line = format!("  < {content}");
            if color {
                line.green().to_string()
            } else {
                line
            }
        }
    };
    lines.push(line);
    lines
}

/// Renders `entries[from..]`, treating index 0 as the start of the output.
pub fn render_from(entries: &[TimelineEntry], from: usize, color: bool) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .skip(from)
        .flat_map(|(i, entry)| render_entry(entry, i == 0, color))
        .collect()
}
