//! Text formatting functions for `disc`.
//!
//! Provides terminal output for the board:
//! - Status icons (○ ◌ ◐ ❄ ◕ ✓)
//! - Score cells colored by band (grey, yellow, green)
//! - Aligned table rows, measured with display width
//! - Kanban columns rendered one after another

use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};
use discovery_lib::{Idea, Impact, KanbanBoard, ScoreLevel, Status, Thresholds};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::ProjectWithCount;

const MAX_TITLE_WIDTH: usize = 48;

/// Status icon characters.
pub mod icons {
    pub const OPEN: &str = "○";
    pub const TODO: &str = "◌";
    pub const IN_PROGRESS: &str = "◐";
    pub const PAUSED: &str = "❄";
    pub const TESTING: &str = "◕";
    pub const DONE: &str = "✓";
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Open => icons::OPEN,
        Status::Todo => icons::TODO,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Paused => icons::PAUSED,
        Status::Testing => icons::TESTING,
        Status::Done => icons::DONE,
    }
}

/// Format an impact multiplier as `2x`, `0.25x`.
#[must_use]
pub fn format_impact(impact: Impact) -> String {
    format!("{}x", impact.multiplier())
}

/// Format a score with one decimal, colored by band when `color` is set.
#[must_use]
pub fn format_score(score: f64, level: ScoreLevel, color: bool) -> String {
    let text = format!("{score:.1}");
    if color {
        text.with(level_color(level)).to_string()
    } else {
        text
    }
}

const fn level_color(level: ScoreLevel) -> Color {
    match level {
        ScoreLevel::Low => Color::DarkGrey,
        ScoreLevel::Medium => Color::Yellow,
        ScoreLevel::High => Color::Green,
    }
}

/// Format a single-line idea summary.
///
/// Format: `{icon} {id} [{score}] {title}`
#[must_use]
pub fn format_idea_line(idea: &Idea) -> String {
    format!(
        "{} {} [{:.1}] {}",
        format_status_icon(idea.status),
        idea.id,
        idea.rice_score,
        idea.title,
    )
}

/// Cut `text` to at most `max` display columns, marking the cut with `…`.
#[must_use]
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

/// Render the table projection with a header row.
#[must_use]
pub fn render_table(rows: &[&Idea], thresholds: &Thresholds, color: bool) -> String {
    const HEADERS: [&str; 8] = [
        "ID", "TITLE", "REACH", "IMPACT", "CONF", "EFFORT", "SCORE", "STATUS",
    ];

    let cells: Vec<[String; 8]> = rows
        .iter()
        .map(|idea| {
            [
                idea.id.clone(),
                truncate_to_width(&idea.title, MAX_TITLE_WIDTH),
                format!("{}", idea.reach),
                format_impact(idea.impact),
                format!("{}%", idea.confidence),
                format!("{}h", idea.effort),
                format!("{:.1}", idea.rice_score),
                idea.status.label().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| pad(h, w))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());

    for (row, idea) in cells.iter().zip(rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, w))| {
                let padded = pad(cell, w);
                if col == 6 && color {
                    // Color after padding so escape codes don't skew widths.
                    padded
                        .with(level_color(thresholds.level(idea.rice_score)))
                        .to_string()
                } else {
                    padded
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// Render the kanban projection, one column section after another.
#[must_use]
pub fn render_kanban(board: &KanbanBoard<'_>, thresholds: &Thresholds, color: bool) -> String {
    let mut out = String::new();
    for (status, ideas) in board.iter() {
        let _ = writeln!(
            out,
            "{} {} ({})",
            format_status_icon(status),
            status.label(),
            ideas.len()
        );
        for idea in ideas {
            let score = format_score(idea.rice_score, thresholds.level(idea.rice_score), color);
            let _ = writeln!(
                out,
                "  {} [{score}] {}",
                idea.id,
                truncate_to_width(&idea.title, MAX_TITLE_WIDTH)
            );
        }
    }
    out
}

/// Render the project list, marking the active project with `*`.
#[must_use]
pub fn render_projects(projects: &[ProjectWithCount]) -> String {
    let name_width = projects
        .iter()
        .map(|p| p.project.name.width())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for entry in projects {
        let marker = if entry.active { '*' } else { ' ' };
        let noun = if entry.idea_count == 1 { "idea" } else { "ideas" };
        let _ = writeln!(
            out,
            "{marker} {} {}  {} {noun}",
            entry.project.id,
            pad(&entry.project.name, name_width),
            entry.idea_count
        );
    }
    out
}
