use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{capitalize_words, ExerciseRecord};

/// Full detail view of a saved exercise: attributes, then numbered steps.
pub(crate) fn exercise_detail_lines(exercise: &ExerciseRecord) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let mut lines = vec![
        Line::from(Span::styled(
            exercise.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        attribute_line("Type", &exercise.kind, label),
        attribute_line("Muscle", &exercise.muscle, label),
        attribute_line("Equipment", &exercise.equipment, label),
        attribute_line("Difficulty", &exercise.difficulty, label),
        Line::from(""),
        Line::from(Span::styled(
            "Instructions:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let steps = exercise.instruction_steps();
    if steps.is_empty() {
        lines.push(Line::from(Span::styled("No instructions.", label)));
    } else {
        lines.extend(steps.into_iter().map(Line::from));
    }
    lines
}

/// One-line summary used by the results list.
pub(crate) fn exercise_summary(exercise: &ExerciseRecord) -> String {
    format!(
        "{}  ·  {} / {} / {} / {}",
        exercise.name,
        capitalize_words(&exercise.kind),
        capitalize_words(&exercise.muscle),
        capitalize_words(&exercise.equipment),
        capitalize_words(&exercise.difficulty),
    )
}

fn attribute_line(name: &str, value: &str, label: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name}: "), label),
        Span::raw(capitalize_words(value)),
    ])
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
