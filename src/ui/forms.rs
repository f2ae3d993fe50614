use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{
    capitalize_words, Difficulty, ExerciseRecord, SearchQuery, EXERCISE_TYPES, MUSCLE_GROUPS,
};

/// Fields available within the search form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum SearchField {
    #[default]
    Name,
    Type,
    Muscle,
    Difficulty,
}

impl SearchField {
    const ORDER: [SearchField; 4] = [
        SearchField::Name,
        SearchField::Type,
        SearchField::Muscle,
        SearchField::Difficulty,
    ];

    fn shifted(self, offset: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + offset).rem_euclid(len) as usize]
    }
}

/// State of the search form. Type and muscle hold an index into their
/// suggestion list, with `None` meaning "Any".
#[derive(Default, Clone, Debug)]
pub(crate) struct SearchForm {
    pub(crate) name: String,
    pub(crate) kind: Option<usize>,
    pub(crate) muscle: Option<usize>,
    pub(crate) difficulty: Difficulty,
    pub(crate) active: SearchField,
}

impl SearchForm {
    pub(crate) fn next_field(&mut self) {
        self.active = self.active.shifted(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.shifted(-1);
    }

    /// Only the name field takes free text. Returns whether the key was used.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if self.active == SearchField::Name && !ch.is_control() {
            self.name.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == SearchField::Name {
            self.name.pop();
        }
    }

    /// Left/Right on a choice field steps through its options.
    pub(crate) fn cycle(&mut self, offset: isize) {
        match self.active {
            SearchField::Name => {}
            SearchField::Type => self.kind = cycle_choice(self.kind, EXERCISE_TYPES.len(), offset),
            SearchField::Muscle => {
                self.muscle = cycle_choice(self.muscle, MUSCLE_GROUPS.len(), offset)
            }
            SearchField::Difficulty => self.difficulty = self.difficulty.step(offset),
        }
    }

    pub(crate) fn to_query(&self) -> SearchQuery {
        SearchQuery {
            name: self.name.trim().to_string(),
            kind: self.kind.map(|idx| EXERCISE_TYPES[idx].to_string()),
            muscle: self.muscle.map(|idx| MUSCLE_GROUPS[idx].to_string()),
            difficulty: self.difficulty,
        }
    }

    /// Render one labelled line of the form, highlighting the focused field.
    pub(crate) fn build_line(&self, field_name: &str, field: SearchField) -> Line<'static> {
        let value = match field {
            SearchField::Name => {
                if self.name.is_empty() {
                    "<any name>".to_string()
                } else {
                    self.name.clone()
                }
            }
            SearchField::Type => choice_label(self.kind, EXERCISE_TYPES),
            SearchField::Muscle => choice_label(self.muscle, MUSCLE_GROUPS),
            SearchField::Difficulty => capitalize_words(self.difficulty.as_str()),
        };

        let style = if self.active == field {
            Style::default().fg(Color::Yellow)
        } else if field == SearchField::Name && self.name.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let shown = if self.active == field && field != SearchField::Name {
            format!("< {value} >")
        } else {
            value
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(shown, style),
        ])
    }
}

/// Step through `None, Some(0), .., Some(len - 1)` with wrap-around.
fn cycle_choice(current: Option<usize>, len: usize, offset: isize) -> Option<usize> {
    let slots = len as isize + 1;
    let position = current.map(|idx| idx as isize + 1).unwrap_or(0);
    match (position + offset).rem_euclid(slots) {
        0 => None,
        slot => Some(slot as usize - 1),
    }
}

fn choice_label(choice: Option<usize>, options: &[&str]) -> String {
    match choice.and_then(|idx| options.get(idx)) {
        Some(option) => capitalize_words(option),
        None => "Any".to_string(),
    }
}

/// Pending confirmation before a saved exercise is removed.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmRemove {
    pub(crate) exercise: ExerciseRecord,
}
