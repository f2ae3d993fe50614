//! Domain models that mirror the `SavedExercises` table and the catalog's JSON
//! payload. They stay plain data holders; persistence and consistency live in
//! `db` and `sync`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single exercise as returned by the catalog and as stored locally. Values
/// are never edited in place; a change means building a new record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseRecord {
    /// Identity within the saved set. Compared case-sensitively.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub muscle: String,
    pub equipment: String,
    pub difficulty: String,
    pub instructions: String,
}

impl ExerciseRecord {
    /// Split the free-text instructions on full stops and number each
    /// sentence, e.g. `"1. Lie down."`. Blank fragments are dropped.
    pub fn instruction_steps(&self) -> Vec<String> {
        self.instructions
            .split('.')
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .enumerate()
            .map(|(idx, sentence)| format!("{}. {}.", idx + 1, sentence))
            .collect()
    }
}

impl fmt::Display for ExerciseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A saved record together with its row id, which is what `update` addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredExercise {
    pub id: i64,
    pub record: ExerciseRecord,
}

/// Difficulty levels the catalog understands. The search form cycles through
/// these; the stored `difficulty` column stays free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
        }
    }

    /// Step through the levels, saturating at either end like a slider.
    pub fn step(self, offset: isize) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0) as isize;
        let max = Self::ALL.len() as isize - 1;
        Self::ALL[(idx + offset).clamp(0, max) as usize]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exercise types offered by the search form. Suggestions only.
pub const EXERCISE_TYPES: &[&str] = &[
    "cardio",
    "olympic_weightlifting",
    "plyometrics",
    "powerlifting",
    "strength",
    "stretching",
    "strongman",
];

/// Muscle groups offered by the search form. Suggestions only.
pub const MUSCLE_GROUPS: &[&str] = &[
    "abdominals",
    "abductors",
    "adductors",
    "biceps",
    "calves",
    "chest",
    "forearms",
    "glutes",
    "hamstrings",
    "lats",
    "lower_back",
    "middle_back",
    "neck",
    "quadriceps",
    "traps",
    "triceps",
];

/// Parameters for one catalog search. Empty `name` and `None` filters are left
/// out of the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub name: String,
    pub kind: Option<String>,
    pub muscle: Option<String>,
    pub difficulty: Difficulty,
}

/// Turn `lower_back` into `Lower Back` for display.
pub fn capitalize_words(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_steps_are_numbered_and_trimmed() {
        let record = ExerciseRecord {
            name: "Push-up".into(),
            instructions: "Get down on the floor.  Push up. Lower yourself slowly.".into(),
            ..Default::default()
        };

        assert_eq!(
            record.instruction_steps(),
            vec![
                "1. Get down on the floor.".to_string(),
                "2. Push up.".to_string(),
                "3. Lower yourself slowly.".to_string(),
            ]
        );
    }

    #[test]
    fn instruction_steps_handle_missing_trailing_period() {
        let record = ExerciseRecord {
            instructions: "Breathe in. Breathe out".into(),
            ..Default::default()
        };
        assert_eq!(record.instruction_steps(), vec!["1. Breathe in.", "2. Breathe out."]);
    }

    #[test]
    fn catalog_json_decodes_type_field() {
        let body = r#"[{
            "name": "Incline Hammer Curls",
            "type": "strength",
            "muscle": "biceps",
            "equipment": "dumbbell",
            "difficulty": "beginner",
            "instructions": "Seat yourself on an incline bench."
        }]"#;

        let records: Vec<ExerciseRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "strength");
        assert_eq!(records[0].muscle, "biceps");
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let records: Vec<ExerciseRecord> =
            serde_json::from_str(r#"[{"name": "Plank"}]"#).unwrap();
        assert_eq!(records[0].name, "Plank");
        assert!(records[0].equipment.is_empty());
    }

    #[test]
    fn difficulty_step_saturates() {
        assert_eq!(Difficulty::Beginner.step(-1), Difficulty::Beginner);
        assert_eq!(Difficulty::Beginner.step(1), Difficulty::Intermediate);
        assert_eq!(Difficulty::Expert.step(1), Difficulty::Expert);
    }

    #[test]
    fn capitalize_words_handles_underscores() {
        assert_eq!(capitalize_words("lower_back"), "Lower Back");
        assert_eq!(capitalize_words("strength"), "Strength");
        assert_eq!(capitalize_words(""), "");
    }
}
