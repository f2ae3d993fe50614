use crate::models::{ExerciseRecord, SearchQuery};

/// Search results with already-saved exercises filtered out. `candidates`
/// keeps the full catalog answer so the list can be recomputed after every
/// save without searching again.
pub(crate) struct ResultsScreen {
    pub(crate) query: SearchQuery,
    pub(crate) candidates: Vec<ExerciseRecord>,
    pub(crate) display: Vec<ExerciseRecord>,
    pub(crate) selected: usize,
}

impl ResultsScreen {
    pub(crate) fn new(query: SearchQuery, candidates: Vec<ExerciseRecord>) -> Self {
        Self {
            query,
            candidates,
            display: Vec::new(),
            selected: 0,
        }
    }

    /// Swap in a freshly filtered list and keep the selection in range.
    pub(crate) fn set_display(&mut self, display: Vec<ExerciseRecord>) {
        self.display = display;
        self.ensure_in_bounds();
    }

    pub(crate) fn current(&self) -> Option<&ExerciseRecord> {
        self.display.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.display.is_empty() {
            return;
        }
        let len = self.display.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.display.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.display.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.display.len() {
            self.selected = self.display.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ExerciseRecord {
        ExerciseRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let mut screen = ResultsScreen::new(SearchQuery::default(), Vec::new());
        screen.set_display(vec![named("A"), named("B"), named("C")]);
        screen.select_last();

        screen.set_display(vec![named("A"), named("B")]);

        assert_eq!(screen.selected, 1);
        assert_eq!(screen.current().unwrap().name, "B");
    }

    #[test]
    fn move_selection_saturates() {
        let mut screen = ResultsScreen::new(SearchQuery::default(), Vec::new());
        screen.set_display(vec![named("A"), named("B")]);
        screen.move_selection(-5);
        assert_eq!(screen.selected, 0);
        screen.move_selection(5);
        assert_eq!(screen.selected, 1);
    }
}
