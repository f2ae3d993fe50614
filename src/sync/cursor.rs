/// Browsing position over the saved set. `Positioned(i)` always satisfies
/// `i < len` for the snapshot it was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Empty,
    Positioned(usize),
}

impl Cursor {
    /// Initial position for a freshly loaded snapshot.
    pub fn for_len(len: usize) -> Self {
        if len == 0 {
            Cursor::Empty
        } else {
            Cursor::Positioned(0)
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Cursor::Empty => None,
            Cursor::Positioned(idx) => Some(idx),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cursor::Empty)
    }

    /// Step back one record; stays put at the first record.
    pub fn previous(self) -> Self {
        match self {
            Cursor::Positioned(idx) if idx > 0 => Cursor::Positioned(idx - 1),
            other => other,
        }
    }

    /// Step forward one record; stays put at the last record.
    pub fn next(self, len: usize) -> Self {
        match self {
            Cursor::Positioned(idx) if idx + 1 < len => Cursor::Positioned(idx + 1),
            other => other,
        }
    }

    /// Re-validate against a snapshot of `len` records. Out-of-range positions
    /// clamp to the last record, an empty set empties the cursor, and a set
    /// that just became non-empty starts at the first record.
    pub fn clamp(self, len: usize) -> Self {
        match (self, len) {
            (_, 0) => Cursor::Empty,
            (Cursor::Empty, _) => Cursor::Positioned(0),
            (Cursor::Positioned(idx), len) => Cursor::Positioned(idx.min(len - 1)),
        }
    }

    /// Adjust after `removed_before` records ahead of the cursor were deleted
    /// and the snapshot now holds `len` records. Removing the current record
    /// keeps the same index, which now shows the following record.
    pub fn after_removal(self, removed_before: usize, len: usize) -> Self {
        match self {
            Cursor::Empty => Cursor::Empty.clamp(len),
            Cursor::Positioned(idx) => {
                Cursor::Positioned(idx.saturating_sub(removed_before)).clamp(len)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_depends_on_len() {
        assert_eq!(Cursor::for_len(0), Cursor::Empty);
        assert_eq!(Cursor::for_len(3), Cursor::Positioned(0));
    }

    #[test]
    fn previous_is_a_no_op_at_start() {
        assert_eq!(Cursor::Positioned(0).previous(), Cursor::Positioned(0));
        assert_eq!(Cursor::Positioned(2).previous(), Cursor::Positioned(1));
        assert_eq!(Cursor::Empty.previous(), Cursor::Empty);
    }

    #[test]
    fn next_is_a_no_op_at_end() {
        assert_eq!(Cursor::Positioned(2).next(3), Cursor::Positioned(2));
        assert_eq!(Cursor::Positioned(0).next(3), Cursor::Positioned(1));
        assert_eq!(Cursor::Empty.next(3), Cursor::Empty);
    }

    #[test]
    fn clamp_handles_growth_and_shrink() {
        assert_eq!(Cursor::Empty.clamp(1), Cursor::Positioned(0));
        assert_eq!(Cursor::Positioned(4).clamp(2), Cursor::Positioned(1));
        assert_eq!(Cursor::Positioned(1).clamp(0), Cursor::Empty);
        assert_eq!(Cursor::Positioned(1).clamp(5), Cursor::Positioned(1));
    }

    #[test]
    fn removing_last_index_clamps_down() {
        // [A, B, C] at C, C removed
        assert_eq!(Cursor::Positioned(2).after_removal(0, 2), Cursor::Positioned(1));
    }

    #[test]
    fn removing_only_record_empties() {
        assert_eq!(Cursor::Positioned(0).after_removal(0, 0), Cursor::Empty);
    }

    #[test]
    fn removing_middle_record_stays_in_place() {
        // [A, B, C] at B, B removed: index 1 now shows C
        assert_eq!(Cursor::Positioned(1).after_removal(0, 2), Cursor::Positioned(1));
    }

    #[test]
    fn removing_earlier_record_follows_current() {
        // [A, B, C] at C, A removed: C is now at index 1
        assert_eq!(Cursor::Positioned(2).after_removal(1, 2), Cursor::Positioned(1));
    }
}
