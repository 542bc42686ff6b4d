use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A grid position as `(row, column)`.
///
/// Serializes as a two-element array, matching the `[row, col]` pairs of the
/// wire protocol.
pub type CellPos = (usize, usize);

/// Errors produced by board operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("position {pos:?} is outside the {rows}x{columns} board")]
    OutOfBounds {
        pos: CellPos,
        rows: usize,
        columns: usize,
    },
    #[error("board dimensions must be at least 2x1 (got {rows}x{columns})")]
    DegenerateBoard { rows: usize, columns: usize },
    #[error("start and end cells must be distinct")]
    TerminalsCollide,
}

/// The persistent category of a cell. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Wall,
    Start,
    End,
}

/// A transient visualization mark. Marks are orthogonal to [`CellKind`]:
/// any combination of marks can sit on any category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Visited,
    Current,
    Solution,
}

impl MarkKind {
    /// All mark kinds, in no particular order.
    pub const ALL: [MarkKind; 3] = [MarkKind::Visited, MarkKind::Current, MarkKind::Solution];
}

/// The set of marks currently applied to one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMarks {
    pub visited: bool,
    pub current: bool,
    pub solution: bool,
}

impl CellMarks {
    pub fn is_empty(&self) -> bool {
        !(self.visited || self.current || self.solution)
    }

    pub fn has(&self, kind: MarkKind) -> bool {
        match kind {
            MarkKind::Visited => self.visited,
            MarkKind::Current => self.current,
            MarkKind::Solution => self.solution,
        }
    }

    pub fn set(&mut self, kind: MarkKind, on: bool) {
        match kind {
            MarkKind::Visited => self.visited = on,
            MarkKind::Current => self.current = on,
            MarkKind::Solution => self.solution = on,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cell {
    kind: Option<CellKindInner>,
    marks: CellMarks,
}

// Internal storage keeps Empty implicit so Default works per-cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKindInner {
    Wall,
    Start,
    End,
}

/// Immutable projection of the board handed to the request builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub start: CellPos,
    pub end: CellPos,
    pub rows: usize,
    pub columns: usize,
    /// Every wall position, duplicate-free. Order is unspecified.
    pub walls: Vec<CellPos>,
}

/// The authoritative grid state: a fixed-size matrix of cells, each with one
/// persistent category and an orthogonal set of visualization marks.
///
/// Invariants held for every reachable state:
/// - exactly one `Start` and one `End` cell exist, and they are distinct;
/// - categories are mutually exclusive per cell;
/// - mark operations never change categories, wall operations never change
///   marks, and neither touches the terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
    start: CellPos,
    end: CellPos,
}

impl Board {
    /// Creates a board with the terminals in the default layout: start in
    /// the top-left corner, end in the bottom-right.
    pub fn new(rows: usize, columns: usize) -> Result<Self, BoardError> {
        Self::with_terminals(rows, columns, (0, 0), (rows.wrapping_sub(1), columns.wrapping_sub(1)))
    }

    /// Creates a board with explicit terminal placement.
    pub fn with_terminals(
        rows: usize,
        columns: usize,
        start: CellPos,
        end: CellPos,
    ) -> Result<Self, BoardError> {
        if rows == 0 || columns == 0 || rows * columns < 2 {
            return Err(BoardError::DegenerateBoard { rows, columns });
        }
        if start == end {
            return Err(BoardError::TerminalsCollide);
        }
        let mut board = Board {
            rows,
            columns,
            cells: vec![Cell::default(); rows * columns],
            start,
            end,
        };
        board.check_bounds(start)?;
        board.check_bounds(end)?;
        board.cell_mut(start).kind = Some(CellKindInner::Start);
        board.cell_mut(end).kind = Some(CellKindInner::End);
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn start(&self) -> CellPos {
        self.start
    }

    pub fn end(&self) -> CellPos {
        self.end
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.0 < self.rows && pos.1 < self.columns
    }

    fn check_bounds(&self, pos: CellPos) -> Result<(), BoardError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                pos,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    fn index(&self, pos: CellPos) -> usize {
        pos.0 * self.columns + pos.1
    }

    fn cell(&self, pos: CellPos) -> &Cell {
        &self.cells[self.index(pos)]
    }

    fn cell_mut(&mut self, pos: CellPos) -> &mut Cell {
        let idx = self.index(pos);
        &mut self.cells[idx]
    }

    /// The persistent category at `pos`.
    pub fn kind_of(&self, pos: CellPos) -> Result<CellKind, BoardError> {
        self.check_bounds(pos)?;
        Ok(match self.cell(pos).kind {
            None => CellKind::Empty,
            Some(CellKindInner::Wall) => CellKind::Wall,
            Some(CellKindInner::Start) => CellKind::Start,
            Some(CellKindInner::End) => CellKind::End,
        })
    }

    /// The visualization marks at `pos`.
    pub fn marks_of(&self, pos: CellPos) -> Result<CellMarks, BoardError> {
        self.check_bounds(pos)?;
        Ok(self.cell(pos).marks)
    }

    /// Sets the persistent category at `pos`, clearing whatever category the
    /// cell held before.
    ///
    /// Setting `Start` or `End` while another cell already holds that
    /// category is a no-op: terminal uniqueness wins over the request. Use
    /// [`Board::relocate_start`] / [`Board::relocate_end`] to move a
    /// terminal on purpose.
    pub fn set_kind(&mut self, pos: CellPos, kind: CellKind) -> Result<(), BoardError> {
        self.check_bounds(pos)?;
        let inner = match kind {
            CellKind::Empty => None,
            CellKind::Wall => Some(CellKindInner::Wall),
            CellKind::Start => {
                if self.start != pos {
                    return Ok(());
                }
                Some(CellKindInner::Start)
            }
            CellKind::End => {
                if self.end != pos {
                    return Ok(());
                }
                Some(CellKindInner::End)
            }
        };
        // Demoting a terminal to empty/wall would break uniqueness.
        if pos == self.start || pos == self.end {
            if matches!(inner, Some(CellKindInner::Wall) | None) {
                return Ok(());
            }
        }
        self.cell_mut(pos).kind = inner;
        Ok(())
    }

    /// Moves the start cell to `pos`; the previous start becomes empty.
    /// Rejects landing on the end cell.
    pub fn relocate_start(&mut self, pos: CellPos) -> Result<(), BoardError> {
        self.check_bounds(pos)?;
        if pos == self.end {
            return Err(BoardError::TerminalsCollide);
        }
        let old = self.start;
        self.cell_mut(old).kind = None;
        self.start = pos;
        self.cell_mut(pos).kind = Some(CellKindInner::Start);
        Ok(())
    }

    /// Moves the end cell to `pos`; the previous end becomes empty.
    /// Rejects landing on the start cell.
    pub fn relocate_end(&mut self, pos: CellPos) -> Result<(), BoardError> {
        self.check_bounds(pos)?;
        if pos == self.start {
            return Err(BoardError::TerminalsCollide);
        }
        let old = self.end;
        self.cell_mut(old).kind = None;
        self.end = pos;
        self.cell_mut(pos).kind = Some(CellKindInner::End);
        Ok(())
    }

    /// Flips a cell between empty and wall. Terminals are left untouched.
    ///
    /// Returns whether the cell holds a wall afterwards, which is what a
    /// paint stroke records as its value.
    pub fn toggle_wall(&mut self, pos: CellPos) -> Result<bool, BoardError> {
        self.check_bounds(pos)?;
        let cell = self.cell_mut(pos);
        match cell.kind {
            None => {
                cell.kind = Some(CellKindInner::Wall);
                Ok(true)
            }
            Some(CellKindInner::Wall) => {
                cell.kind = None;
                Ok(false)
            }
            Some(CellKindInner::Start) | Some(CellKindInner::End) => Ok(false),
        }
    }

    /// Idempotent wall assignment used during drag-paint. Re-applying the
    /// same value any number of times is a no-op; terminals are never
    /// converted.
    pub fn set_wall(&mut self, pos: CellPos, present: bool) -> Result<(), BoardError> {
        self.check_bounds(pos)?;
        let cell = self.cell_mut(pos);
        match cell.kind {
            Some(CellKindInner::Start) | Some(CellKindInner::End) => Ok(()),
            _ => {
                cell.kind = present.then_some(CellKindInner::Wall);
                Ok(())
            }
        }
    }

    /// Applies generated maze walls onto currently-empty cells. Cells
    /// holding `Start`/`End` (or an existing wall) are skipped rather than
    /// overwritten; out-of-range positions are an error and leave the board
    /// unchanged.
    pub fn apply_walls<I>(&mut self, walls: I) -> Result<(), BoardError>
    where
        I: IntoIterator<Item = CellPos>,
    {
        let walls: Vec<CellPos> = walls.into_iter().collect();
        for &pos in &walls {
            self.check_bounds(pos)?;
        }
        for pos in walls {
            let cell = self.cell_mut(pos);
            if cell.kind.is_none() {
                cell.kind = Some(CellKindInner::Wall);
            }
        }
        Ok(())
    }

    /// Removes the given mark kinds from every cell. Categories are never
    /// affected.
    pub fn clear_marks(&mut self, kinds: &[MarkKind]) {
        for cell in &mut self.cells {
            for &kind in kinds {
                cell.marks.set(kind, false);
            }
        }
    }

    /// Applies or removes a single mark on one cell.
    pub fn set_mark(&mut self, pos: CellPos, kind: MarkKind, on: bool) -> Result<(), BoardError> {
        self.check_bounds(pos)?;
        self.cell_mut(pos).marks.set(kind, on);
        Ok(())
    }

    /// Resets every wall cell to empty. Terminals and marks are untouched.
    pub fn clear_walls(&mut self) {
        for cell in &mut self.cells {
            if cell.kind == Some(CellKindInner::Wall) {
                cell.kind = None;
            }
        }
    }

    /// Immutable view for the request builder.
    pub fn snapshot(&self) -> BoardSnapshot {
        let walls = self
            .iter_positions()
            .filter(|&pos| self.cell(pos).kind == Some(CellKindInner::Wall))
            .collect();
        BoardSnapshot {
            start: self.start,
            end: self.end,
            rows: self.rows,
            columns: self.columns,
            walls,
        }
    }

    /// All positions in row-major order.
    pub fn iter_positions(&self) -> impl Iterator<Item = CellPos> + use<> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |r| (0..columns).map(move |c| (r, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(3, 3).unwrap()
    }

    #[test]
    fn terminals_are_placed_at_corners() {
        let b = board();
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Start);
        assert_eq!(b.kind_of((2, 2)).unwrap(), CellKind::End);
    }

    #[test]
    fn rejects_degenerate_and_colliding_boards() {
        assert!(matches!(
            Board::new(0, 5),
            Err(BoardError::DegenerateBoard { .. })
        ));
        assert!(matches!(
            Board::new(1, 1),
            Err(BoardError::DegenerateBoard { .. })
        ));
        assert_eq!(
            Board::with_terminals(3, 3, (1, 1), (1, 1)),
            Err(BoardError::TerminalsCollide)
        );
    }

    #[test]
    fn out_of_bounds_is_reported_with_context() {
        let mut b = board();
        let err = b.toggle_wall((3, 0)).unwrap_err();
        assert_eq!(
            err,
            BoardError::OutOfBounds {
                pos: (3, 0),
                rows: 3,
                columns: 3
            }
        );
    }

    #[test]
    fn toggle_wall_round_trips_on_empty_cells() {
        let mut b = board();
        assert!(b.toggle_wall((1, 1)).unwrap());
        assert_eq!(b.kind_of((1, 1)).unwrap(), CellKind::Wall);
        assert!(!b.toggle_wall((1, 1)).unwrap());
        assert_eq!(b.kind_of((1, 1)).unwrap(), CellKind::Empty);
    }

    #[test]
    fn toggle_and_set_wall_leave_terminals_alone() {
        let mut b = board();
        assert!(!b.toggle_wall((0, 0)).unwrap());
        b.set_wall((2, 2), true).unwrap();
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Start);
        assert_eq!(b.kind_of((2, 2)).unwrap(), CellKind::End);
    }

    #[test]
    fn set_wall_is_idempotent() {
        let mut b = board();
        for _ in 0..3 {
            b.set_wall((0, 1), true).unwrap();
        }
        assert_eq!(b.kind_of((0, 1)).unwrap(), CellKind::Wall);
        for _ in 0..3 {
            b.set_wall((0, 1), false).unwrap();
        }
        assert_eq!(b.kind_of((0, 1)).unwrap(), CellKind::Empty);
    }

    #[test]
    fn set_kind_refuses_a_second_terminal() {
        let mut b = board();
        b.set_kind((1, 1), CellKind::Start).unwrap();
        assert_eq!(b.kind_of((1, 1)).unwrap(), CellKind::Empty);
        assert_eq!(b.start(), (0, 0));

        // Demoting a terminal cell is equally refused.
        b.set_kind((0, 0), CellKind::Empty).unwrap();
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Start);
    }

    #[test]
    fn relocation_moves_exactly_one_terminal() {
        let mut b = board();
        b.relocate_start((1, 0)).unwrap();
        assert_eq!(b.start(), (1, 0));
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Empty);
        assert_eq!(b.kind_of((1, 0)).unwrap(), CellKind::Start);
        assert_eq!(
            b.relocate_start((2, 2)),
            Err(BoardError::TerminalsCollide)
        );
    }

    #[test]
    fn clear_marks_never_changes_categories() {
        let mut b = board();
        b.set_wall((1, 2), true).unwrap();
        for pos in [(0, 0), (1, 2), (2, 0)] {
            b.set_mark(pos, MarkKind::Visited, true).unwrap();
            b.set_mark(pos, MarkKind::Solution, true).unwrap();
        }
        b.clear_marks(&MarkKind::ALL);
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Start);
        assert_eq!(b.kind_of((1, 2)).unwrap(), CellKind::Wall);
        assert!(b.marks_of((1, 2)).unwrap().is_empty());
    }

    #[test]
    fn clear_walls_preserves_terminals_and_marks() {
        let mut b = board();
        b.set_wall((0, 1), true).unwrap();
        b.set_mark((0, 1), MarkKind::Visited, true).unwrap();
        b.clear_walls();
        assert_eq!(b.kind_of((0, 1)).unwrap(), CellKind::Empty);
        assert!(b.marks_of((0, 1)).unwrap().visited);
        assert_eq!(b.start(), (0, 0));
        assert_eq!(b.end(), (2, 2));
    }

    #[test]
    fn snapshot_lists_walls_without_duplicates() {
        let mut b = board();
        b.set_wall((1, 0), true).unwrap();
        b.set_wall((1, 1), true).unwrap();
        b.set_wall((1, 1), true).unwrap();
        let snap = b.snapshot();
        let mut walls = snap.walls.clone();
        walls.sort();
        walls.dedup();
        assert_eq!(walls.len(), snap.walls.len());
        assert_eq!(walls, vec![(1, 0), (1, 1)]);
        assert_eq!((snap.start, snap.end), ((0, 0), (2, 2)));
    }

    #[test]
    fn apply_walls_skips_terminals_and_rejects_out_of_range() {
        let mut b = board();
        b.apply_walls([(0, 0), (0, 1), (2, 2)]).unwrap();
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Start);
        assert_eq!(b.kind_of((0, 1)).unwrap(), CellKind::Wall);
        assert_eq!(b.kind_of((2, 2)).unwrap(), CellKind::End);

        let before = b.snapshot();
        assert!(b.apply_walls([(1, 1), (9, 9)]).is_err());
        assert_eq!(b.snapshot(), before);
    }
}
