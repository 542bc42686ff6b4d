use crate::board::{Board, BoardError, CellPos};

/// One pointer-down-to-pointer-up paint gesture. The wall value imposed on
/// every cell the pointer crosses is fixed when the stroke starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintStroke {
    pub paint_walls: bool,
}

/// Translates raw pointer events into board mutations.
///
/// A two-state machine per pointer device: `Idle` until a pointer-down lands
/// on a grid cell, `Painting` until the button is released anywhere. While
/// painting, every cell-boundary crossing applies the stroke's wall value
/// idempotently, so crossing the same boundary repeatedly is harmless.
///
/// Start/end cells are never converted by painting; the board enforces that
/// below this layer.
#[derive(Debug, Default)]
pub struct Painter {
    stroke: Option<PaintStroke>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stroke is currently in progress.
    pub fn is_painting(&self) -> bool {
        self.stroke.is_some()
    }

    /// The active stroke, if any.
    pub fn stroke(&self) -> Option<PaintStroke> {
        self.stroke
    }

    /// Pointer-down on a grid cell: toggles that cell's wall and records the
    /// outcome as the stroke value.
    ///
    /// A repeated pointer-down while already painting (possible when the
    /// terminal drops a release event) restarts the stroke rather than
    /// stacking a second one.
    pub fn pointer_down(&mut self, board: &mut Board, pos: CellPos) -> Result<(), BoardError> {
        let paint_walls = board.toggle_wall(pos)?;
        self.stroke = Some(PaintStroke { paint_walls });
        Ok(())
    }

    /// Pointer entered a new cell while the button is held. Outside a stroke
    /// this is a plain hover and does nothing.
    pub fn pointer_enter(&mut self, board: &mut Board, pos: CellPos) -> Result<(), BoardError> {
        if let Some(stroke) = self.stroke {
            board.set_wall(pos, stroke.paint_walls)?;
        }
        Ok(())
    }

    /// Pointer released, wherever that happened: unconditionally back to
    /// idle. Observed globally so a release outside the grid can never leave
    /// the stroke stuck on.
    pub fn pointer_up(&mut self) {
        self.stroke = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CellKind;

    fn board() -> Board {
        Board::new(4, 4).unwrap()
    }

    #[test]
    fn down_on_empty_cell_starts_a_wall_stroke() {
        let mut b = board();
        let mut p = Painter::new();
        p.pointer_down(&mut b, (1, 1)).unwrap();
        assert_eq!(b.kind_of((1, 1)).unwrap(), CellKind::Wall);
        assert_eq!(p.stroke(), Some(PaintStroke { paint_walls: true }));
    }

    #[test]
    fn down_on_wall_cell_starts_an_erase_stroke() {
        let mut b = board();
        b.set_wall((1, 1), true).unwrap();
        b.set_wall((1, 2), true).unwrap();
        let mut p = Painter::new();
        p.pointer_down(&mut b, (1, 1)).unwrap();
        assert_eq!(p.stroke(), Some(PaintStroke { paint_walls: false }));
        p.pointer_enter(&mut b, (1, 2)).unwrap();
        assert_eq!(b.kind_of((1, 2)).unwrap(), CellKind::Empty);
    }

    #[test]
    fn recrossing_a_cell_is_idempotent() {
        let mut b = board();
        let mut p = Painter::new();
        p.pointer_down(&mut b, (0, 1)).unwrap();
        for _ in 0..4 {
            p.pointer_enter(&mut b, (0, 2)).unwrap();
            p.pointer_enter(&mut b, (0, 1)).unwrap();
        }
        assert_eq!(b.kind_of((0, 1)).unwrap(), CellKind::Wall);
        assert_eq!(b.kind_of((0, 2)).unwrap(), CellKind::Wall);
    }

    #[test]
    fn enter_without_a_stroke_is_a_hover() {
        let mut b = board();
        let mut p = Painter::new();
        p.pointer_enter(&mut b, (2, 2)).unwrap();
        assert_eq!(b.kind_of((2, 2)).unwrap(), CellKind::Empty);
    }

    #[test]
    fn release_ends_the_stroke_even_off_grid() {
        let mut b = board();
        let mut p = Painter::new();
        p.pointer_down(&mut b, (1, 1)).unwrap();
        assert!(p.is_painting());
        // Release arrives with no grid position at all.
        p.pointer_up();
        assert!(!p.is_painting());
        p.pointer_enter(&mut b, (1, 2)).unwrap();
        assert_eq!(b.kind_of((1, 2)).unwrap(), CellKind::Empty);
    }

    #[test]
    fn terminals_survive_a_stroke_dragged_across_them() {
        let mut b = board();
        let mut p = Painter::new();
        p.pointer_down(&mut b, (0, 1)).unwrap();
        p.pointer_enter(&mut b, (0, 0)).unwrap();
        p.pointer_enter(&mut b, (3, 3)).unwrap();
        assert_eq!(b.kind_of((0, 0)).unwrap(), CellKind::Start);
        assert_eq!(b.kind_of((3, 3)).unwrap(), CellKind::End);
    }

    #[test]
    fn stroke_starting_on_a_terminal_erases() {
        let mut b = board();
        b.set_wall((0, 1), true).unwrap();
        let mut p = Painter::new();
        p.pointer_down(&mut b, (0, 0)).unwrap();
        assert_eq!(p.stroke(), Some(PaintStroke { paint_walls: false }));
        p.pointer_enter(&mut b, (0, 1)).unwrap();
        assert_eq!(b.kind_of((0, 1)).unwrap(), CellKind::Empty);
    }
}
