use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::board::{Board, BoardError, CellPos, MarkKind};

/// What a single timed entry does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Advance the visit front: the previous cell goes `visited`, this one
    /// becomes `current`.
    Step(CellPos),
    /// Promote a cell to the final path: `visited`/`current` come off,
    /// `solution` goes on.
    Solution(CellPos),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    generation: u64,
    due: Instant,
    action: Action,
}

/// Timed replay of a computed step sequence over the board's visualization
/// marks.
///
/// Every call to [`Playback::play`] advances a generation counter and tags
/// the entries it queues with it. Entries are only applied when they come
/// due *and* still belong to the current generation; anything older is
/// discarded at fire time. That staleness check is the entire cancellation
/// mechanism: nothing ever needs to reach into a timer and abort it, which
/// keeps the scheduler portable across driving substrates (here: the UI
/// tick).
///
/// Time is passed in explicitly, so replays are deterministic under test.
#[derive(Debug)]
pub struct Playback {
    step_interval: Duration,
    generation: u64,
    queue: VecDeque<Entry>,
    last_current: Option<CellPos>,
}

impl Playback {
    pub fn new(step_interval: Duration) -> Self {
        Playback {
            step_interval,
            generation: 0,
            queue: VecDeque::new(),
            last_current: None,
        }
    }

    /// The generation currently allowed to mutate marks. Mostly useful for
    /// diagnostics.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether nothing from the current generation is left to fire.
    pub fn is_idle(&self) -> bool {
        self.queue.iter().all(|e| e.generation != self.generation)
    }

    /// Starts a replay from the first step, superseding any replay still in
    /// flight. Previous `visited`/`current` marks are cleared up front
    /// (walls and any lingering `solution` marks are not; `stop` clears
    /// those). Steps are scheduled at offsets `i × step_interval` from
    /// `now`, and the solution timeline continues where the steps end.
    ///
    /// Positions are bounds-checked before anything is queued so a late
    /// entry can never fail mid-animation.
    pub fn play(
        &mut self,
        board: &mut Board,
        steps: &[CellPos],
        solution: Option<&[CellPos]>,
        now: Instant,
    ) -> Result<(), BoardError> {
        for &pos in steps.iter().chain(solution.into_iter().flatten()) {
            if !board.contains(pos) {
                return Err(BoardError::OutOfBounds {
                    pos,
                    rows: board.rows(),
                    columns: board.columns(),
                });
            }
        }

        self.generation += 1;
        self.last_current = None;
        board.clear_marks(&[MarkKind::Visited, MarkKind::Current]);

        // Superseded entries stay queued; they are recognized as stale when
        // they come due.
        let actions = steps
            .iter()
            .map(|&pos| Action::Step(pos))
            .chain(
                solution
                    .into_iter()
                    .flatten()
                    .map(|&pos| Action::Solution(pos)),
            );
        for (index, action) in actions.enumerate() {
            self.queue.push_back(Entry {
                generation: self.generation,
                due: now + self.step_interval * index as u32,
                action,
            });
        }
        Ok(())
    }

    /// Fires every entry that has come due. Entries from superseded
    /// generations are dropped without touching the board.
    pub fn tick(&mut self, board: &mut Board, now: Instant) {
        let mut index = 0;
        while index < self.queue.len() {
            if self.queue[index].due > now {
                index += 1;
                continue;
            }
            if let Some(entry) = self.queue.remove(index) {
                if entry.generation == self.generation {
                    self.fire(board, entry.action);
                }
            }
        }
    }

    /// Invalidates everything pending and clears all visualization marks
    /// immediately.
    pub fn stop(&mut self, board: &mut Board) {
        self.generation += 1;
        self.last_current = None;
        board.clear_marks(&MarkKind::ALL);
    }

    fn fire(&mut self, board: &mut Board, action: Action) {
        // Positions were checked in play(), so these cannot miss.
        match action {
            Action::Step(pos) => {
                if let Some(prev) = self.last_current.take() {
                    let _ = board.set_mark(prev, MarkKind::Current, false);
                    let _ = board.set_mark(prev, MarkKind::Visited, true);
                }
                let _ = board.set_mark(pos, MarkKind::Current, true);
                self.last_current = Some(pos);
            }
            Action::Solution(pos) => {
                let _ = board.set_mark(pos, MarkKind::Visited, false);
                let _ = board.set_mark(pos, MarkKind::Current, false);
                let _ = board.set_mark(pos, MarkKind::Solution, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CellMarks;

    const STEP: Duration = Duration::from_millis(10);

    fn board() -> Board {
        Board::new(3, 3).unwrap()
    }

    fn marks(board: &Board, pos: CellPos) -> CellMarks {
        board.marks_of(pos).unwrap()
    }

    fn after(t0: Instant, steps: u32) -> Instant {
        t0 + STEP * steps + Duration::from_millis(1)
    }

    #[test]
    fn full_replay_without_solution() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        let steps = [(0, 0), (0, 1), (1, 1), (2, 1), (2, 2)];
        p.play(&mut b, &steps, None, t0).unwrap();
        p.tick(&mut b, after(t0, 5));

        for pos in [(0, 0), (0, 1), (1, 1), (2, 1)] {
            assert!(marks(&b, pos).visited, "{pos:?} should be visited");
            assert!(!marks(&b, pos).current);
        }
        assert!(marks(&b, (2, 2)).current);
        assert!(!marks(&b, (2, 2)).visited);
        for pos in b.iter_positions().collect::<Vec<_>>() {
            assert!(!marks(&b, pos).solution);
        }
        assert!(p.is_idle());
    }

    #[test]
    fn solution_cells_shed_visited_and_current() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        let steps = [(0, 0), (0, 1), (1, 1), (2, 1), (2, 2)];
        let solution = [(0, 0), (1, 1), (2, 2)];
        p.play(&mut b, &steps, Some(&solution), t0).unwrap();
        p.tick(&mut b, after(t0, 8));

        for pos in solution {
            let m = marks(&b, pos);
            assert!(m.solution, "{pos:?} should be on the path");
            assert!(!m.visited && !m.current, "{pos:?} should carry only solution");
        }
        // Dead-end visits stay marked.
        assert!(marks(&b, (0, 1)).visited);
        assert!(marks(&b, (2, 1)).visited);
    }

    #[test]
    fn steps_fire_in_sequence_order_under_a_coarse_tick() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        // If the two entries fired out of order, (1, 0) would end up
        // current and (2, 0) visited.
        p.play(&mut b, &[(1, 0), (2, 0)], None, t0).unwrap();
        p.tick(&mut b, after(t0, 2));
        assert!(marks(&b, (1, 0)).visited);
        assert!(marks(&b, (2, 0)).current);
    }

    #[test]
    fn solution_begins_only_after_the_last_step_offset() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        p.play(&mut b, &[(0, 1), (1, 1)], Some(&[(2, 2)]), t0).unwrap();

        // Both steps due, solution not yet.
        p.tick(&mut b, after(t0, 1));
        assert!(marks(&b, (1, 1)).current);
        assert!(!marks(&b, (2, 2)).solution);

        p.tick(&mut b, after(t0, 2));
        assert!(marks(&b, (2, 2)).solution);
    }

    #[test]
    fn replay_supersedes_pending_entries() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        p.play(&mut b, &[(0, 1), (1, 1), (2, 1)], None, t0).unwrap();
        // First step of the first run lands.
        p.tick(&mut b, after(t0, 0));
        assert!(marks(&b, (0, 1)).current);

        // Second run starts before the first finishes.
        let t1 = after(t0, 0);
        p.play(&mut b, &[(1, 0), (2, 0)], None, t1).unwrap();
        assert!(marks(&b, (0, 1)).is_empty(), "play clears visited/current");

        // Far in the future every entry from both runs is due; only the
        // second run's may land.
        p.tick(&mut b, after(t1, 10));
        assert!(marks(&b, (0, 1)).is_empty());
        assert!(marks(&b, (1, 1)).is_empty());
        assert!(marks(&b, (2, 1)).is_empty());
        assert!(marks(&b, (1, 0)).visited);
        assert!(marks(&b, (2, 0)).current);
    }

    #[test]
    fn stop_clears_marks_and_suppresses_the_rest() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        p.play(&mut b, &[(0, 1), (1, 1)], Some(&[(2, 2)]), t0).unwrap();
        p.tick(&mut b, after(t0, 0));
        assert!(marks(&b, (0, 1)).current);

        p.stop(&mut b);
        for pos in b.iter_positions().collect::<Vec<_>>() {
            assert!(marks(&b, pos).is_empty());
        }

        p.tick(&mut b, after(t0, 10));
        for pos in b.iter_positions().collect::<Vec<_>>() {
            assert!(marks(&b, pos).is_empty(), "stale entry mutated {pos:?}");
        }
        assert!(p.is_idle());
    }

    #[test]
    fn play_rejects_out_of_range_positions_up_front() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        let err = p.play(&mut b, &[(0, 1), (3, 3)], None, t0).unwrap_err();
        assert!(matches!(err, BoardError::OutOfBounds { pos: (3, 3), .. }));
        // Nothing was scheduled.
        p.tick(&mut b, after(t0, 10));
        assert!(marks(&b, (0, 1)).is_empty());
    }

    #[test]
    fn empty_step_list_still_clears_previous_marks() {
        let mut b = board();
        let mut p = Playback::new(STEP);
        let t0 = Instant::now();
        p.play(&mut b, &[(1, 1)], None, t0).unwrap();
        p.tick(&mut b, after(t0, 1));
        assert!(marks(&b, (1, 1)).current);

        p.play(&mut b, &[], None, after(t0, 1)).unwrap();
        assert!(marks(&b, (1, 1)).is_empty());
        assert!(p.is_idle());
    }
}
