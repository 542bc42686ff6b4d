use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::board::{Board, CellPos};

/// Identifier of a remote pathfinding algorithm.
///
/// The wire ids are the ones the solver service dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    #[serde(rename = "BFS")]
    Bfs,
    #[serde(rename = "DFS")]
    Dfs,
    #[serde(rename = "Astar")]
    AStar,
}

impl SolverKind {
    pub fn wire_id(&self) -> &'static str {
        match self {
            SolverKind::Bfs => "BFS",
            SolverKind::Dfs => "DFS",
            SolverKind::AStar => "Astar",
        }
    }
}

impl Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_id())
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(SolverKind::Bfs),
            "dfs" => Ok(SolverKind::Dfs),
            "astar" | "a*" => Ok(SolverKind::AStar),
            other => Err(format!("unknown solver '{other}' (expected BFS, DFS or Astar)")),
        }
    }
}

/// Identifier of a remote maze generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorKind {
    #[serde(rename = "Backtracker")]
    Backtracker,
    #[serde(rename = "Division")]
    Division,
}

impl GeneratorKind {
    pub fn wire_id(&self) -> &'static str {
        match self {
            GeneratorKind::Backtracker => "Backtracker",
            GeneratorKind::Division => "Division",
        }
    }
}

impl Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_id())
    }
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backtracker" => Ok(GeneratorKind::Backtracker),
            "division" => Ok(GeneratorKind::Division),
            other => Err(format!(
                "unknown generator '{other}' (expected Backtracker or Division)"
            )),
        }
    }
}

/// Payload of a pathfinding request, shaped exactly like the service's wire
/// contract (hyphenated keys, `[row, col]` pairs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeRequest {
    #[serde(rename = "start-cell")]
    pub start_cell: CellPos,
    #[serde(rename = "end-cell")]
    pub end_cell: CellPos,
    pub walls: Vec<CellPos>,
    pub rows: usize,
    pub columns: usize,
    pub algorithm: SolverKind,
}

impl ComputeRequest {
    /// Pure projection of the board into the wire format. Wall order is
    /// whatever the snapshot yields; the set is duplicate-free.
    pub fn from_board(board: &Board, algorithm: SolverKind) -> Self {
        let snap = board.snapshot();
        ComputeRequest {
            start_cell: snap.start,
            end_cell: snap.end,
            walls: snap.walls,
            rows: snap.rows,
            columns: snap.columns,
            algorithm,
        }
    }
}

/// Payload of a maze-generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub rows: usize,
    pub columns: usize,
    pub algorithm: GeneratorKind,
}

impl GenerateRequest {
    pub fn new(rows: usize, columns: usize, algorithm: GeneratorKind) -> Self {
        GenerateRequest {
            rows,
            columns,
            algorithm,
        }
    }
}

/// Response of the pathfinding service: the visit order, plus the final path
/// when one exists. The service reports "no path" as `null`, a missing
/// field, or an empty list depending on the algorithm; all three normalize
/// to `None` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub steps: Vec<CellPos>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub solution: Option<Vec<CellPos>>,
}

/// Response of the maze-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub walls: Vec<CellPos>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Vec<CellPos>>, D::Error>
where
    D: Deserializer<'de>,
{
    let cells: Option<Vec<CellPos>> = Option::deserialize(deserializer)?;
    Ok(cells.filter(|c| !c.is_empty()))
}

fn in_bounds(pos: CellPos, rows: usize, columns: usize) -> bool {
    pos.0 < rows && pos.1 < columns
}

impl ComputeResponse {
    /// Structural validation against the grid the request was built from.
    /// Any out-of-range position means the whole response is unusable.
    pub fn validate(&self, rows: usize, columns: usize) -> Result<(), String> {
        for &pos in &self.steps {
            if !in_bounds(pos, rows, columns) {
                return Err(format!("step position {pos:?} outside {rows}x{columns} grid"));
            }
        }
        for &pos in self.solution.iter().flatten() {
            if !in_bounds(pos, rows, columns) {
                return Err(format!(
                    "solution position {pos:?} outside {rows}x{columns} grid"
                ));
            }
        }
        Ok(())
    }
}

impl GenerateResponse {
    pub fn validate(&self, rows: usize, columns: usize) -> Result<(), String> {
        for &pos in &self.walls {
            if !in_bounds(pos, rows, columns) {
                return Err(format!("wall position {pos:?} outside {rows}x{columns} grid"));
            }
        }
        Ok(())
    }
}
