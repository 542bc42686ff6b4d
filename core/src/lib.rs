pub mod board;
pub mod client;
pub mod config;
pub mod interact;
pub mod logger;
pub mod playback;
pub mod protocol;

pub use board::{Board, BoardError, CellKind, CellMarks, CellPos, MarkKind};
pub use client::{ClientError, SolverClient};
pub use config::VizConfig;
pub use interact::Painter;
pub use logger::LogMessage;
pub use playback::Playback;
pub use protocol::{
    ComputeRequest, ComputeResponse, GenerateRequest, GenerateResponse, GeneratorKind, SolverKind,
};
