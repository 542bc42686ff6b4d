use std::collections::VecDeque;
use std::time::Instant;

use crate::event::{AppEvent, Event, EventHandler};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use pathviz_core::{
    Board, CellPos, ComputeRequest, GenerateRequest, GeneratorKind, LogMessage, Painter, Playback,
    SolverClient, SolverKind, VizConfig, log_debug, log_info, log_warn,
};
use ratatui::{DefaultTerminal, layout::Rect};
use tokio::runtime::Handle;

/// Maximum number of log entries to keep.
const MAX_LOGS: usize = 100;

/// Tone of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Positive,
    Negative,
}

#[derive(Debug, Clone)]
pub struct Status {
    pub tone: Tone,
    pub text: String,
}

/// Application.
pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: VizConfig,
    pub board: Board,
    pub solver: SolverKind,
    pub generator: GeneratorKind,
    pub status: Option<Status>,
    pub logs: VecDeque<LogMessage>,
    pub show_logs: bool,
    /// Screen rectangle the grid cells occupied at the last draw; the mouse
    /// hit-test reads it back.
    pub grid_area: Rect,
    /// Label of the request currently in flight, for the header.
    pub in_flight: Option<String>,
    painter: Painter,
    playback: Playback,
    client: SolverClient,
    runtime: Handle,
    request_seq: u64,
}

impl App {
    /// Constructs a new instance of [`App`].
    pub fn new(
        config: VizConfig,
        runtime: Handle,
        log_rx: crossbeam_channel::Receiver<LogMessage>,
    ) -> color_eyre::Result<Self> {
        let board = Board::new(config.rows, config.columns)?;
        let client = SolverClient::new(config.server_addr.clone(), config.request_timeout());
        let playback = Playback::new(config.step_interval());
        Ok(App {
            running: false,
            events: EventHandler::new(log_rx),
            solver: config.solver,
            generator: config.generator,
            status: None,
            logs: VecDeque::new(),
            show_logs: false,
            grid_area: Rect::default(),
            in_flight: None,
            painter: Painter::new(),
            playback,
            client,
            runtime,
            board,
            config,
            request_seq: 0,
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        log_info!(
            "pathviz started: {}x{} grid, solver service at {}",
            self.config.rows,
            self.config.columns,
            self.client.server_addr()
        );
        while self.running {
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            self.handle_events()?;
        }
        Ok(())
    }

    pub fn handle_events(&mut self) -> color_eyre::Result<()> {
        match self.events.next()? {
            Event::Tick => self.tick(),
            Event::Crossterm(event) => match event {
                crossterm::event::Event::Key(key_event)
                    if key_event.kind == KeyEventKind::Press =>
                {
                    self.handle_key_event(key_event)
                }
                crossterm::event::Event::Mouse(mouse_event) => {
                    self.handle_mouse_event(mouse_event)
                }
                _ => {}
            },
            Event::App(app_event) => self.handle_app_event(app_event)?,
            Event::Log(message) => self.push_log(message),
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            KeyCode::Char('c' | 'C') if key_event.modifiers == KeyModifiers::CONTROL => {
                self.events.send(AppEvent::Quit)
            }
            KeyCode::Char('r') => self.events.send(AppEvent::Run),
            KeyCode::Char('m') => self.events.send(AppEvent::Generate),
            KeyCode::Char('c') => self.events.send(AppEvent::Clear { walls: false }),
            KeyCode::Char('C') => self.events.send(AppEvent::Clear { walls: true }),
            KeyCode::Char('1') => self.events.send(AppEvent::SelectSolver(SolverKind::Bfs)),
            KeyCode::Char('2') => self.events.send(AppEvent::SelectSolver(SolverKind::Dfs)),
            KeyCode::Char('3') => self.events.send(AppEvent::SelectSolver(SolverKind::AStar)),
            KeyCode::Char('l') => self.events.send(AppEvent::ToggleLogs),
            _ => {}
        }
    }

    /// Routes pointer input to the paint state machine. The release is
    /// handled wherever it happens, on or off the grid, so a stroke can
    /// never get stuck.
    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(pos) = self.cell_at(mouse_event.column, mouse_event.row) {
                    if let Err(err) = self.painter.pointer_down(&mut self.board, pos) {
                        log_warn!("paint rejected: {err}");
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(pos) = self.cell_at(mouse_event.column, mouse_event.row) {
                    if let Err(err) = self.painter.pointer_enter(&mut self.board, pos) {
                        log_warn!("paint rejected: {err}");
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.painter.pointer_up(),
            _ => {}
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) -> color_eyre::Result<()> {
        match event {
            AppEvent::Run => self.start_compute(),
            AppEvent::Generate => self.start_generate(),
            AppEvent::Clear { walls } => {
                self.playback.stop(&mut self.board);
                if walls {
                    self.board.clear_walls();
                    self.set_status(Tone::Info, "cleared walls and visualization");
                } else {
                    self.set_status(Tone::Info, "cleared visualization");
                }
            }
            AppEvent::SelectSolver(kind) => {
                self.solver = kind;
                self.set_status(Tone::Info, format!("solver: {kind}"));
            }
            AppEvent::ComputeDone { seq, result } => self.finish_compute(seq, result),
            AppEvent::GenerateDone { seq, result } => self.finish_generate(seq, result),
            AppEvent::ToggleLogs => self.show_logs = !self.show_logs,
            AppEvent::Quit => self.quit(),
        }
        Ok(())
    }

    /// Ships the current board to the solver service. A run started while a
    /// previous one is still in flight supersedes it: the old completion
    /// arrives with a stale sequence number and is dropped.
    fn start_compute(&mut self) {
        self.request_seq += 1;
        let seq = self.request_seq;
        let request = ComputeRequest::from_board(&self.board, self.solver);
        let client = self.client.clone();
        let sender = self.events.sender();
        self.in_flight = Some(self.solver.to_string());
        self.set_status(Tone::Info, format!("running {}...", self.solver));
        log_debug!("compute #{seq}: {} walls", request.walls.len());
        self.runtime.spawn(async move {
            let result = client.compute(&request).await;
            let _ = sender.send(AppEvent::ComputeDone { seq, result }.into());
        });
    }

    fn start_generate(&mut self) {
        self.request_seq += 1;
        let seq = self.request_seq;
        let request = GenerateRequest::new(self.config.rows, self.config.columns, self.generator);
        let client = self.client.clone();
        let sender = self.events.sender();
        self.in_flight = Some(format!("maze/{}", self.generator));
        self.set_status(Tone::Info, format!("generating {} maze...", self.generator));
        self.runtime.spawn(async move {
            let result = client.generate(&request).await;
            let _ = sender.send(AppEvent::GenerateDone { seq, result }.into());
        });
    }

    fn finish_compute(
        &mut self,
        seq: u64,
        result: Result<pathviz_core::ComputeResponse, pathviz_core::ClientError>,
    ) {
        if seq != self.request_seq {
            log_debug!("dropping superseded compute #{seq}");
            return;
        }
        self.in_flight = None;
        match result {
            Ok(response) => {
                let found = response.solution.is_some();
                let steps = response.steps.len();
                if let Err(err) = self.playback.play(
                    &mut self.board,
                    &response.steps,
                    response.solution.as_deref(),
                    Instant::now(),
                ) {
                    self.set_status(Tone::Negative, format!("replay rejected: {err}"));
                    return;
                }
                if found {
                    self.set_status(Tone::Positive, format!("replaying {steps} steps, path found"));
                } else {
                    self.set_status(Tone::Negative, format!("replaying {steps} steps, no path"));
                }
            }
            Err(err) => {
                log_warn!("compute failed: {err}");
                self.set_status(Tone::Negative, err.to_string());
            }
        }
    }

    fn finish_generate(
        &mut self,
        seq: u64,
        result: Result<pathviz_core::GenerateResponse, pathviz_core::ClientError>,
    ) {
        if seq != self.request_seq {
            log_debug!("dropping superseded generate #{seq}");
            return;
        }
        self.in_flight = None;
        match result {
            Ok(response) => {
                // The maze replaces whatever was painted; a running replay
                // would show marks over the new walls, so it stops too.
                self.playback.stop(&mut self.board);
                self.board.clear_walls();
                let count = response.walls.len();
                if let Err(err) = self.board.apply_walls(response.walls) {
                    self.set_status(Tone::Negative, format!("maze rejected: {err}"));
                    return;
                }
                self.set_status(Tone::Positive, format!("maze applied: {count} walls"));
            }
            Err(err) => {
                log_warn!("generate failed: {err}");
                self.set_status(Tone::Negative, err.to_string());
            }
        }
    }

    /// Maps a terminal coordinate to a grid cell, if it lands on one. Cells
    /// are two terminal columns wide and one row tall.
    fn cell_at(&self, column: u16, row: u16) -> Option<CellPos> {
        let area = self.grid_area;
        if column < area.x || row < area.y {
            return None;
        }
        let cell = (
            (row - area.y) as usize,
            ((column - area.x) / 2) as usize,
        );
        (row < area.y + area.height
            && column < area.x + area.width
            && self.board.contains(cell))
        .then_some(cell)
    }

    /// Handles the tick event of the terminal: advances any running replay.
    fn tick(&mut self) {
        self.playback.tick(&mut self.board, Instant::now());
    }

    pub fn is_replaying(&self) -> bool {
        !self.playback.is_idle()
    }

    fn push_log(&mut self, message: LogMessage) {
        if self.logs.len() == MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(message);
    }

    fn set_status(&mut self, tone: Tone, text: impl Into<String>) {
        self.status = Some(Status {
            tone,
            text: text.into(),
        });
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
