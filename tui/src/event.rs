use color_eyre::eyre::WrapErr;
use crossbeam_channel::{Receiver, Sender, select, unbounded};
use crossterm::event::{self, Event as CrosstermEvent};
use pathviz_core::{
    ClientError, ComputeResponse, GenerateResponse, LogMessage, SolverKind,
};
use std::{
    thread,
    time::{Duration, Instant},
};

const TICK_FPS: f64 = 30.0;

pub enum Event {
    /// Fixed-rate heartbeat; drives the playback scheduler.
    Tick,
    Crossterm(CrosstermEvent),
    App(AppEvent),
    Log(LogMessage),
}

impl From<AppEvent> for Event {
    fn from(value: AppEvent) -> Self {
        Event::App(value)
    }
}

impl From<LogMessage> for Event {
    fn from(value: LogMessage) -> Self {
        Event::Log(value)
    }
}

pub enum AppEvent {
    /// Send the current board to the solver service.
    Run,
    /// Ask the service for a maze and repopulate the walls.
    Generate,
    /// Drop visualization marks; with `walls` also drop painted walls.
    Clear { walls: bool },
    SelectSolver(SolverKind),
    /// A solver invocation finished. `seq` identifies which run; stale
    /// completions are dropped by the app.
    ComputeDone {
        seq: u64,
        result: Result<ComputeResponse, ClientError>,
    },
    GenerateDone {
        seq: u64,
        result: Result<GenerateResponse, ClientError>,
    },
    ToggleLogs,
    Quit,
}

/// Terminal event handler.
///
/// Multiplexes the input thread, app-level events and the core log channel
/// into one stream for the main loop.
#[derive(Debug)]
pub struct EventHandler {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    log_rx: Receiver<LogMessage>,
}

impl EventHandler {
    /// Constructs a new instance of [`EventHandler`] and spawns a new thread to handle events.
    pub fn new(log_rx: Receiver<LogMessage>) -> Self {
        let (sender, receiver) = unbounded();
        let actor = EventThread::new(sender.clone());
        thread::spawn(|| actor.run());
        Self {
            sender,
            receiver,
            log_rx,
        }
    }

    /// Receives the next event, blocking until one arrives.
    ///
    /// # Errors
    ///
    /// Fails if the sender channel is disconnected, which only happens when
    /// the event thread itself died.
    pub fn next(&self) -> color_eyre::Result<Event> {
        select! {
            recv(self.receiver) -> ev => Ok(ev?),
            recv(self.log_rx) -> log => Ok(log?.into())
        }
    }

    /// Queue an app event to be processed on the next iteration of the
    /// event loop.
    pub fn send(&mut self, app_event: AppEvent) {
        let _ = self.sender.send(app_event.into());
    }

    /// A sender handle for completion events coming from spawned request
    /// tasks.
    pub fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }
}

/// A thread that handles reading crossterm events and emitting tick events on a regular schedule.
struct EventThread {
    /// Event sender channel.
    sender: Sender<Event>,
}

impl EventThread {
    fn new(sender: Sender<Event>) -> Self {
        Self { sender }
    }

    /// Runs the event thread.
    ///
    /// This function emits tick events at a fixed rate and polls for crossterm events in between.
    fn run(self) -> color_eyre::Result<()> {
        let tick_interval = Duration::from_secs_f64(1.0 / TICK_FPS);
        let mut last_tick = Instant::now();
        loop {
            // emit tick events at a fixed rate
            let timeout = tick_interval.saturating_sub(last_tick.elapsed());
            if timeout == Duration::ZERO {
                last_tick = Instant::now();
                self.send(Event::Tick);
            }
            // poll for crossterm events, ensuring that we don't block the tick interval
            if event::poll(timeout).wrap_err("failed to poll for crossterm events")? {
                let event = event::read().wrap_err("failed to read crossterm event")?;
                self.send(Event::Crossterm(event));
            }
        }
    }

    fn send(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
