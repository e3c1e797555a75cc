//! Core types shared across the GridLife workspace: the sparse life board,
//! the template codec, and the interactive session state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use thiserror::Error;

/// 2D integer vector used for cells, offsets, and pixel-to-cell mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Componentwise floor division. The divisor must be positive.
    pub fn div_floor(self, divisor: i32) -> Self {
        Self {
            x: self.x.div_euclid(divisor),
            y: self.y.div_euclid(divisor),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: i32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

impl Mul<Vec2> for i32 {
    type Output = Vec2;

    fn mul(self, vector: Vec2) -> Vec2 {
        vector * self
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        self * -1
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A live cell is identified by its grid coordinate; absence means dead.
pub type Cell = Vec2;

/// The 8 Moore-neighborhood offsets around a cell.
const MOORE_OFFSETS: [Vec2; 8] = [
    Vec2::new(-1, -1),
    Vec2::new(0, -1),
    Vec2::new(1, -1),
    Vec2::new(-1, 0),
    Vec2::new(1, 0),
    Vec2::new(-1, 1),
    Vec2::new(0, 1),
    Vec2::new(1, 1),
];

/// Board construction failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// Indicates zero grid dimensions.
    #[error("invalid grid bounds: {0}")]
    InvalidBounds(&'static str),
}

/// Immutable grid dimensions, fixed for the lifetime of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridBounds {
    rows: u32,
    columns: u32,
}

impl GridBounds {
    /// Builds validated bounds; zero dimensions are rejected up front so the
    /// step loop never has to handle them per-cell.
    pub fn new(rows: u32, columns: u32) -> Result<Self, BoardError> {
        if rows == 0 || columns == 0 {
            return Err(BoardError::InvalidBounds(
                "grid dimensions must be non-zero",
            ));
        }
        Ok(Self { rows, columns })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Whether `cell` lies within `[0, columns) x [0, rows)`.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.columns && (cell.y as u32) < self.rows
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}

/// Counters describing one generation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub generation: u64,
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
}

/// Sparse life board: the live-cell set, its bounds, and a generation counter.
///
/// Invariant: the set never contains a coordinate outside the bounds. Every
/// mutation path (`toggle`, `load`, `step`) preserves it, which is what lets
/// neighbor counting skip explicit range checks.
#[derive(Debug, Clone)]
pub struct Board {
    bounds: GridBounds,
    cells: HashSet<Cell>,
    generation: u64,
}

impl Board {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: HashSet::new(),
            generation: 0,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Flips one cell's membership. Returns `false` without mutating when the
    /// coordinate is out of bounds.
    pub fn toggle(&mut self, cell: Cell) -> bool {
        if !self.bounds.contains(cell) {
            return false;
        }
        if !self.cells.remove(&cell) {
            self.cells.insert(cell);
        }
        true
    }

    /// Replaces the live set wholesale, clipping out-of-bounds coordinates.
    /// Returns how many cells were dropped so callers can report the clip.
    /// Resets the generation counter.
    pub fn load<I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = Cell>,
    {
        self.cells.clear();
        self.generation = 0;
        let mut dropped = 0;
        for cell in cells {
            if self.bounds.contains(cell) {
                self.cells.insert(cell);
            } else {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.generation = 0;
    }

    /// Live cells among the 8 Moore neighbors of `cell`, in `[0, 8]`.
    pub fn count_neighbors(&self, cell: Cell) -> u8 {
        MOORE_OFFSETS
            .iter()
            .filter(|&&offset| self.cells.contains(&(cell + offset)))
            .count() as u8
    }

    /// Computes the next generation. Every position in the full bounds is a
    /// candidate (dead cells can be born); classification reads only the
    /// pre-step set, then births and deaths apply as one transition, so a
    /// caller can never observe a partial state.
    pub fn step(&mut self) -> StepSummary {
        let mut births = Vec::new();
        let mut deaths = Vec::new();

        for x in 0..self.bounds.columns as i32 {
            for y in 0..self.bounds.rows as i32 {
                let position = Vec2::new(x, y);
                let neighbors = self.count_neighbors(position);
                let alive = self.cells.contains(&position);
                if !alive && neighbors == 3 {
                    births.push(position);
                } else if alive && !(neighbors == 2 || neighbors == 3) {
                    deaths.push(position);
                }
            }
        }

        let summary = StepSummary {
            generation: self.generation + 1,
            births: births.len(),
            deaths: deaths.len(),
            population: self.cells.len() + births.len() - deaths.len(),
        };

        for cell in births {
            self.cells.insert(cell);
        }
        for cell in &deaths {
            self.cells.remove(cell);
        }
        self.generation = summary.generation;

        summary
    }
}

fn default_alive() -> char {
    '#'
}

/// A named pattern as stored in the template repository: text rows, the
/// marker character meaning "alive", and optional placement offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub template: Vec<String>,
    #[serde(default = "default_alive")]
    pub alive: char,
    #[serde(default)]
    pub row_offset: i32,
    #[serde(default)]
    pub col_offset: i32,
}

impl TemplateRecord {
    pub fn from_rows(template: Vec<String>) -> Self {
        Self {
            template,
            alive: default_alive(),
            row_offset: 0,
            col_offset: 0,
        }
    }

    /// Parses the record with its own offsets applied.
    pub fn cells(&self) -> HashSet<Cell> {
        parse_template(
            &self.template,
            self.alive,
            Vec2::new(self.col_offset, self.row_offset),
        )
    }

    /// Builds a full-grid `rows x columns` template (`#` live, space dead)
    /// from a cell set, the shape written back on save.
    pub fn from_cells(bounds: GridBounds, cells: &HashSet<Cell>) -> Self {
        let mut template = Vec::with_capacity(bounds.rows() as usize);
        for y in 0..bounds.rows() as i32 {
            let row: String = (0..bounds.columns() as i32)
                .map(|x| {
                    if cells.contains(&Vec2::new(x, y)) {
                        '#'
                    } else {
                        ' '
                    }
                })
                .collect();
            template.push(row);
        }
        Self::from_rows(template)
    }
}

/// Scans every character of every row and collects `(col + offset.x,
/// row + offset.y)` wherever the character equals the alive marker. Rows may
/// be ragged; only present characters are scanned.
pub fn parse_template(rows: &[String], alive: char, offset: Vec2) -> HashSet<Cell> {
    let mut cells = HashSet::new();
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, ch) in row.chars().enumerate() {
            if ch == alive {
                cells.insert(Vec2::new(col_idx as i32, row_idx as i32) + offset);
            }
        }
    }
    cells
}

/// Offset that centers a template within `bounds`:
/// `(columns/2 - longest_line/2, rows/2 - height/2)` with floor division.
/// A template larger than the grid yields negative components; feeding the
/// result through [`parse_template`] and [`Board::load`] clips the overflow.
pub fn centering_offset(rows: &[String], bounds: GridBounds) -> Vec2 {
    let longest = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as i32;
    let height = rows.len() as i32;
    Vec2::new(
        bounds.columns() as i32 / 2 - longest / 2,
        bounds.rows() as i32 / 2 - height / 2,
    )
}

/// Template repository failures, surfaced to the load/save caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("template '{0}' not found in repository")]
    NotFound(String),
    #[error("malformed template repository: {0}")]
    Malformed(String),
    #[error("template repository i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Write side of the template repository. The session appends the starting
/// configuration under a name generated by the store.
pub trait TemplateStore {
    /// Appends `record` under a fresh unique name and returns that name.
    fn append(&mut self, record: TemplateRecord) -> Result<String, StoreError>;
}

/// No-op store for sessions without a repository.
#[derive(Debug, Default)]
pub struct NullStore;

impl TemplateStore for NullStore {
    fn append(&mut self, _record: TemplateRecord) -> Result<String, StoreError> {
        Ok(String::from("discarded"))
    }
}

/// Session construction and save failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Indicates an invalid configuration value.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Static configuration for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Target frames per second for the driving loop.
    pub frame_rate: u32,
    /// Edge length of one rendered cell, used for pointer-to-cell mapping.
    pub block_size_pixels: u32,
    /// Initial ms between generations.
    pub timer_init_ms: u64,
    /// Increment applied by the faster/slower actions.
    pub timer_step_ms: u64,
    /// Lower timer bound in ms.
    pub timer_min_ms: u64,
    /// Upper timer bound in ms.
    pub timer_max_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            block_size_pixels: 20,
            timer_init_ms: 200,
            timer_step_ms: 10,
            timer_min_ms: 20,
            timer_max_ms: 300,
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<(), SessionError> {
        if self.frame_rate == 0 {
            return Err(SessionError::InvalidConfig("frame_rate must be non-zero"));
        }
        if self.block_size_pixels == 0 {
            return Err(SessionError::InvalidConfig(
                "block_size_pixels must be non-zero",
            ));
        }
        if self.timer_step_ms == 0 {
            return Err(SessionError::InvalidConfig("timer_step_ms must be non-zero"));
        }
        if self.timer_min_ms == 0 {
            return Err(SessionError::InvalidConfig("timer_min_ms must be non-zero"));
        }
        if self.timer_min_ms > self.timer_max_ms {
            return Err(SessionError::InvalidConfig(
                "timer_min_ms cannot exceed timer_max_ms",
            ));
        }
        if self.timer_init_ms < self.timer_min_ms || self.timer_init_ms > self.timer_max_ms {
            return Err(SessionError::InvalidConfig(
                "timer_init_ms must lie within [timer_min_ms, timer_max_ms]",
            ));
        }
        Ok(())
    }
}

/// Primary session state. The help overlay is an independent flag, not a
/// fifth mode, so the transition table stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    #[default]
    Initializing,
    Running,
    Paused,
    GameOver,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Initializing => "INITIALIZING",
            Mode::Running => "RUNNING",
            Mode::Paused => "PAUSED",
            Mode::GameOver => "GAME OVER",
        };
        f.write_str(label)
    }
}

/// Abstract input vocabulary. Frontends translate their own key codes into
/// these; the state machine never sees backend events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Start,
    Quit,
    ToggleHelp,
    Reset,
    SoftReset,
    Save,
    TogglePause,
    SpeedUp,
    SlowDown,
}

/// One positioned overlay text item handed to the render surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayItem {
    pub text: String,
    pub position: Vec2,
    pub color: Option<[u8; 3]>,
}

impl OverlayItem {
    pub fn plain(text: impl Into<String>, position: Vec2) -> Self {
        Self {
            text: text.into(),
            position,
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, position: Vec2, color: [u8; 3]) -> Self {
        Self {
            text: text.into(),
            position,
            color: Some(color),
        }
    }
}

/// Render-ready view of one frame: cells plus the drained overlay queue.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub mode: Mode,
    pub help_visible: bool,
    pub generation: u64,
    pub population: usize,
    pub timer_ms: u64,
    pub bounds: GridBounds,
    pub cells: Vec<Cell>,
    pub overlays: Vec<OverlayItem>,
}

/// Color used for the game-over overlay text.
pub const GAME_OVER_COLOR: [u8; 3] = [155, 155, 155];

const HELP_LINES: [&str; 9] = [
    "+: speed up cycles",
    "-: slow down cycles",
    "esc: pause",
    "p: start game",
    "r: reset",
    "s: soft reset",
    "o: save starting configuration",
    "h: toggle this help",
    "q: quit",
];

/// Interactive session: owns the board, the pacing timer, the starting
/// configuration snapshot, and the overlay queue. Single-threaded; exactly
/// one actor mutates the live set at a time.
pub struct Session {
    config: SessionConfig,
    board: Board,
    store: Box<dyn TemplateStore>,
    mode: Mode,
    help_visible: bool,
    timer_ms: u64,
    elapsed_ms: u64,
    starting_config: Option<HashSet<Cell>>,
    overlays: Vec<OverlayItem>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        bounds: GridBounds,
        store: Box<dyn TemplateStore>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let timer_ms = config.timer_init_ms;
        Ok(Self {
            config,
            board: Board::new(bounds),
            store,
            mode: Mode::Initializing,
            help_visible: false,
            timer_ms,
            elapsed_ms: 0,
            starting_config: None,
            overlays: Vec::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn timer_ms(&self) -> u64 {
        self.timer_ms
    }

    /// Seeds the board from a parsed template. Only meaningful while
    /// Initializing; returns the number of clipped cells.
    pub fn seed<I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = Cell>,
    {
        if self.mode != Mode::Initializing {
            return 0;
        }
        self.board.load(cells)
    }

    /// Processes one abstract input action. Returns `true` when quit was
    /// requested. Guarded transitions that do not apply in the current mode
    /// are silent no-ops, not errors.
    pub fn apply(&mut self, action: InputAction) -> Result<bool, SessionError> {
        match action {
            InputAction::Quit => return Ok(true),
            InputAction::Start => self.start(),
            InputAction::ToggleHelp => self.help_visible = !self.help_visible,
            InputAction::Reset => {
                if self.mode != Mode::Running {
                    self.reset_playfield();
                }
            }
            InputAction::SoftReset => self.soft_reset(),
            InputAction::Save => self.save()?,
            InputAction::TogglePause => self.toggle_pause(),
            InputAction::SpeedUp => self.speed_up(),
            InputAction::SlowDown => self.slow_down(),
        }
        Ok(false)
    }

    /// Maps a pointer position to a cell via floor division by the block size
    /// and toggles it. Only active while Initializing.
    pub fn toggle_at(&mut self, pixel: Vec2) -> bool {
        if self.mode != Mode::Initializing {
            return false;
        }
        let cell = pixel.div_floor(self.config.block_size_pixels as i32);
        self.board.toggle(cell)
    }

    /// Advances the session by `dt_ms` of wall time: queue the help overlay
    /// if active; when Paused queue the pause overlay and nothing else; when
    /// Running accumulate time and step once per elapsed timer interval,
    /// transitioning to GameOver if the board empties.
    pub fn tick(&mut self, dt_ms: u64) {
        if self.help_visible {
            self.queue_help();
        }
        if self.mode == Mode::Paused {
            self.queue_paused();
            return;
        }
        if self.mode != Mode::Running {
            return;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= self.timer_ms {
            self.elapsed_ms -= self.timer_ms;
            let summary = self.board.step();
            if summary.population == 0 {
                self.mode = Mode::GameOver;
            }
        }
    }

    /// Produces the render-ready snapshot for this frame and drains the
    /// overlay queue. While in GameOver the game-over instructions lead the
    /// queue; anything already queued (e.g. a save confirmation) follows.
    pub fn frame(&mut self) -> FrameSnapshot {
        if self.mode == Mode::GameOver {
            let mut queued = std::mem::take(&mut self.overlays);
            self.queue_game_over();
            self.overlays.append(&mut queued);
        }
        let mut cells: Vec<Cell> = self.board.cells().iter().copied().collect();
        cells.sort_by_key(|cell| (cell.y, cell.x));
        FrameSnapshot {
            mode: self.mode,
            help_visible: self.help_visible,
            generation: self.board.generation(),
            population: self.board.population(),
            timer_ms: self.timer_ms,
            bounds: self.board.bounds(),
            cells,
            overlays: std::mem::take(&mut self.overlays),
        }
    }

    fn start(&mut self) {
        if self.mode != Mode::Initializing {
            return;
        }
        self.starting_config = Some(self.board.cells().clone());
        self.mode = Mode::Running;
    }

    /// Clears the playfield back to Initializing. The starting-configuration
    /// snapshot and the timer survive so soft-reset and the chosen pace carry
    /// across playthroughs.
    fn reset_playfield(&mut self) {
        self.board.clear();
        self.elapsed_ms = 0;
        self.overlays.clear();
        self.help_visible = false;
        self.mode = Mode::Initializing;
    }

    fn soft_reset(&mut self) {
        if self.mode == Mode::Running {
            return;
        }
        self.reset_playfield();
        if let Some(cells) = self.starting_config.clone() {
            self.board.load(cells);
        }
    }

    fn save(&mut self) -> Result<(), SessionError> {
        if self.mode == Mode::Running {
            return Ok(());
        }
        let Some(snapshot) = &self.starting_config else {
            return Ok(());
        };
        let record = TemplateRecord::from_cells(self.board.bounds(), snapshot);
        let name = self.store.append(record)?;
        self.overlays.push(OverlayItem::plain(
            format!("Saved starting configuration as '{name}'"),
            Vec2::new(1, 4),
        ));
        Ok(())
    }

    fn toggle_pause(&mut self) {
        match self.mode {
            Mode::Running => self.mode = Mode::Paused,
            Mode::Paused => self.mode = Mode::Running,
            _ => {}
        }
    }

    fn speed_up(&mut self) {
        if self.timer_ms >= self.config.timer_min_ms + self.config.timer_step_ms {
            self.timer_ms -= self.config.timer_step_ms;
        }
    }

    fn slow_down(&mut self) {
        if self.timer_ms + self.config.timer_step_ms <= self.config.timer_max_ms {
            self.timer_ms += self.config.timer_step_ms;
        }
    }

    fn queue_paused(&mut self) {
        self.overlays
            .push(OverlayItem::plain("Paused", Vec2::new(1, 0)));
        self.overlays.push(OverlayItem::plain(
            format!("Current ms per cycle: {}", self.timer_ms),
            Vec2::new(1, 1),
        ));
    }

    fn queue_help(&mut self) {
        for (row, line) in HELP_LINES.iter().enumerate() {
            self.overlays
                .push(OverlayItem::plain(*line, Vec2::new(1, 3 + row as i32)));
        }
    }

    fn queue_game_over(&mut self) {
        self.overlays.push(OverlayItem::colored(
            "The game is over!",
            Vec2::new(1, 0),
            GAME_OVER_COLOR,
        ));
        self.overlays.push(OverlayItem::plain(
            "Press r to play again",
            Vec2::new(1, 1),
        ));
        self.overlays.push(OverlayItem::plain(
            "Press s to replay the same starting configuration",
            Vec2::new(1, 2),
        ));
        self.overlays.push(OverlayItem::plain(
            "Press o to save your starting configuration",
            Vec2::new(1, 3),
        ));
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("help_visible", &self.help_visible)
            .field("timer_ms", &self.timer_ms)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("population", &self.board.population())
            .field("generation", &self.board.generation())
            .finish_non_exhaustive()
    }
}
