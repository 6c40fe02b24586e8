use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread,
};

use log::debug;

/// Progress of a run: `current` units attempted out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationProgress {
    pub current: usize,
    pub total: usize,
}

impl GenerationProgress {
    pub fn new(current: usize, total: usize) -> Self {
        debug_assert!(current <= total, "progress {current} is past total {total}");
        Self { current, total }
    }

    /// Completed share of the run, rounded down. Zero when `total` is zero.
    pub fn percentage(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.current * 100 / self.total
        }
    }
}

/// Aggregate result of a run that went through every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub success_count: usize,
    pub total_count: usize,
}

impl GenerationOutcome {
    pub fn new(success_count: usize, total_count: usize) -> Self {
        debug_assert!(success_count <= total_count);
        Self {
            success_count,
            total_count,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.total_count - self.success_count
    }

    pub fn is_complete(&self) -> bool {
        self.success_count == self.total_count
    }

    /// Terminal state reported for this outcome: `Success` when every unit
    /// was stored, `Warning` otherwise.
    pub fn to_state(&self) -> GenerationState {
        if self.is_complete() {
            GenerationState::Success(self.success_count)
        } else {
            GenerationState::Warning(self.success_count, self.total_count)
        }
    }
}

/// Observable state of the generation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Loading(GenerationProgress),
    /// Every requested contact was stored.
    Success(usize),
    /// `(success_count, total_count)`: some contacts could not be stored.
    Warning(usize, usize),
    /// The run was rejected or aborted; carries the reason.
    Error(String),
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::Success(_) | GenerationState::Warning(..) | GenerationState::Error(_)
        )
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GenerationState::Loading(_))
    }

    pub fn progress(&self) -> Option<GenerationProgress> {
        match self {
            GenerationState::Loading(progress) => Some(*progress),
            _ => None,
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationState::Idle => write!(f, "Idle"),
            GenerationState::Loading(progress) => write!(
                f,
                "Creating contacts: {}/{} ({}%)",
                progress.current,
                progress.total,
                progress.percentage()
            ),
            GenerationState::Success(1) => write!(f, "Created 1 contact"),
            GenerationState::Success(count) => write!(f, "Created {count} contacts"),
            GenerationState::Warning(success_count, total_count) => write!(
                f,
                "Created {success_count} of {total_count} contacts, some could not be saved"
            ),
            GenerationState::Error(reason) => write!(f, "Error creating contacts: {reason}"),
        }
    }
}

/// Callback invoked with every state that becomes current.
pub type StateListener = Box<dyn Fn(&GenerationState) + Send + Sync>;

type SharedListener = Arc<dyn Fn(&GenerationState) + Send + Sync>;

/// A state waiting to be handed to the listeners registered when it was
/// published.
struct Delivery {
    state: GenerationState,
    listeners: Vec<SharedListener>,
}

struct StateCell {
    state: GenerationState,
    /// Identifier of the only run allowed to publish.
    run: u64,
    /// Number of run threads that have not finished yet.
    running: usize,
    listeners: Vec<SharedListener>,
    pending: VecDeque<Delivery>,
    /// Set while one thread drains `pending`.
    delivering: bool,
}

impl StateCell {
    fn replace(&mut self, state: GenerationState) {
        if self.state == state {
            return;
        }
        debug!("State: {}", state);
        self.pending.push_back(Delivery {
            state: state.clone(),
            listeners: self.listeners.clone(),
        });
        self.state = state;
    }

    fn is_quiet(&self) -> bool {
        self.running == 0 && !self.delivering && self.pending.is_empty()
    }
}

/// Clears the delivering flag when a listener panics, so later publications
/// are still delivered.
struct DeliveryGuard<'a> {
    holder: &'a StateHolder,
}

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.holder.lock().delivering = false;
            self.holder.settled.notify_all();
        }
    }
}

/// Single current-value holder for [`GenerationState`].
///
/// Last write wins. Equal consecutive values are conflated. Publications
/// tagged with a run that has been superseded are dropped, so a consumer
/// never sees an old run's state once a newer run or a cancellation took
/// over.
///
/// Listeners are called without the holder locked, one state at a time and
/// in publication order. A listener may read the state or publish again; a
/// state published from inside a listener is delivered after the current one.
pub struct StateHolder {
    cell: Mutex<StateCell>,
    settled: Condvar,
}

impl Default for StateHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHolder {
    pub fn new() -> Self {
        Self {
            cell: Mutex::new(StateCell {
                state: GenerationState::Idle,
                run: 0,
                running: 0,
                listeners: Vec::new(),
                pending: VecDeque::new(),
                delivering: false,
            }),
            settled: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands queued states to their listeners. Only one thread drains the
    /// queue at a time; any other caller returns at once and its states are
    /// delivered by the draining thread.
    fn deliver<'a>(&'a self, mut cell: MutexGuard<'a, StateCell>) {
        if cell.delivering {
            return;
        }
        cell.delivering = true;
        let _guard = DeliveryGuard { holder: self };

        while let Some(delivery) = cell.pending.pop_front() {
            drop(cell);
            for listener in &delivery.listeners {
                listener(&delivery.state);
            }
            cell = self.lock();
        }

        cell.delivering = false;
        if cell.is_quiet() {
            self.settled.notify_all();
        }
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> GenerationState {
        self.lock().state.clone()
    }

    /// Registers a listener. It first receives the current state, then every
    /// later change.
    pub fn subscribe(&self, listener: StateListener) {
        let listener: SharedListener = Arc::from(listener);
        let mut cell = self.lock();
        let replay = Delivery {
            state: cell.state.clone(),
            listeners: vec![Arc::clone(&listener)],
        };
        cell.pending.push_back(replay);
        cell.listeners.push(listener);
        self.deliver(cell);
    }

    /// Overwrites the state without touching the active run.
    pub fn set(&self, state: GenerationState) {
        let mut cell = self.lock();
        cell.replace(state);
        self.deliver(cell);
    }

    /// Invalidates the active run, then overwrites the state.
    pub fn supersede(&self, state: GenerationState) {
        let mut cell = self.lock();
        cell.run += 1;
        cell.replace(state);
        self.deliver(cell);
    }

    /// Starts a new run that supersedes any previous one and publishes its
    /// first state. Returns the identifier the run publishes with.
    pub fn begin_run(&self, initial: GenerationState) -> u64 {
        let mut cell = self.lock();
        cell.run += 1;
        cell.running += 1;
        cell.replace(initial);
        let run = cell.run;
        self.deliver(cell);
        run
    }

    /// Publishes on behalf of `run`. Returns `false` when the run has been
    /// superseded and the state was dropped.
    pub fn publish(&self, run: u64, state: GenerationState) -> bool {
        let mut cell = self.lock();
        if cell.run != run {
            return false;
        }
        cell.replace(state);
        self.deliver(cell);
        true
    }

    /// Marks one run thread as finished.
    pub fn end_run(&self) {
        let mut cell = self.lock();
        cell.running = cell.running.saturating_sub(1);
        if cell.is_quiet() {
            self.settled.notify_all();
        }
    }

    /// Blocks until every started run thread has finished and every
    /// published state has reached the listeners. Must not be called from a
    /// listener.
    pub fn wait_until_settled(&self) {
        let mut cell = self.lock();
        while !cell.is_quiet() {
            cell = self
                .settled
                .wait(cell)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
