#![allow(dead_code)]

mod mocks;

pub use mocks::{MockGenerator, MockSink};

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::{Duration, Instant},
};

use contact_avalanche::{
    BatchError,
    core::{
        item::{ContactSink, Profile},
        state::GenerationState,
        workflow::BatchGenerationWorkflow,
    },
};

pub type History = Arc<Mutex<Vec<GenerationState>>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records every state the workflow publishes, starting with the current one.
pub fn record(workflow: &BatchGenerationWorkflow) -> History {
    let history: History = Arc::new(Mutex::new(Vec::new()));
    let listener = Arc::clone(&history);
    workflow.subscribe(Box::new(move |state| {
        listener.lock().unwrap().push(state.clone());
    }));
    history
}

pub fn snapshot(history: &History) -> Vec<GenerationState> {
    history.lock().unwrap().clone()
}

/// Polls `history` until `predicate` matches one of its states.
pub fn wait_for(history: &History, predicate: impl Fn(&GenerationState) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !history.lock().unwrap().iter().any(&predicate) {
        assert!(Instant::now() < deadline, "state never published");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Sink that stores a profile only when a permit is sent. Once the sender is
/// dropped, every commit fails without blocking.
pub struct GatedSink {
    permits: Mutex<Receiver<()>>,
    commits: AtomicUsize,
}

impl GatedSink {
    pub fn new() -> (Self, Sender<()>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                permits: Mutex::new(receiver),
                commits: AtomicUsize::new(0),
            },
            sender,
        )
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl ContactSink for GatedSink {
    fn commit(&self, _profile: &Profile) -> Result<bool, BatchError> {
        let permitted = self.permits.lock().unwrap().recv().is_ok();
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(permitted)
    }
}

/// Sink that takes a millisecond per commit.
#[derive(Default)]
pub struct SlowSink {
    commits: AtomicUsize,
}

impl SlowSink {
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl ContactSink for SlowSink {
    fn commit(&self, _profile: &Profile) -> Result<bool, BatchError> {
        thread::sleep(Duration::from_millis(1));
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

/// Sink that records how many commits were in flight at the same time.
#[derive(Default)]
pub struct OverlapSink {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    commits: AtomicUsize,
}

impl OverlapSink {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl ContactSink for OverlapSink {
    fn commit(&self, _profile: &Profile) -> Result<bool, BatchError> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(true)
    }
}

/// Sink whose first commit panics. Later commits succeed.
#[derive(Default)]
pub struct PanickingSink {
    exploded: AtomicBool,
}

impl ContactSink for PanickingSink {
    fn commit(&self, _profile: &Profile) -> Result<bool, BatchError> {
        if !self.exploded.swap(true, Ordering::SeqCst) {
            panic!("sink exploded");
        }
        Ok(true)
    }
}
