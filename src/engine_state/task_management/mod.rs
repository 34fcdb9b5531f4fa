//! # Streaming Scheduler
//!
//! This module schedules chunk production on background threads and hands the
//! results back to the main thread a few at a time.
//!
//! ## Architecture Overview
//!
//! - **Priority queue**: pending `ChunkTask`s, closest chunk first. Owned by the
//!   main thread.
//! - **State table**: `ChunkCoordinate → ChunkState` for every coordinate that
//!   is queued, generating, ready or resident. This is the exclusion set that
//!   keeps a coordinate from being scheduled twice. Shared with workers behind
//!   an `MtResource`.
//! - **In-flight counter**: atomic, never above `max_in_flight`.
//! - **Completion channel**: bounded multi-producer/single-consumer
//!   `crossbeam-channel` with capacity `max_in_flight`. Workers send, the main
//!   thread receives without blocking.
//!
//! ## Task Lifecycle
//! 1. `enqueue()` records the coordinate as `Queued` and pushes it on the heap
//! 2. `dispatch()` pops the closest requests while slots are free and spawns a
//!    short-lived worker thread for each one
//! 3. The worker runs the `ChunkProducer`, marks the coordinate
//!    `ReadyForUpload`, sends the completion and releases its slot
//! 4. `drain_ready()` receives at most `max_per_tick` completions per call
//!
//! ## Failure Handling
//! Every dispatched worker holds an `InFlightSlot`. The slot is released when
//! the worker ends, whether it produced an artifact, returned an error or
//! panicked. A coordinate whose production did not succeed is removed from the
//! state table so that a later load pass can request it again.
//!
//! ## Example Usage
//! ```rust
//! # use std::sync::Arc;
//! # use voxel_streaming::{ChunkCoordinate, ChunkGenerationTask, StreamingConfig, StreamingScheduler};
//! let config = StreamingConfig::default();
//! let producer = Arc::new(ChunkGenerationTask::from_config(&config));
//! let mut scheduler = StreamingScheduler::new(producer, config.max_in_flight);
//!
//! scheduler.enqueue(ChunkCoordinate::new(0, 0), 0.0);
//! scheduler.dispatch();
//!
//! // Once per frame:
//! for artifact in scheduler.drain_ready(2) {
//!     // upload, then
//!     scheduler.mark_resident(artifact.coordinate());
//! }
//! ```

pub mod task;

use std::{
    collections::{BinaryHeap, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::{debug, error, info, trace, warn};
use web_time::Instant;

use crate::core::MtResource;
use task::{ChunkProducer, ChunkState, ChunkTask, Completion};

use super::{rendering::meshing::ChunkArtifact, voxels::chunk::ChunkCoordinate};

/// Concurrent generation workers allowed unless configured otherwise.
pub const MAX_TASKS_IN_FLIGHT: usize = 16;

/// Shared table of pipeline states.
type StateTable = MtResource<HashMap<ChunkCoordinate, ChunkState>>;

/// Schedules chunk production on a bounded number of worker threads.
///
/// Every method is called on the main thread; workers only touch the state
/// table, the in-flight counter and the completion channel.
pub struct StreamingScheduler {
    queue: BinaryHeap<ChunkTask>,
    states: StateTable,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: usize,
    producer: Arc<dyn ChunkProducer>,
    completion_sender: Sender<Completion>,
    /// `None` once the scheduler has been shut down
    completion_receiver: Option<Receiver<Completion>>,
    generation_failures: usize,
}

impl StreamingScheduler {
    /// Creates a new scheduler.
    ///
    /// # Arguments
    /// * `producer` - The work each worker runs for its coordinate
    /// * `max_in_flight` - Maximum number of simultaneously running workers.
    ///   Also the capacity of the completion channel. Zero is treated as one.
    pub fn new(producer: Arc<dyn ChunkProducer>, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        let (completion_sender, completion_receiver) = crossbeam_channel::bounded(max_in_flight);

        info!(
            "Streaming scheduler started: {} workers max, available parallelism {:?}",
            max_in_flight,
            thread::available_parallelism()
        );

        StreamingScheduler {
            queue: BinaryHeap::new(),
            states: MtResource::new(HashMap::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight,
            producer,
            completion_sender,
            completion_receiver: Some(completion_receiver),
            generation_failures: 0,
        }
    }

    /// Requests a chunk.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk to produce
    /// * `priority` - Lower values are dispatched first (usually the distance to the viewpoint)
    ///
    /// # Returns
    /// `false` if the coordinate is already queued, in flight, ready or resident,
    /// or if the scheduler has been shut down. Nothing changes in that case.
    pub fn enqueue(&mut self, coordinate: ChunkCoordinate, priority: f32) -> bool {
        if self.is_shut_down() {
            return false;
        }

        {
            let mut states = self.states.get_mut();
            if states.contains_key(&coordinate) {
                trace!("Ignoring duplicate request for chunk {}", coordinate);
                return false;
            }
            states.insert(coordinate, ChunkState::Queued);
        }

        self.queue.push(ChunkTask {
            coordinate,
            priority,
        });
        true
    }

    /// Starts workers for the closest queued chunks while slots are free.
    ///
    /// # Returns
    /// The number of workers started.
    pub fn dispatch(&mut self) -> usize {
        if self.is_shut_down() {
            return 0;
        }

        let mut dispatched = 0;
        while self.in_flight.load(Ordering::Acquire) < self.max_in_flight {
            let Some(task) = self.queue.pop() else {
                break;
            };

            if !self.claim(task.coordinate) {
                // Forgotten or pruned while it waited in the queue.
                continue;
            }

            self.in_flight.fetch_add(1, Ordering::AcqRel);
            let slot = InFlightSlot {
                coordinate: task.coordinate,
                in_flight: self.in_flight.clone(),
                states: self.states.clone(),
                published: false,
            };

            match self.spawn_worker(task.coordinate, slot) {
                Ok(()) => {
                    debug!(
                        "Dispatched chunk {} (priority {:.2})",
                        task.coordinate, task.priority
                    );
                    dispatched += 1;
                }
                Err(spawn_error) => {
                    // The closure, and with it the slot, was dropped by the failed spawn.
                    error!(
                        "Could not start a worker for chunk {}: {}",
                        task.coordinate, spawn_error
                    );
                    break;
                }
            }
        }

        dispatched
    }

    /// Receives finished chunks without blocking.
    ///
    /// # Arguments
    /// * `max_per_tick` - Upper bound on completions received by this call,
    ///   successful or not
    ///
    /// # Returns
    /// The artifacts received, in completion order. Failed productions are
    /// logged and not returned.
    pub fn drain_ready(&mut self, max_per_tick: usize) -> Vec<ChunkArtifact> {
        let Some(receiver) = &self.completion_receiver else {
            return Vec::new();
        };

        let mut ready = Vec::new();
        for _ in 0..max_per_tick {
            let completion = match receiver.try_recv() {
                Ok(completion) => completion,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };

            match completion.result {
                Ok(artifact) => {
                    trace!(
                        "Chunk {} ready: {} faces in {:.2} ms",
                        completion.coordinate,
                        artifact.face_count(),
                        completion.elapsed.as_secs_f64() * 1000.0
                    );
                    ready.push(artifact);
                }
                Err(generation_error) => {
                    self.generation_failures += 1;
                    warn!("Dropping chunk {}: {}", completion.coordinate, generation_error);
                }
            }
        }

        ready
    }

    /// Records that a chunk has been uploaded and is drawable.
    pub fn mark_resident(&mut self, coordinate: ChunkCoordinate) {
        self.states
            .get_mut()
            .insert(coordinate, ChunkState::Resident);
    }

    /// Removes a coordinate from the pipeline so it can be requested again.
    ///
    /// A queued request is dropped lazily when it reaches the front of the queue.
    ///
    /// # Returns
    /// The state the coordinate was in, if any.
    pub fn forget(&mut self, coordinate: ChunkCoordinate) -> Option<ChunkState> {
        self.states.get_mut().remove(&coordinate)
    }

    /// Drops queued requests that are no longer wanted.
    ///
    /// Only `Queued` coordinates are affected; work already handed to a
    /// worker always runs to completion.
    ///
    /// # Arguments
    /// * `keep` - Returns `true` for coordinates that should stay queued
    ///
    /// # Returns
    /// The number of requests removed.
    pub fn prune_queued(&mut self, mut keep: impl FnMut(ChunkCoordinate) -> bool) -> usize {
        let mut states = self.states.get_mut();
        let before = self.queue.len();
        self.queue.retain(|task| {
            if keep(task.coordinate) {
                return true;
            }
            if states.get(&task.coordinate) == Some(&ChunkState::Queued) {
                states.remove(&task.coordinate);
            }
            false
        });
        before - self.queue.len()
    }

    /// The current state of a coordinate, or `None` if it is unrequested.
    pub fn state(&self, coordinate: ChunkCoordinate) -> Option<ChunkState> {
        self.states.get().get(&coordinate).copied()
    }

    /// Number of workers currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The configured worker cap.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Number of requests waiting in the queue, including lazily dropped ones.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of coordinates in any pipeline state.
    pub fn tracked_len(&self) -> usize {
        self.states.get().len()
    }

    /// Number of productions that failed since creation.
    pub fn generation_failures(&self) -> usize {
        self.generation_failures
    }

    /// Returns `true` once `shutdown()` has run.
    pub fn is_shut_down(&self) -> bool {
        self.completion_receiver.is_none()
    }

    /// Stops the scheduler.
    ///
    /// Clears the queue and the state table and closes the completion channel.
    /// Running workers are left to finish on their own; whatever they produce
    /// is discarded when their send fails.
    pub fn shutdown(&mut self) {
        if self.is_shut_down() {
            return;
        }
        self.queue.clear();
        self.states.get_mut().clear();
        self.completion_receiver = None;

        info!(
            "Streaming scheduler shut down, abandoning {} running workers",
            self.in_flight()
        );
    }

    /// Moves a queued coordinate to `Generating`.
    ///
    /// # Returns
    /// `false` if the coordinate is no longer queued.
    fn claim(&self, coordinate: ChunkCoordinate) -> bool {
        match self.states.get_mut().get_mut(&coordinate) {
            Some(state) if *state == ChunkState::Queued => {
                *state = ChunkState::Generating;
                true
            }
            _ => false,
        }
    }

    fn spawn_worker(
        &self,
        coordinate: ChunkCoordinate,
        mut slot: InFlightSlot,
    ) -> std::io::Result<()> {
        let producer = self.producer.clone();
        let sender = self.completion_sender.clone();

        thread::Builder::new()
            .name(format!("chunk-worker {}", coordinate))
            .spawn(move || {
                let started = Instant::now();
                let result = producer.produce(coordinate);
                let completion = Completion {
                    coordinate,
                    result,
                    elapsed: started.elapsed(),
                };

                slot.finish(completion.result.is_ok());
                if sender.send(completion).is_err() {
                    debug!("Discarding chunk {}: scheduler is gone", coordinate);
                }
                // `slot` drops here and releases the in-flight count.
            })
            // Workers are detached; `in_flight` is what tracks them.
            .map(drop)
    }
}

impl Drop for StreamingScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One occupied worker slot.
///
/// Dropping the slot decrements the in-flight counter. If the worker ended
/// without publishing an outcome through `finish`, the coordinate is also
/// removed from the state table so it can be requested again.
struct InFlightSlot {
    coordinate: ChunkCoordinate,
    in_flight: Arc<AtomicUsize>,
    states: StateTable,
    /// Set once `finish` has run. After that the coordinate may already
    /// belong to a newer worker, so `Drop` must leave the state table alone.
    published: bool,
}

impl InFlightSlot {
    /// Publishes the outcome before the completion is sent.
    fn finish(&mut self, succeeded: bool) {
        self.published = true;
        let mut states = self.states.get_mut();
        if states.get(&self.coordinate) != Some(&ChunkState::Generating) {
            // Forgotten or shut down while in flight.
            return;
        }
        if succeeded {
            states.insert(self.coordinate, ChunkState::ReadyForUpload);
        } else {
            states.remove(&self.coordinate);
        }
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        if !self.published {
            let mut states = self.states.get_mut();
            if states.get(&self.coordinate) == Some(&ChunkState::Generating) {
                error!("Worker for chunk {} ended without a result", self.coordinate);
                states.remove(&self.coordinate);
            }
        }
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use std::{
        collections::{BTreeSet, HashMap as Map},
        sync::atomic::AtomicBool,
        time::Duration,
    };

    /// Produces empty artifacts, optionally slowly, failing or panicking.
    #[derive(Default)]
    struct TestProducer {
        delay: Duration,
        fail: bool,
        panic: bool,
        running: AtomicUsize,
        peak: AtomicUsize,
        produced: AtomicUsize,
        hold: AtomicBool,
    }

    impl ChunkProducer for TestProducer {
        fn produce(&self, coordinate: ChunkCoordinate) -> Result<ChunkArtifact, GenerationError> {
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            thread::sleep(self.delay);
            while self.hold.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.panic {
                panic!("producer panicked for {coordinate}");
            }
            if self.fail {
                return Err(GenerationError::Other {
                    coordinate,
                    reason: "test failure".to_owned(),
                });
            }
            self.produced.fetch_add(1, Ordering::SeqCst);
            Ok(ChunkArtifact::new(coordinate, Map::new(), BTreeSet::new()))
        }
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while !condition() {
            assert!(std::time::Instant::now() < deadline, "timed out");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn duplicate_enqueue_is_ignored() {
        let producer = Arc::new(TestProducer::default());
        let mut scheduler = StreamingScheduler::new(producer.clone(), 4);
        let coordinate = ChunkCoordinate::new(2, 3);

        assert!(scheduler.enqueue(coordinate, 1.0));
        assert!(!scheduler.enqueue(coordinate, 0.5));
        assert_eq!(scheduler.queued_len(), 1);

        scheduler.dispatch();
        assert!(!scheduler.enqueue(coordinate, 0.5));
        wait_until(|| scheduler.in_flight() == 0);
        assert!(!scheduler.enqueue(coordinate, 0.5));

        let artifacts = scheduler.drain_ready(8);
        assert_eq!(artifacts.len(), 1);
        scheduler.mark_resident(coordinate);
        assert!(!scheduler.enqueue(coordinate, 0.5));
        assert_eq!(scheduler.dispatch(), 0);
        assert_eq!(producer.produced.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn state_moves_through_the_pipeline() {
        let producer = Arc::new(TestProducer {
            hold: AtomicBool::new(true),
            ..TestProducer::default()
        });
        let mut scheduler = StreamingScheduler::new(producer.clone(), 1);
        let coordinate = ChunkCoordinate::new(0, 0);

        assert_eq!(scheduler.state(coordinate), None);
        scheduler.enqueue(coordinate, 0.0);
        assert_eq!(scheduler.state(coordinate), Some(ChunkState::Queued));
        scheduler.dispatch();
        assert_eq!(scheduler.state(coordinate), Some(ChunkState::Generating));

        producer.hold.store(false, Ordering::SeqCst);
        wait_until(|| scheduler.in_flight() == 0);
        assert_eq!(scheduler.state(coordinate), Some(ChunkState::ReadyForUpload));

        assert_eq!(scheduler.drain_ready(1).len(), 1);
        scheduler.mark_resident(coordinate);
        assert_eq!(scheduler.state(coordinate), Some(ChunkState::Resident));
        assert_eq!(scheduler.forget(coordinate), Some(ChunkState::Resident));
        assert_eq!(scheduler.state(coordinate), None);
    }

    #[test]
    fn dispatch_order_follows_priority() {
        let producer = Arc::new(TestProducer::default());
        let mut scheduler = StreamingScheduler::new(producer, 1);
        scheduler.enqueue(ChunkCoordinate::new(5, 0), 5.0);
        scheduler.enqueue(ChunkCoordinate::new(1, 0), 1.0);
        scheduler.enqueue(ChunkCoordinate::new(3, 0), 3.0);

        let mut order = Vec::new();
        while order.len() < 3 {
            scheduler.dispatch();
            wait_until(|| scheduler.in_flight() == 0);
            order.extend(scheduler.drain_ready(1).iter().map(|a| a.coordinate().x));
        }
        assert_eq!(order, vec![1, 3, 5]);
    }

    #[test]
    fn drain_is_bounded_per_call() {
        let producer = Arc::new(TestProducer::default());
        let mut scheduler = StreamingScheduler::new(producer, 8);
        for x in 0..6 {
            scheduler.enqueue(ChunkCoordinate::new(x, 0), x as f32);
        }
        assert_eq!(scheduler.dispatch(), 6);
        wait_until(|| scheduler.in_flight() == 0);

        assert_eq!(scheduler.drain_ready(2).len(), 2);
        assert_eq!(scheduler.drain_ready(2).len(), 2);
        assert_eq!(scheduler.drain_ready(2).len(), 2);
        assert!(scheduler.drain_ready(2).is_empty());
    }

    #[test]
    fn failed_generation_releases_slot_and_coordinate() {
        let producer = Arc::new(TestProducer {
            fail: true,
            ..TestProducer::default()
        });
        let mut scheduler = StreamingScheduler::new(producer, 2);
        let coordinate = ChunkCoordinate::new(-1, 4);

        scheduler.enqueue(coordinate, 0.0);
        scheduler.dispatch();
        wait_until(|| scheduler.in_flight() == 0);

        assert_eq!(scheduler.state(coordinate), None);
        assert!(scheduler.drain_ready(4).is_empty());
        assert_eq!(scheduler.generation_failures(), 1);
        assert!(scheduler.enqueue(coordinate, 0.0));
    }

    /// Fails the first attempt at one coordinate, then holds later attempts
    /// at it until released. Every other coordinate succeeds immediately.
    struct RetryProducer {
        flaky: ChunkCoordinate,
        attempts: AtomicUsize,
        hold: AtomicBool,
    }

    impl ChunkProducer for RetryProducer {
        fn produce(&self, coordinate: ChunkCoordinate) -> Result<ChunkArtifact, GenerationError> {
            if coordinate == self.flaky {
                if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err(GenerationError::Other {
                        coordinate,
                        reason: "first attempt fails".to_owned(),
                    });
                }
                while self.hold.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            Ok(ChunkArtifact::new(coordinate, Map::new(), BTreeSet::new()))
        }
    }

    #[test]
    fn late_failed_worker_does_not_clear_its_retry() {
        let flaky = ChunkCoordinate::new(9, 9);
        let producer = Arc::new(RetryProducer {
            flaky,
            attempts: AtomicUsize::new(0),
            hold: AtomicBool::new(true),
        });
        let mut scheduler = StreamingScheduler::new(producer.clone(), 2);

        // Fill the completion channel to capacity.
        scheduler.enqueue(ChunkCoordinate::new(0, 0), 0.0);
        scheduler.enqueue(ChunkCoordinate::new(1, 0), 1.0);
        assert_eq!(scheduler.dispatch(), 2);
        wait_until(|| scheduler.in_flight() == 0);

        // The first attempt fails and its worker blocks on the full channel.
        scheduler.enqueue(flaky, 2.0);
        assert_eq!(scheduler.dispatch(), 1);
        wait_until(|| scheduler.state(flaky).is_none());
        assert_eq!(scheduler.in_flight(), 1);

        // The retry is held while the first worker is still blocked.
        assert!(scheduler.enqueue(flaky, 2.0));
        assert_eq!(scheduler.dispatch(), 1);
        assert_eq!(scheduler.state(flaky), Some(ChunkState::Generating));
        wait_until(|| producer.attempts.load(Ordering::SeqCst) == 2);

        // Making room lets the first worker send and drop its slot.
        let first = scheduler.drain_ready(1);
        assert_eq!(first.len(), 1);
        wait_until(|| scheduler.in_flight() == 1);

        assert_eq!(scheduler.state(flaky), Some(ChunkState::Generating));
        assert!(!scheduler.enqueue(flaky, 2.0));

        producer.hold.store(false, Ordering::SeqCst);
        wait_until(|| scheduler.in_flight() == 0);
        assert_eq!(scheduler.state(flaky), Some(ChunkState::ReadyForUpload));

        let mut artifacts = Vec::new();
        for _ in 0..3 {
            artifacts.extend(scheduler.drain_ready(1));
        }
        assert_eq!(scheduler.generation_failures(), 1);
        let coordinates: Vec<_> = artifacts.iter().map(|a| a.coordinate()).collect();
        assert_eq!(coordinates.len(), 2);
        assert_ne!(coordinates[0], first[0].coordinate());
        assert_eq!(coordinates[1], flaky);
    }

    #[test]
    fn panicking_worker_releases_slot() {
        let producer = Arc::new(TestProducer {
            panic: true,
            ..TestProducer::default()
        });
        let mut scheduler = StreamingScheduler::new(producer, 1);
        let coordinate = ChunkCoordinate::new(7, 7);

        scheduler.enqueue(coordinate, 0.0);
        scheduler.dispatch();
        wait_until(|| scheduler.in_flight() == 0);

        assert_eq!(scheduler.state(coordinate), None);
        assert!(scheduler.enqueue(coordinate, 0.0));
        assert_eq!(scheduler.dispatch(), 1);
        wait_until(|| scheduler.in_flight() == 0);
    }

    #[test]
    fn concurrency_never_exceeds_cap_under_random_sequences() {
        let cap = 4;
        let producer = Arc::new(TestProducer {
            delay: Duration::from_millis(2),
            ..TestProducer::default()
        });
        let mut scheduler = StreamingScheduler::new(producer.clone(), cap);
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut received = 0;
        let mut requested = 0;

        for _ in 0..300 {
            match rng.u8(0..3) {
                0 => {
                    for _ in 0..rng.usize(1..6) {
                        let coordinate = ChunkCoordinate::new(rng.i32(-10..10), rng.i32(-10..10));
                        if scheduler.enqueue(coordinate, rng.f32() * 10.0) {
                            requested += 1;
                        }
                    }
                }
                1 => {
                    scheduler.dispatch();
                }
                _ => {
                    for artifact in scheduler.drain_ready(rng.usize(1..4)) {
                        scheduler.mark_resident(artifact.coordinate());
                        received += 1;
                    }
                }
            }
            assert!(scheduler.in_flight() <= cap);
            assert!(producer.peak.load(Ordering::SeqCst) <= cap);
        }

        while received < requested {
            scheduler.dispatch();
            for artifact in scheduler.drain_ready(4) {
                scheduler.mark_resident(artifact.coordinate());
                received += 1;
            }
            assert!(scheduler.in_flight() <= cap);
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(received, requested);
        assert_eq!(producer.produced.load(Ordering::SeqCst), requested);
        assert!(producer.peak.load(Ordering::SeqCst) <= cap);
    }

    #[test]
    fn pruned_requests_are_never_dispatched() {
        let producer = Arc::new(TestProducer::default());
        let mut scheduler = StreamingScheduler::new(producer.clone(), 4);
        for x in 0..4 {
            scheduler.enqueue(ChunkCoordinate::new(x, 0), x as f32);
        }

        assert_eq!(scheduler.prune_queued(|coordinate| coordinate.x < 2), 2);
        assert_eq!(scheduler.state(ChunkCoordinate::new(3, 0)), None);
        assert_eq!(scheduler.dispatch(), 2);
        wait_until(|| scheduler.in_flight() == 0);
        assert_eq!(producer.produced.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn completions_after_shutdown_are_discarded() {
        let producer = Arc::new(TestProducer {
            hold: AtomicBool::new(true),
            ..TestProducer::default()
        });
        let mut scheduler = StreamingScheduler::new(producer.clone(), 2);
        scheduler.enqueue(ChunkCoordinate::new(0, 0), 0.0);
        scheduler.enqueue(ChunkCoordinate::new(1, 0), 1.0);
        scheduler.enqueue(ChunkCoordinate::new(2, 0), 2.0);
        assert_eq!(scheduler.dispatch(), 2);

        scheduler.shutdown();
        producer.hold.store(false, Ordering::SeqCst);
        wait_until(|| scheduler.in_flight() == 0);

        assert!(scheduler.is_shut_down());
        assert_eq!(scheduler.tracked_len(), 0);
        assert!(scheduler.drain_ready(8).is_empty());
        assert!(!scheduler.enqueue(ChunkCoordinate::new(0, 0), 0.0));
        assert_eq!(scheduler.dispatch(), 0);
    }
}
