//! # Job Dispatcher
//!
//! Runs [`HashComputer`] on a background worker pool and delivers each result
//! to its completion handler on the thread that owns the dispatcher.
//!
//! Handlers never leave the owning thread. Workers only see the path and send
//! back a [`JobEvent`] over a channel; the owner drains the channel with
//! [`JobDispatcher::dispatch_pending`] or [`JobDispatcher::wait_all`] and
//! invokes the matching handler. Handlers therefore do not need to be `Send`,
//! and they run in completion order, not submission order.
//!
//! A submitted job always runs to completion. There is no cancellation.

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fingerprint::{EncodedFingerprint, Fingerprint, SENTINEL};

use super::hash_computer::HashComputer;

/// Identifies a job within one dispatcher
pub type JobId = u64;

/// Invoked exactly once with `(error, encoded_fingerprint)`
pub type CompletionHandler = Box<dyn FnOnce(Option<Error>, EncodedFingerprint)>;

/// Lifecycle of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Scheduled,
    Running,
    Completed,
}

/// Message from a worker to the owning thread
#[derive(Debug)]
enum JobEvent {
    Started(JobId),
    Finished {
        id: JobId,
        outcome: Result<Fingerprint>,
    },
}

/// Worker-side half of a job: everything needed to compute, nothing to report
struct Job {
    id: JobId,
    path: PathBuf,
    state: JobState,
}

impl Job {
    fn new(id: JobId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            state: JobState::Created,
        }
    }

    fn run(mut self, computer: &HashComputer, events: &Sender<JobEvent>) {
        self.state = JobState::Running;
        // The owner may already be gone; the job still runs to completion
        let _ = events.send(JobEvent::Started(self.id));

        let outcome = computer.compute(&self.path);
        self.state = JobState::Completed;
        trace!("Job {} {:?}: {}", self.id, self.state, self.path.display());

        if events
            .send(JobEvent::Finished {
                id: self.id,
                outcome,
            })
            .is_err()
        {
            debug!(
                "Dispatcher dropped before job {} finished; discarding result for {}",
                self.id,
                self.path.display()
            );
        }
    }
}

/// Owner-side half of a job
struct PendingJob {
    path: PathBuf,
    state: JobState,
    handler: CompletionHandler,
}

/// Schedules hash jobs on a worker pool and routes results back to handlers
pub struct JobDispatcher {
    computer: HashComputer,
    pool: rayon::ThreadPool,
    sender: Sender<JobEvent>,
    receiver: Receiver<JobEvent>,
    pending: HashMap<JobId, PendingJob>,
    next_id: JobId,
}

impl JobDispatcher {
    /// Create a dispatcher backed by `threads` workers
    pub fn new(computer: HashComputer, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("phash-worker-{}", i))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))?;

        let (sender, receiver) = unbounded();

        info!("Job dispatcher started with {} workers", pool.current_num_threads());

        Ok(Self {
            computer,
            pool,
            sender,
            receiver,
            pending: HashMap::new(),
            next_id: 0,
        })
    }

    /// Schedule fingerprinting of `path`.
    ///
    /// Fails with [`Error::InvalidArgument`] when no handler is supplied, in
    /// which case nothing is scheduled.
    pub fn submit<P, H>(&mut self, path: P, handler: Option<H>) -> Result<JobId>
    where
        P: AsRef<Path>,
        H: FnOnce(Option<Error>, EncodedFingerprint) + 'static,
    {
        let handler = handler.ok_or_else(|| {
            Error::InvalidArgument("Callback is required and must be a function".to_string())
        })?;

        let id = self.next_id;
        self.next_id += 1;

        let path = path.as_ref().to_path_buf();
        let mut job = Job::new(id, path.clone());
        job.state = JobState::Scheduled;

        self.pending.insert(
            id,
            PendingJob {
                path,
                state: job.state,
                handler: Box::new(handler),
            },
        );

        let computer = self.computer.clone();
        let events = self.sender.clone();
        self.pool.spawn(move || job.run(&computer, &events));

        debug!("Scheduled job {}", id);
        Ok(id)
    }

    /// Deliver every result that is already available without blocking.
    /// Returns the number of handlers invoked.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if self.handle(event) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Block until every submitted job has had its handler invoked.
    /// Returns the number of handlers invoked.
    pub fn wait_all(&mut self) -> usize {
        let mut delivered = 0;
        while !self.pending.is_empty() {
            // The dispatcher holds a sender, so the channel never disconnects
            match self.receiver.recv() {
                Ok(event) => {
                    if self.handle(event) {
                        delivered += 1;
                    }
                }
                Err(_) => break,
            }
        }
        delivered
    }

    /// Number of jobs whose handler has not run yet
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Last observed state of a job still owned by the dispatcher
    pub fn state(&self, id: JobId) -> Option<JobState> {
        self.pending.get(&id).map(|job| job.state)
    }

    fn handle(&mut self, event: JobEvent) -> bool {
        match event {
            JobEvent::Started(id) => {
                if let Some(job) = self.pending.get_mut(&id) {
                    job.state = JobState::Running;
                }
                false
            }
            JobEvent::Finished { id, outcome } => {
                let Some(mut job) = self.pending.remove(&id) else {
                    return false;
                };
                job.state = JobState::Completed;

                let (error, encoded) = match outcome {
                    Ok(fingerprint) => (None, fingerprint.encode()),
                    Err(e) => (Some(e), SENTINEL.to_string()),
                };
                debug!(
                    "Job {} completed for {}: {}",
                    id,
                    job.path.display(),
                    encoded
                );

                (job.handler)(error, encoded);
                true
            }
        }
    }
}

impl std::fmt::Debug for JobDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("computer", &self.computer)
            .field("workers", &self.pool.current_num_threads())
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::transform::PerceptualTransform;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Fingerprint is the file length, so every file hashes to something known
    struct FileLength;

    impl PerceptualTransform for FileLength {
        fn hash_file(&self, path: &Path) -> Result<Fingerprint> {
            Ok(Fingerprint(std::fs::metadata(path)?.len()))
        }

        fn name(&self) -> &'static str {
            "file-length"
        }
    }

    struct Exploding;

    impl PerceptualTransform for Exploding {
        fn hash_file(&self, _path: &Path) -> Result<Fingerprint> {
            panic!("decoder exploded on worker");
        }

        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    type Results = Rc<RefCell<Vec<(Option<String>, EncodedFingerprint)>>>;

    fn dispatcher(threads: usize) -> JobDispatcher {
        JobDispatcher::new(HashComputer::new(Arc::new(FileLength)), threads).unwrap()
    }

    fn recorder(results: &Results) -> impl FnOnce(Option<Error>, EncodedFingerprint) {
        let results = results.clone();
        move |error, encoded| {
            results
                .borrow_mut()
                .push((error.map(|e| e.to_string()), encoded))
        }
    }

    #[test]
    fn test_missing_handler_is_rejected() {
        let mut dispatcher = dispatcher(1);
        let result = dispatcher.submit(
            "/no/such/file.png",
            None::<fn(Option<Error>, EncodedFingerprint)>,
        );

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(dispatcher.wait_all(), 0);
    }

    #[test]
    fn test_missing_file_reports_error() {
        let mut dispatcher = dispatcher(2);
        let results: Results = Rc::default();

        dispatcher
            .submit("/no/such/file.png", Some(recorder(&results)))
            .unwrap();
        assert_eq!(dispatcher.wait_all(), 1);

        let results = results.borrow();
        assert_eq!(results.len(), 1);
        assert!(results[0].0.is_some());
        assert_eq!(results[0].1, "0");
    }

    #[test]
    fn test_worker_panic_is_delivered_as_transform_fault() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"DUMMY IMAGE DATA").unwrap();

        let mut dispatcher =
            JobDispatcher::new(HashComputer::new(Arc::new(Exploding)), 2).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..3 {
            let sink = seen.clone();
            dispatcher
                .submit(&path, Some(move |error: Option<Error>, value: EncodedFingerprint| {
                    sink.borrow_mut().push((error, value));
                }))
                .unwrap();
        }
        assert_eq!(dispatcher.wait_all(), 3);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        for (error, value) in seen.iter() {
            match error {
                Some(Error::TransformFault { reason, .. }) => {
                    assert!(reason.contains("decoder exploded on worker"))
                }
                other => panic!("unexpected error: {:?}", other),
            }
            assert_eq!(value, "0");
        }

        // Workers survive the panics and keep serving jobs
        let results: Results = Rc::default();
        dispatcher.submit("/no/such/file.png", Some(recorder(&results))).unwrap();
        assert_eq!(dispatcher.wait_all(), 1);
        assert_eq!(results.borrow().len(), 1);
    }

    #[test]
    fn test_many_jobs_each_delivered_once() {
        let dir = tempdir().unwrap();
        let mut dispatcher = dispatcher(4);
        let results: Results = Rc::default();

        for i in 1..=20usize {
            let path = dir.path().join(format!("file-{}.bin", i));
            std::fs::write(&path, vec![0u8; i]).unwrap();
            dispatcher.submit(&path, Some(recorder(&results))).unwrap();
        }

        assert_eq!(dispatcher.wait_all(), 20);
        assert_eq!(dispatcher.pending(), 0);

        let results = results.borrow();
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|(error, _)| error.is_none()));

        let mut values: Vec<u64> = results.iter().map(|(_, v)| v.parse().unwrap()).collect();
        values.sort_unstable();
        assert_eq!(values, (1..=20).collect::<Vec<u64>>());
    }

    #[test]
    fn test_zero_fingerprint_is_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let mut dispatcher = dispatcher(1);
        let results: Results = Rc::default();
        dispatcher.submit(&path, Some(recorder(&results))).unwrap();
        dispatcher.wait_all();

        let results = results.borrow();
        assert_eq!(results[0], (None, "0".to_string()));
    }

    #[test]
    fn test_state_tracking() {
        let mut dispatcher = dispatcher(1);
        let results: Results = Rc::default();

        let id = dispatcher
            .submit("/no/such/file.png", Some(recorder(&results)))
            .unwrap();
        assert!(matches!(
            dispatcher.state(id),
            Some(JobState::Scheduled) | Some(JobState::Running)
        ));

        dispatcher.wait_all();
        assert_eq!(dispatcher.state(id), None);
    }

    #[test]
    fn test_dispatch_pending_eventually_delivers() {
        let mut dispatcher = dispatcher(1);
        let results: Results = Rc::default();
        dispatcher
            .submit("/no/such/file.png", Some(recorder(&results)))
            .unwrap();

        let mut delivered = 0;
        for _ in 0..500 {
            delivered += dispatcher.dispatch_pending();
            if delivered == 1 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(delivered, 1);
        assert_eq!(results.borrow().len(), 1);
    }
}
