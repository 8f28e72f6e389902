//! Document-level parallelism.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::{CharacterExtractor, Pipeline, ProcessedDocument};
use crate::error::{Error, Result};
use crate::model::Document;

type Queue<T> = Arc<Mutex<VecDeque<(usize, T)>>>;

enum Event<R> {
    Started(usize, Instant),
    Finished(usize, Result<R>),
    Skipped(usize),
}

/// Runs a per-document job over many documents on a bounded pool of worker
/// threads.
///
/// Workers pull inputs from a shared queue. Each input is processed start to
/// finish by one thread; the cancellation flag is checked only before an input
/// starts.
///
/// With a timeout set, an input still running when its deadline passes gets
/// an [`Error::Timeout`] slot. Its worker is abandoned and a fresh one takes
/// over the remaining queue, so a stuck input never holds up the others.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    workers: usize,
    timeout: Option<Duration>,
    cancelled: Arc<AtomicBool>,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }
}

impl BatchProcessor {
    /// Create a processor with at most `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            timeout: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Give every input at most `timeout` from the moment it starts.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Share an external cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Per-input deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Handle for cancelling from another thread.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Stop starting new documents.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run the full pipeline over `documents`.
    ///
    /// Results are in input order; `None` marks a document skipped after
    /// cancellation.
    pub fn process(
        &self,
        pipeline: &Arc<Pipeline>,
        documents: Vec<Document>,
    ) -> Vec<Option<Result<ProcessedDocument>>> {
        let pipeline = Arc::clone(pipeline);
        self.run(documents, move |document| pipeline.process(document))
    }

    /// Segment and order `documents` without classification.
    pub fn structure(
        &self,
        pipeline: &Arc<Pipeline>,
        documents: Vec<Document>,
    ) -> Vec<Option<Result<Document>>> {
        let pipeline = Arc::clone(pipeline);
        self.run(documents, move |document| pipeline.structure(document))
    }

    /// Extract and fully process every file in `paths`.
    ///
    /// Extraction runs inside the per-file job, so it is covered by the
    /// timeout and a slow file only occupies one worker.
    pub fn process_files(
        &self,
        pipeline: &Arc<Pipeline>,
        extractor: Arc<dyn CharacterExtractor>,
        paths: Vec<PathBuf>,
    ) -> Vec<Option<Result<ProcessedDocument>>> {
        let pipeline = Arc::clone(pipeline);
        self.run(paths, move |path| {
            let document = extract_path(extractor.as_ref(), &path)?;
            pipeline.process(document)
        })
    }

    /// Extract, segment and order every file in `paths`.
    pub fn structure_files(
        &self,
        pipeline: &Arc<Pipeline>,
        extractor: Arc<dyn CharacterExtractor>,
        paths: Vec<PathBuf>,
    ) -> Vec<Option<Result<Document>>> {
        let pipeline = Arc::clone(pipeline);
        self.run(paths, move |path| {
            let document = extract_path(extractor.as_ref(), &path)?;
            pipeline.structure(document)
        })
    }

    /// Apply `job` to every input on the worker pool.
    ///
    /// A failing or timed out input only affects its own slot.
    pub fn run<T, R, F>(&self, inputs: Vec<T>, job: F) -> Vec<Option<Result<R>>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        let total = inputs.len();
        let mut results: Vec<Option<Result<R>>> = (0..total).map(|_| None).collect();
        let workers = self.workers.min(total);

        let queue: Queue<T> = Arc::new(Mutex::new(inputs.into_iter().enumerate().collect()));
        let job = Arc::new(job);
        let (sender, receiver) = channel();
        for _ in 0..workers {
            self.spawn_worker(&queue, &job, &sender);
        }
        // replacements for abandoned workers need a sender
        let sender = self.timeout.map(|_| sender);

        let mut running: HashMap<usize, Instant> = HashMap::new();
        let mut settled = 0;
        while settled < total {
            let event = match self.timeout {
                None => match receiver.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
                Some(timeout) => {
                    let now = Instant::now();
                    let wait = running
                        .values()
                        .map(|started| (*started + timeout).saturating_duration_since(now))
                        .min()
                        .unwrap_or(timeout);
                    match receiver.recv_timeout(wait) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => {
                            let now = Instant::now();
                            let expired: Vec<usize> = running
                                .iter()
                                .filter(|(_, started)| now.duration_since(**started) >= timeout)
                                .map(|(index, _)| *index)
                                .collect();
                            for index in expired {
                                running.remove(&index);
                                log::warn!("Input {} exceeded its {:?} deadline", index, timeout);
                                results[index] = Some(Err(Error::Timeout(format!(
                                    "input {} after {:?}",
                                    index, timeout
                                ))));
                                settled += 1;
                                if let Some(sender) = &sender {
                                    self.spawn_worker(&queue, &job, sender);
                                }
                            }
                            continue;
                        },
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                },
            };

            match event {
                Event::Started(index, started) => {
                    running.insert(index, started);
                },
                Event::Finished(index, result) => {
                    if results[index].is_some() {
                        log::debug!("Discarding late result for input {}", index);
                        continue;
                    }
                    running.remove(&index);
                    if let Err(e) = &result {
                        log::warn!("Input {} failed: {}", index, e);
                    }
                    results[index] = Some(result);
                    settled += 1;
                },
                Event::Skipped(index) => {
                    log::debug!("Batch cancelled, skipping input {}", index);
                    settled += 1;
                },
            }
        }

        let done = results.iter().filter(|r| r.is_some()).count();
        log::info!(
            "Batch finished: {}/{} inputs processed with {} workers",
            done,
            total,
            workers
        );
        results
    }

    fn spawn_worker<T, R, F>(&self, queue: &Queue<T>, job: &Arc<F>, sender: &Sender<Event<R>>)
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        let queue = Arc::clone(queue);
        let job = Arc::clone(job);
        let sender = sender.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let spawned = thread::Builder::new()
            .name("zone-oxide-worker".to_string())
            .spawn(move || loop {
                // a poisoned queue is treated as drained
                let next = queue.lock().ok().and_then(|mut q| q.pop_front());
                let Some((index, input)) = next else {
                    break;
                };
                // the receiver may be gone after a timeout
                if cancelled.load(Ordering::SeqCst) {
                    let _ = sender.send(Event::Skipped(index));
                    continue;
                }
                let _ = sender.send(Event::Started(index, Instant::now()));
                let result = job(input);
                let _ = sender.send(Event::Finished(index, result));
            });
        if let Err(e) = spawned {
            log::error!("Failed to spawn batch worker: {}", e);
        }
    }
}

fn extract_path(extractor: &dyn CharacterExtractor, path: &Path) -> Result<Document> {
    let mut file = std::fs::File::open(path)?;
    let document = extractor.extract_characters(&mut file)?;
    log::debug!(
        "{} read {} pages from {}",
        extractor.name(),
        document.pages().len(),
        path.display()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_input_order() {
        let results = BatchProcessor::new(3).run((0..20).collect(), |i: i32| Ok(i * 2));
        let values: Vec<i32> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();
        assert_eq!(values, (0..20).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_failure_is_isolated() {
        let results = BatchProcessor::new(2).run(vec![1, 0, 3], |i: i32| {
            if i == 0 {
                Err(Error::MalformedInput("zero".to_string()))
            } else {
                Ok(10 / i)
            }
        });
        assert!(matches!(results[0], Some(Ok(10))));
        assert!(matches!(results[1], Some(Err(Error::MalformedInput(_)))));
        assert!(matches!(results[2], Some(Ok(3))));
    }

    #[test]
    fn test_cancelled_before_start() {
        let processor = BatchProcessor::new(2);
        processor.cancel();
        assert!(processor.is_cancelled());
        let results = processor.run(vec![1, 2, 3], Ok::<i32, Error>);
        assert!(results.iter().all(Option::is_none));
    }

    #[test]
    fn test_cancel_between_inputs() {
        let processor = BatchProcessor::new(1);
        let flag = processor.cancel_flag();
        let results = processor.run(vec![1, 2, 3], move |i: i32| {
            flag.store(true, Ordering::SeqCst);
            Ok(i)
        });
        assert!(matches!(results[0], Some(Ok(1))));
        assert!(results[1].is_none());
        assert!(results[2].is_none());
    }

    #[test]
    fn test_empty_batch() {
        let results = BatchProcessor::new(4).run(Vec::<i32>::new(), Ok::<i32, Error>);
        assert!(results.is_empty());
    }

    #[test]
    fn test_slow_input_times_out_alone() {
        let processor = BatchProcessor::new(1).with_timeout(Duration::from_millis(100));
        assert_eq!(processor.timeout(), Some(Duration::from_millis(100)));
        let results = processor.run(vec![0u64, 2_000, 0], |ms| {
            thread::sleep(Duration::from_millis(ms));
            Ok(ms)
        });
        assert!(matches!(results[0], Some(Ok(0))));
        assert!(matches!(results[1], Some(Err(Error::Timeout(_)))));
        // picked up by the replacement worker
        assert!(matches!(results[2], Some(Ok(0))));
    }

    #[test]
    fn test_timeout_leaves_fast_inputs_alone() {
        let processor = BatchProcessor::new(2).with_timeout(Duration::from_secs(10));
        let results = processor.run((0..8).collect(), |i: i32| Ok(i + 1));
        assert!(results
            .iter()
            .enumerate()
            .all(|(i, r)| matches!(r, Some(Ok(v)) if *v == i as i32 + 1)));
    }
}
