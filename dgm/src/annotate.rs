use crate::error::AnnotationError;
use crate::reference::ReferenceSet;
use log::{debug, warn};
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Outcome of annotating a motif against the reference collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Best matching reference identifier
    Matched(String),
    /// The service answered without a match
    Unmatched,
    /// The service failed for this query
    Unknown,
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Annotation::Matched(id) => write!(f, "{}", id),
            Annotation::Unmatched => write!(f, "unmatched"),
            Annotation::Unknown => write!(f, "unknown"),
        }
    }
}

/// Identity search of a query sequence against a reference collection bound at construction.
/// Returns the best matching reference identifier or `None`.
pub trait Annotator: Send + Sync {
    /// Searches the references for `query`
    fn annotate(&self, query: &[u8]) -> Result<Option<String>, AnnotationError>;
}

/// Exact search of the query on both strands of every reference. The reference with the most
/// hits wins, ties go to the earlier reference.
#[derive(Debug)]
pub struct FmIndexAnnotator {
    references: ReferenceSet,
}

impl FmIndexAnnotator {
    /// Annotator over an indexed reference set
    pub fn new(references: ReferenceSet) -> Self {
        Self { references }
    }
}

impl Annotator for FmIndexAnnotator {
    fn annotate(&self, query: &[u8]) -> Result<Option<String>, AnnotationError> {
        let best = self
            .references
            .iter()
            .map(|reference| (reference, reference.count_hits(query)))
            .filter(|(_, hits)| *hits > 0)
            .fold(None, |best: Option<(&str, usize)>, (reference, hits)| match best {
                Some((_, best_hits)) if best_hits >= hits => best,
                _ => Some((reference.id(), hits)),
            });
        Ok(best.map(|(id, _)| id.to_string()))
    }
}

/// Runs each query of the wrapped annotator on a worker thread with a timeout, retrying
/// failures with exponential backoff.
#[derive(Clone)]
pub struct GuardedAnnotator {
    inner: Arc<dyn Annotator>,
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

impl std::fmt::Debug for GuardedAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedAnnotator")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl GuardedAnnotator {
    /// Guards `inner` with a per-query `timeout` and up to `retries` further attempts
    pub fn new(inner: Arc<dyn Annotator>, timeout: Duration, retries: u32) -> Self {
        Self {
            inner,
            timeout,
            retries,
            backoff: Duration::from_millis(250),
        }
    }

    /// Delay before the first retry, doubled on every further attempt
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn attempt(&self, query: &[u8]) -> Result<Option<String>, AnnotationError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let query = query.to_vec();
        std::thread::spawn(move || {
            let _ = tx.send(inner.annotate(&query));
        });
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(AnnotationError::Timeout(self.timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(AnnotationError::Disconnected),
        }
    }
}

impl Annotator for GuardedAnnotator {
    fn annotate(&self, query: &[u8]) -> Result<Option<String>, AnnotationError> {
        let mut delay = self.backoff;
        let mut attempt = 0;
        loop {
            match self.attempt(query) {
                Ok(hit) => return Ok(hit),
                Err(e) if attempt < self.retries => {
                    debug!(
                        "Annotation of {} failed ({}), retrying in {:?}",
                        String::from_utf8_lossy(query),
                        e,
                        delay
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Annotates `query`, degrading any service failure to [`Annotation::Unknown`]
pub fn annotate_or_degrade(annotator: &dyn Annotator, query: &[u8]) -> Annotation {
    match annotator.annotate(query) {
        Ok(Some(id)) => Annotation::Matched(id),
        Ok(None) => Annotation::Unmatched,
        Err(e) => {
            warn!(
                "Annotation failed for {}: {}",
                String::from_utf8_lossy(query),
                e
            );
            Annotation::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl Annotator for Flaky {
        fn annotate(&self, _query: &[u8]) -> Result<Option<String>, AnnotationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(AnnotationError::Service("busy".to_string()))
            } else {
                Ok(Some("found".to_string()))
            }
        }
    }

    struct Stalled;

    impl Annotator for Stalled {
        fn annotate(&self, _query: &[u8]) -> Result<Option<String>, AnnotationError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(None)
        }
    }

    #[test]
    fn test_best_match_by_hits() {
        let references = ReferenceSet::from_sequences(vec![
            ("single", "TTTTACGTACCCCC"),
            ("double", "ACGTACGGGACGTACGG"),
            ("none", "GGGGGGGGGGGG"),
        ]);
        let annotator = FmIndexAnnotator::new(references);

        assert_eq!(
            annotator.annotate(b"ACGTAC").unwrap(),
            Some("double".to_string())
        );
        assert_eq!(
            annotator.annotate(b"TTTTAC").unwrap(),
            Some("single".to_string())
        );
        assert_eq!(annotator.annotate(b"CATCAT").unwrap(), None);
    }

    #[test]
    fn test_ties_go_to_first_reference() {
        let references =
            ReferenceSet::from_sequences(vec![("first", "AACCGGTTA"), ("second", "AACCGGTTC")]);
        let annotator = FmIndexAnnotator::new(references);
        assert_eq!(
            annotator.annotate(b"CCGG").unwrap(),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_guard_retries_then_succeeds() {
        let flaky = Arc::new(Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let guarded = GuardedAnnotator::new(flaky.clone(), Duration::from_secs(5), 2)
            .with_backoff(Duration::from_millis(1));

        assert_eq!(guarded.annotate(b"ACGT").unwrap(), Some("found".to_string()));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_guard_gives_up() {
        let flaky = Arc::new(Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
        });
        let guarded = GuardedAnnotator::new(flaky, Duration::from_secs(5), 1)
            .with_backoff(Duration::from_millis(1));

        assert_eq!(
            annotate_or_degrade(&guarded, b"ACGT"),
            Annotation::Unknown
        );
    }

    #[test]
    fn test_guard_times_out() {
        let guarded = GuardedAnnotator::new(Arc::new(Stalled), Duration::from_millis(20), 0);
        assert_eq!(
            guarded.annotate(b"ACGT"),
            Err(AnnotationError::Timeout(Duration::from_millis(20)))
        );
    }
}
