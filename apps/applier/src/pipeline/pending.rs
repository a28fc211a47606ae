//! Jobs that passed dedupe, threshold and tailoring in the current cycle and
//! are waiting for submission.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::models::job::JobPosting;
use crate::models::matching::MatchResult;

#[derive(Debug, Clone)]
pub struct PendingJob {
    pub job: JobPosting,
    pub match_result: MatchResult,
    pub artifact: PathBuf,
}

/// FIFO of tailored jobs, owned by one cycle.
///
/// A url is accepted at most once per queue, even after it has been taken
/// back out, so no job can reach the submitter twice in a cycle.
#[derive(Debug, Default)]
pub struct PendingJobs {
    queue: VecDeque<PendingJob>,
    admitted: HashSet<String>,
}

impl PendingJobs {
    /// Returns false (and drops `item`) when its url was already admitted.
    pub fn push(&mut self, item: PendingJob) -> bool {
        if !self.admitted.insert(item.job.url.clone()) {
            return false;
        }
        self.queue.push_back(item);
        true
    }

    pub fn pop(&mut self) -> Option<PendingJob> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::job;
    use std::collections::BTreeSet;

    fn pending(url: &str) -> PendingJob {
        PendingJob {
            job: job(url),
            match_result: MatchResult::new(75.0, BTreeSet::new(), BTreeSet::new()),
            artifact: PathBuf::from(format!("out/{url}.txt")),
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = PendingJobs::default();
        assert!(queue.push(pending("a")));
        assert!(queue.push(pending("b")));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().job.url, "a");
        assert_eq!(queue.pop().unwrap().job.url, "b");
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_url_admitted_once_even_after_pop() {
        let mut queue = PendingJobs::default();
        assert!(queue.push(pending("a")));
        assert!(!queue.push(pending("a")));
        queue.pop();
        assert!(!queue.push(pending("a")));
        assert!(queue.is_empty());
    }
}
