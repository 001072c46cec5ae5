//! Bounded wait for replica threads after `START REPLICA`

use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::observability::{warn_event, Event};
use crate::server::{ServerHandle, ServerResult};

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Default interval with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            timeout,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_TIMEOUT)
    }
}

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WaitOutcome {
    /// Threads reported present after `polls` status reads
    Ready { polls: u32 },
    /// Budget spent without seeing threads
    TimedOut { polls: u32 },
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready { .. })
    }
}

/// Poll the replica until its threads are present or the policy runs out.
///
/// The status is read at least once. A timeout is logged and returned, not
/// raised; the verifier reports whatever state the threads are in.
pub fn wait_for_replica_threads(
    replica: &mut dyn ServerHandle,
    policy: &WaitPolicy,
) -> ServerResult<WaitOutcome> {
    let started = Instant::now();
    let mut polls = 0u32;

    loop {
        polls += 1;
        let present = replica
            .replica_status()?
            .map(|status| status.threads_present())
            .unwrap_or(false);
        if present {
            return Ok(WaitOutcome::Ready { polls });
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            let timeout_secs = policy.timeout.as_secs().to_string();
            let polls_str = polls.to_string();
            warn_event(
                Event::ReplicaWaitTimedOut,
                &[
                    ("replica", replica.name()),
                    ("timeout_secs", &timeout_secs),
                    ("polls", &polls_str),
                ],
            );
            return Ok(WaitOutcome::TimedOut { polls });
        }

        thread::sleep(policy.interval.min(policy.timeout - elapsed));
    }
}
