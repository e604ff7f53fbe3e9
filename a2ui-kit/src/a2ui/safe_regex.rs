//! Safe Regular Expressions
//!
//! Agents can ship arbitrary patterns (the `regex` check, `validationRegexp`
//! on text fields). Patterns are screened for known catastrophic shapes
//! before they are compiled, and every match runs on a long-lived worker
//! thread. A match that outlives the timeout is abandoned together with its
//! worker; the next match starts a fresh one.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread;
use std::time::Duration;

use regex::{Regex, RegexBuilder};

/// Maximum pattern length accepted by the guard.
pub const MAX_PATTERN_LENGTH: usize = 100;

/// Maximum number of `(` in a pattern.
pub const MAX_GROUP_COUNT: usize = 10;

/// Default wall-clock budget for a single match.
pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_millis(100);

/// Compiled program size limit, keeps hostile repetition counts cheap.
const COMPILED_SIZE_LIMIT: usize = 1 << 20;

/// Overlapping alternations that backtrack exponentially in most engines.
const CATASTROPHIC_SHAPES: &[&str] = &[
    "(a|a)*",
    "(a|aa)*",
    "(a|aa)+",
    "(.|\\s)*",
    "(.|\\n)*",
    "(\\w|\\d)+",
    "(\\d|\\d\\d)+",
    "(.*|.+)",
    "(.*)*",
    "(.+)+",
];

/// Result of a guarded match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NotMatched,
    /// The pattern was rejected, failed to compile, or the match timed out.
    Unsafe,
}

impl MatchOutcome {
    /// Fail-closed view: only an actual match counts.
    pub fn is_match(self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }
}

/// Why a pattern was refused before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafePattern {
    TooLong,
    CatastrophicShape,
    AdjacentQuantifiers,
    TooManyGroups,
}

fn nested_quantifier() -> &'static Regex {
    static NESTED: OnceLock<Regex> = OnceLock::new();
    // A group whose body repeats, itself repeated: (x+)+ (x*)* (x+){2,}
    NESTED.get_or_init(|| {
        Regex::new(r"\((?:[^()\\]|\\.)*[*+](?:[^()\\]|\\.)*\)[*+{]")
            .expect("static pattern compiles")
    })
}

/// Screen a pattern without running it.
pub fn check_pattern(pattern: &str) -> Result<(), UnsafePattern> {
    if pattern.chars().count() > MAX_PATTERN_LENGTH {
        return Err(UnsafePattern::TooLong);
    }
    if CATASTROPHIC_SHAPES.iter().any(|shape| pattern.contains(shape))
        || nested_quantifier().is_match(pattern)
    {
        return Err(UnsafePattern::CatastrophicShape);
    }
    let quantifier = |c: char| matches!(c, '*' | '+' | '?');
    let chars: Vec<char> = pattern.chars().collect();
    if chars.windows(2).any(|w| quantifier(w[0]) && quantifier(w[1])) {
        return Err(UnsafePattern::AdjacentQuantifiers);
    }
    if pattern.matches('(').count() > MAX_GROUP_COUNT {
        return Err(UnsafePattern::TooManyGroups);
    }
    Ok(())
}

/// Check if a pattern passes [`check_pattern`].
pub fn is_safe_pattern(pattern: &str) -> bool {
    check_pattern(pattern).is_ok()
}

/// One match handed to the worker.
struct MatchJob {
    regex: Regex,
    input: String,
    reply: Sender<bool>,
}

/// Worker thread shared by every clone of a [`SafeRegex`].
#[derive(Debug, Default)]
struct Worker {
    jobs: Mutex<Option<Sender<MatchJob>>>,
    spawned: AtomicUsize,
}

impl Worker {
    fn spawn(&self) -> io::Result<Sender<MatchJob>> {
        let (tx, rx) = mpsc::channel::<MatchJob>();
        thread::Builder::new()
            .name("a2ui-regex".to_string())
            .spawn(move || {
                for job in rx {
                    // Receiver may be gone after a timeout.
                    let _ = job.reply.send(job.regex.is_match(&job.input));
                }
            })?;
        self.spawned.fetch_add(1, Ordering::Relaxed);
        Ok(tx)
    }

    fn submit(&self, job: MatchJob) -> io::Result<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let job = match jobs.as_ref() {
            Some(tx) => match tx.send(job) {
                Ok(()) => return Ok(()),
                // Worker is gone, hand the job to a new one.
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        let tx = self.spawn()?;
        let sent = tx.send(job).is_ok();
        *jobs = Some(tx);
        if sent {
            Ok(())
        } else {
            Err(io::Error::other("regex worker exited"))
        }
    }

    /// Drop the current worker; it exits once its pending job finishes.
    fn retire(&self) {
        *self.jobs.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Regex executor with a screening step and a per-match timeout.
///
/// Clones share one worker thread, which exits when the last clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct SafeRegex {
    timeout: Duration,
    worker: Arc<Worker>,
}

impl Default for SafeRegex {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_TIMEOUT)
    }
}

impl SafeRegex {
    pub fn new(timeout: Duration) -> Self {
        SafeRegex {
            timeout,
            worker: Arc::new(Worker::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Match the whole of `input` against `pattern`.
    ///
    /// Never panics and never blocks longer than the configured timeout.
    pub fn full_match(&self, pattern: &str, input: &str) -> MatchOutcome {
        if let Err(reason) = check_pattern(pattern) {
            log::warn!("[A2UI] Refusing unsafe pattern {:?}: {:?}", pattern, reason);
            return MatchOutcome::Unsafe;
        }

        let regex = match RegexBuilder::new(&format!("^(?:{})$", pattern))
            .size_limit(COMPILED_SIZE_LIMIT)
            .dfa_size_limit(COMPILED_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("[A2UI] Pattern {:?} failed to compile: {}", pattern, e);
                return MatchOutcome::Unsafe;
            }
        };

        let (reply, rx) = mpsc::channel();
        let job = MatchJob {
            regex,
            input: input.to_string(),
            reply,
        };
        if let Err(e) = self.worker.submit(job) {
            log::warn!("[A2UI] Could not start regex worker: {}", e);
            return MatchOutcome::Unsafe;
        }

        match rx.recv_timeout(self.timeout) {
            Ok(true) => MatchOutcome::Matched,
            Ok(false) => MatchOutcome::NotMatched,
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "[A2UI] Pattern {:?} exceeded {:?}, abandoning match",
                    pattern,
                    self.timeout
                );
                self.worker.retire();
                MatchOutcome::Unsafe
            }
            Err(RecvTimeoutError::Disconnected) => MatchOutcome::Unsafe,
        }
    }

    #[cfg(test)]
    fn workers_spawned(&self) -> usize {
        self.worker.spawned.load(Ordering::Relaxed)
    }
}
