//! Fixed-rate cycle management
//!
//! Executables run a single-threaded loop where each cycle is started with
//! [`CyclePacer::start`] and closed with [`CyclePacer::finish`], which sleeps
//! out the remainder of the period. Cycles therefore never overlap. Slower
//! periodic jobs inside the loop are gated by a [`PeriodicTrigger`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Keeps a loop running at a fixed period.
#[derive(Debug)]
pub struct CyclePacer {
    period: Duration,

    cycle_start: Option<Instant>,

    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Number of consecutive cycle overruns
    pub num_consec_overruns: u64,
}

/// Fires at most once per period of the time source it is polled with.
///
/// The schedule is fixed by the first poll, later polls landing late do not
/// push the following ones back.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTrigger {
    period_s: f64,
    next_due_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CyclePacer {
    /// Create a new pacer with the given period in seconds.
    pub fn new(period_s: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(period_s.max(0.0)),
            cycle_start: None,
            num_cycles: 0,
            num_consec_overruns: 0,
        }
    }

    /// Mark the start of a cycle.
    pub fn start(&mut self) {
        self.cycle_start = Some(Instant::now());
    }

    /// End the current cycle, sleeping for whatever is left of the period.
    pub fn finish(&mut self) {
        let cycle_dur = match self.cycle_start.take() {
            Some(s) => s.elapsed(),
            None => Duration::from_secs(0),
        };

        match self.period.checked_sub(cycle_dur) {
            Some(d) => {
                self.num_consec_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - self.period.as_secs_f64()
                );
                self.num_consec_overruns += 1;
            }
        }

        self.num_cycles += 1;
    }
}

impl PeriodicTrigger {
    /// Create a trigger which fires every `period_s` seconds. The first poll
    /// always fires.
    pub fn new(period_s: f64) -> Self {
        Self {
            period_s,
            next_due_s: None,
        }
    }

    /// Returns true if the trigger is due at time `now_s`, and if so moves
    /// the due time on by whole periods until it is after `now_s`.
    pub fn poll(&mut self, now_s: f64) -> bool {
        let next_due_s = match self.next_due_s {
            None => now_s,
            Some(t) if now_s >= t => t,
            Some(_) => return false,
        };

        self.next_due_s = Some(if self.period_s > 0.0 {
            let periods = ((now_s - next_due_s) / self.period_s).floor() + 1.0;
            next_due_s + periods * self.period_s
        } else {
            now_s
        });

        true
    }
}
