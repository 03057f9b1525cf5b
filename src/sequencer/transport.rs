// Transport - Real-time clock driving the sequencer on a tokio timer task
// One task per play; pause and stop cancel it before returning

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};

use super::scheduler::{DeferredHit, Sequencer};

pub type SharedSequencer = Arc<Mutex<Sequencer>>;

fn lock(sequencer: &Mutex<Sequencer>) -> MutexGuard<'_, Sequencer> {
    sequencer
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Next tick deadline, anchored to the previous one
///
/// Re-anchors to `now` when the loop has fallen more than one interval
/// behind, so a stall doesn't produce a burst of catch-up ticks.
pub fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let next = previous + interval;
    if now.saturating_duration_since(next) > interval {
        now
    } else {
        next
    }
}

pub struct Transport {
    sequencer: SharedSequencer,
    /// Bumped on every cancel; stale tasks compare against it before touching the sequencer
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl Transport {
    pub fn new(sequencer: Sequencer) -> Self {
        Transport {
            sequencer: Arc::new(Mutex::new(sequencer)),
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Handle for editing from other tasks; edits are seen from the next tick
    pub fn shared(&self) -> SharedSequencer {
        Arc::clone(&self.sequencer)
    }

    /// Run a closure against the locked sequencer
    pub fn with<R>(&self, f: impl FnOnce(&mut Sequencer) -> R) -> R {
        f(&mut lock(&self.sequencer))
    }

    /// Start ticking from the current step
    ///
    /// A task left over from a pause or stop made through `shared()` or
    /// `with()` is cancelled first. Must be called from within a tokio runtime.
    pub fn play(&mut self) {
        let sequencer = Arc::clone(&self.sequencer);
        let mut seq = lock(&sequencer);
        if seq.state().is_playing() && self.is_running() {
            return;
        }
        self.cancel();
        seq.play();
        drop(seq);

        let token = self.generation.load(Ordering::SeqCst);
        self.task = Some(tokio::spawn(run(
            Arc::clone(&self.sequencer),
            Arc::clone(&self.generation),
            token,
        )));
    }

    pub fn pause(&mut self) {
        self.cancel();
        lock(&self.sequencer).pause();
    }

    pub fn stop(&mut self) {
        self.cancel();
        lock(&self.sequencer).stop();
    }

    /// True while a timer task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run(sequencer: SharedSequencer, generation: Arc<AtomicU64>, token: u64) {
    let mut deadline = Instant::now();

    loop {
        let outcome = {
            let mut seq = lock(&sequencer);
            if generation.load(Ordering::SeqCst) != token {
                break;
            }
            seq.tick()
        };
        let Some(outcome) = outcome else {
            break;
        };

        for hit in outcome.deferred {
            schedule_deferred(Arc::clone(&sequencer), Arc::clone(&generation), token, hit);
        }

        deadline = next_deadline(deadline, outcome.interval, Instant::now());
        sleep_until(deadline).await;
    }

    log::debug!("Transport task {} finished", token);
}

fn schedule_deferred(
    sequencer: SharedSequencer,
    generation: Arc<AtomicU64>,
    token: u64,
    hit: DeferredHit,
) {
    tokio::spawn(async move {
        sleep(hit.delay).await;
        let mut seq = lock(&sequencer);
        if generation.load(Ordering::SeqCst) == token && seq.state().is_playing() {
            seq.fire_deferred(&hit);
        }
    });
}
