//! Receptionist: a proxy that executes every call on one designated thread.
//!
//! The receptionist owns a dedicated worker thread and the target object
//! living on it. `invoke` forwards a closure to the worker and blocks the
//! calling thread for the round-trip; a call issued from the worker thread
//! itself runs in-line. The target never leaves its thread, so it does not
//! need to be `Sync`, and with lazy construction it does not even need to be
//! `Send`.

use crate::error::AffinityError;
use std::any::Any;
use std::cell::RefCell;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on how long a caller waits for the worker to respond.
const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(30);

type Job = Box<dyn FnOnce() + Send>;
type SharedFactory<T> = Arc<Mutex<Option<Box<dyn FnOnce() -> T + Send>>>>;

thread_local! {
    /// The target object hosted by this worker thread.
    ///
    /// Exactly one receptionist target lives per worker thread; the worker
    /// is spawned by the receptionist itself, so the slot cannot collide.
    static TARGET: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

/// Runs `op` against the thread-local target, building it first if the
/// receptionist was constructed with a lazy factory.
///
/// Holds only a shared borrow while `op` runs, so re-entrant invocations
/// from within a forwarded call observe the same target without panicking.
fn with_target<T: 'static, R>(factory: &SharedFactory<T>, op: impl FnOnce(&T) -> R) -> R {
    TARGET.with(|slot| {
        if slot.borrow().is_none() {
            let build = factory
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .expect("receptionist target not installed and factory already consumed");
            debug!("constructing receptionist target on designated thread");
            *slot.borrow_mut() = Some(Box::new(build()));
        }
        let guard = slot.borrow();
        let target = guard
            .as_ref()
            .expect("receptionist target slot empty")
            .downcast_ref::<T>()
            .expect("receptionist target type mismatch");
        op(target)
    })
}

/// A transparent forwarding proxy bound to one dedicated thread.
///
/// Construction either moves a ready target onto the worker thread
/// ([`Receptionist::spawn`]) or defers construction to the first forwarded
/// call ([`Receptionist::with_factory`]). Cheap to share behind an `Arc`;
/// callers on any thread may [`invoke`](Receptionist::invoke) concurrently.
pub struct Receptionist<T: 'static> {
    sender: mpsc::Sender<Job>,
    thread_id: ThreadId,
    timeout: Duration,
    factory: SharedFactory<T>,
}

impl<T: 'static> Receptionist<T> {
    /// Binds a ready target instance to a fresh worker thread.
    pub fn spawn(target: T) -> Self
    where
        T: Send,
    {
        let install: Job = Box::new(move || {
            TARGET.with(|slot| *slot.borrow_mut() = Some(Box::new(target)));
        });
        Self::build(Some(install), None)
    }

    /// Defers target construction to the designated thread.
    ///
    /// The factory runs on the worker the first time a call is forwarded;
    /// the constructed instance is reused for every call thereafter. Because
    /// the target is born on its own thread it does not need to be `Send`.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::build(None, Some(Box::new(factory)))
    }

    fn build(install: Option<Job>, factory: Option<Box<dyn FnOnce() -> T + Send>>) -> Self
    where
        T: 'static,
    {
        let (sender, receiver) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("receptionist".to_string())
            .spawn(move || {
                if let Some(install) = install {
                    install();
                }
                while let Ok(job) = receiver.recv() {
                    job();
                }
                // Sender gone: drop the target on its own thread and exit.
                TARGET.with(|slot| slot.borrow_mut().take());
                debug!("receptionist worker stopped");
            })
            .expect("receptionist: failed to spawn worker thread");

        Self {
            thread_id: handle.thread().id(),
            sender,
            timeout: DEFAULT_INVOKE_TIMEOUT,
            factory: Arc::new(Mutex::new(factory)),
        }
    }

    /// Replaces the bound on forwarded-call waits.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The identifier of the designated thread.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the calling thread is the designated thread.
    pub fn on_designated_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Forwards `op` to the target, executing it on the designated thread,
    /// and blocks the caller until it completes.
    ///
    /// Field reads behave identically through the proxy and on the target
    /// itself: `op` receives a plain `&T`.
    ///
    /// # Errors
    ///
    /// - [`AffinityError::Unavailable`] - the worker did not respond within
    ///   the configured timeout (a previous call is wedging the queue).
    /// - [`AffinityError::Disconnected`] - the worker has shut down, or a
    ///   forwarded call panicked and took the worker with it.
    pub fn invoke<F, R>(&self, op: F) -> Result<R, AffinityError>
    where
        F: FnOnce(&T) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.on_designated_thread() {
            // Self-affinity: execute in-line, no hop and no deadlock.
            return Ok(with_target(&self.factory, op));
        }

        let (reply_tx, reply_rx) = mpsc::sync_channel::<R>(1);
        let factory = Arc::clone(&self.factory);
        let job: Job = Box::new(move || {
            let result = with_target(&factory, op);
            // The caller may already have timed out; a closed reply channel
            // is not an error for the worker.
            let _ = reply_tx.send(result);
        });

        self.sender
            .send(job)
            .map_err(|_| AffinityError::Disconnected)?;

        match reply_rx.recv_timeout(self.timeout) {
            Ok(result) => Ok(result),
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout = ?self.timeout, "forwarded call timed out waiting for designated thread");
                Err(AffinityError::Unavailable {
                    timeout: self.timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(AffinityError::Disconnected),
        }
    }
}

impl<T: 'static> std::fmt::Debug for Receptionist<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receptionist")
            .field("thread_id", &self.thread_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        hits: Cell<usize>,
    }

    #[test]
    fn test_invoke_returns_target_result() {
        let receptionist = Receptionist::spawn(Counter { hits: Cell::new(0) });

        let value = receptionist
            .invoke(|counter| {
                counter.hits.set(counter.hits.get() + 1);
                counter.hits.get()
            })
            .unwrap();

        assert_eq!(value, 1);
    }

    #[test]
    fn test_field_access_fidelity() {
        struct Config {
            name: String,
        }
        let receptionist = Receptionist::spawn(Config {
            name: "affine".to_string(),
        });

        let name = receptionist.invoke(|config| config.name.clone()).unwrap();
        assert_eq!(name, "affine");
    }

    #[test]
    fn test_calls_execute_on_designated_thread() {
        let receptionist = Receptionist::spawn(());
        let worker_id = receptionist.thread_id();

        let executed_on = receptionist
            .invoke(|_| thread::current().id())
            .unwrap();

        assert_eq!(executed_on, worker_id);
        assert_ne!(executed_on, thread::current().id());
    }

    #[test]
    fn test_factory_runs_once_on_designated_thread() {
        let built = Arc::new(AtomicUsize::new(0));
        let built_clone = Arc::clone(&built);
        let caller_id = thread::current().id();

        let receptionist = Receptionist::with_factory(move || {
            built_clone.fetch_add(1, Ordering::SeqCst);
            assert_ne!(thread::current().id(), caller_id);
            Counter { hits: Cell::new(0) }
        });

        // Factory is lazy: nothing is built until the first forwarded call.
        assert_eq!(built.load(Ordering::SeqCst), 0);

        receptionist
            .invoke(|counter| counter.hits.set(counter.hits.get() + 1))
            .unwrap();
        receptionist
            .invoke(|counter| counter.hits.set(counter.hits.get() + 1))
            .unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        let hits = receptionist.invoke(|counter| counter.hits.get()).unwrap();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_self_affinity_executes_inline() {
        let receptionist = Arc::new(Receptionist::spawn(Counter { hits: Cell::new(7) }));
        let reentrant = Arc::clone(&receptionist);

        // A forwarded call that invokes the proxy again from the designated
        // thread must execute in-line instead of deadlocking on its own queue.
        let nested = receptionist
            .invoke(move |_| {
                assert!(reentrant.on_designated_thread());
                reentrant.invoke(|counter| counter.hits.get()).unwrap()
            })
            .unwrap();

        assert_eq!(nested, 7);
    }

    #[test]
    fn test_concurrent_callers_are_serialized() {
        struct Exclusive {
            busy: Cell<bool>,
            calls: Cell<usize>,
        }
        let receptionist = Arc::new(Receptionist::spawn(Exclusive {
            busy: Cell::new(false),
            calls: Cell::new(0),
        }));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let receptionist = Arc::clone(&receptionist);
                thread::spawn(move || {
                    receptionist
                        .invoke(move |target| {
                            assert!(!target.busy.get(), "two calls executed concurrently");
                            target.busy.set(true);
                            thread::sleep(Duration::from_millis(2));
                            target.busy.set(false);
                            target.calls.set(target.calls.get() + 1);
                            i * 2
                        })
                        .unwrap()
                })
            })
            .collect();

        let mut results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort_unstable();

        // Every caller got its own result back, with no cross-talk.
        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
        let calls = receptionist.invoke(|target| target.calls.get()).unwrap();
        assert_eq!(calls, 8);
    }

    #[test]
    fn test_wedged_worker_times_out() {
        let receptionist =
            Arc::new(Receptionist::spawn(()).with_timeout(Duration::from_millis(30)));

        let result = receptionist.invoke(|_| thread::sleep(Duration::from_millis(200)));
        assert_eq!(
            result,
            Err(AffinityError::Unavailable {
                timeout: Duration::from_millis(30)
            })
        );

        // Once the slow call drains, the worker serves new calls again.
        thread::sleep(Duration::from_millis(250));
        assert_eq!(receptionist.invoke(|_| 42).unwrap(), 42);
    }

    #[test]
    fn test_panicked_call_reports_disconnected() {
        let receptionist = Receptionist::spawn(());

        // The panic kills the worker thread; the caller sees a disconnect
        // rather than hanging on a reply that will never come.
        let result = receptionist.invoke(|_| -> u32 { panic!("target blew up") });
        assert_eq!(result, Err(AffinityError::Disconnected));

        assert_eq!(
            receptionist.invoke(|_| 1),
            Err(AffinityError::Disconnected)
        );
    }
}
