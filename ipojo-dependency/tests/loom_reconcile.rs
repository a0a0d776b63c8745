//! Models `DependencyModel::reconcile`'s lock discipline (§5): mutate shared
//! state under the write lock, snapshot what a callback needs into locals,
//! release the lock, then fire the callback. `loom` can only instrument its
//! own synchronization primitives, not `parking_lot`, so this re-implements
//! the pattern with `loom::sync::Mutex`/`AtomicBool` rather than driving the
//! real `DependencyModel` — the same approach the teacher's
//! `loom_stream_handle` test takes for `Abortable`/`Stoppable`.

mod model {
    use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use loom::sync::{Arc, Mutex};

    /// Shared dependency state: a bound-set size and the running arrival/
    /// departure tallies a listener would observe.
    pub struct Shared {
        bound: Mutex<i64>,
        lock_held: AtomicBool,
        arrivals_fired: AtomicUsize,
        departures_fired: AtomicUsize,
        /// Set if a callback is ever observed to run while `lock_held` is
        /// true — the P1 violation this test exists to rule out.
        callback_under_lock: AtomicBool,
    }

    impl Shared {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                bound: Mutex::new(0),
                lock_held: AtomicBool::new(false),
                arrivals_fired: AtomicUsize::new(0),
                departures_fired: AtomicUsize::new(0),
                callback_under_lock: AtomicBool::new(false),
            })
        }

        /// Reconcile one arrival: mutate under the lock, snapshot, release,
        /// then fire the callback outside the lock (§5's "standard
        /// pattern").
        pub fn reconcile_arrival(&self) {
            let snapshot = {
                let mut bound = self.bound.lock().unwrap();
                self.lock_held.store(true, Ordering::SeqCst);
                *bound += 1;
                let snapshot = *bound;
                self.lock_held.store(false, Ordering::SeqCst);
                snapshot
            };
            self.fire_arrival(snapshot);
        }

        /// Reconcile one departure, mirroring `reconcile_arrival`.
        pub fn reconcile_departure(&self) {
            let snapshot = {
                let mut bound = self.bound.lock().unwrap();
                self.lock_held.store(true, Ordering::SeqCst);
                *bound -= 1;
                let snapshot = *bound;
                self.lock_held.store(false, Ordering::SeqCst);
                snapshot
            };
            self.fire_departure(snapshot);
        }

        fn fire_arrival(&self, _snapshot: i64) {
            if self.lock_held.load(Ordering::SeqCst) {
                self.callback_under_lock.store(true, Ordering::SeqCst);
            }
            self.arrivals_fired.fetch_add(1, Ordering::SeqCst);
        }

        fn fire_departure(&self, _snapshot: i64) {
            if self.lock_held.load(Ordering::SeqCst) {
                self.callback_under_lock.store(true, Ordering::SeqCst);
            }
            self.departures_fired.fetch_add(1, Ordering::SeqCst);
        }

        pub fn callback_ever_ran_under_lock(&self) -> bool {
            self.callback_under_lock.load(Ordering::SeqCst)
        }

        pub fn arrivals(&self) -> usize {
            self.arrivals_fired.load(Ordering::SeqCst)
        }

        pub fn departures(&self) -> usize {
            self.departures_fired.load(Ordering::SeqCst)
        }
    }
}

/// P1: no callback is ever observed to fire while the write lock is held,
/// across every interleaving of two threads racing an arrival against a
/// departure.
#[test]
fn callbacks_never_fire_under_the_lock() {
    loom::model(|| {
        let shared = model::Shared::new();

        let s1 = shared.clone();
        let t1 = loom::thread::spawn(move || s1.reconcile_arrival());

        let s2 = shared.clone();
        let t2 = loom::thread::spawn(move || s2.reconcile_departure());

        t1.join().unwrap();
        t2.join().unwrap();

        assert!(!shared.callback_ever_ran_under_lock());
    });
}

/// P2: for every arrival fired, a matching departure is fired — the paired
/// callback count invariant must hold regardless of thread interleaving.
#[test]
fn arrivals_and_departures_stay_paired_under_concurrent_reconcile() {
    loom::model(|| {
        let shared = model::Shared::new();

        let s1 = shared.clone();
        let t1 = loom::thread::spawn(move || {
            s1.reconcile_arrival();
            s1.reconcile_departure();
        });

        let s2 = shared.clone();
        let t2 = loom::thread::spawn(move || {
            s2.reconcile_arrival();
            s2.reconcile_departure();
        });

        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(shared.arrivals(), shared.departures());
        assert_eq!(shared.arrivals(), 2);
    });
}
