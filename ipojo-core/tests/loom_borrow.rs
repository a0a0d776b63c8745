//! Models `RegistryTracker`'s borrow bookkeeping (§4.2): `get_service`
//! records a borrow, `unget_service` releases it, and the running count of
//! completed borrows/releases must stay paired regardless of thread
//! interleaving. `loom` only instruments its own synchronization
//! primitives, not `parking_lot`, so this re-implements the bookkeeping
//! with `loom::sync::Mutex`/`AtomicUsize` rather than driving the real
//! `RegistryTracker` — the same approach the teacher's
//! `loom_stream_handle` test takes for `Abortable`/`Stoppable`.

mod model {
    use loom::sync::atomic::{AtomicUsize, Ordering};
    use loom::sync::{Arc, Mutex};

    /// A single tracked reference's borrow count.
    pub struct Shared {
        borrows: Mutex<usize>,
        gets_completed: AtomicUsize,
        ungets_completed: AtomicUsize,
    }

    impl Shared {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                borrows: Mutex::new(0),
                gets_completed: AtomicUsize::new(0),
                ungets_completed: AtomicUsize::new(0),
            })
        }

        /// As `RegistryTracker::get_service`: record a borrow under the
        /// lock, mirroring the insert into `borrowed`.
        pub fn get_service(&self) {
            let mut borrows = self.borrows.lock().unwrap();
            *borrows += 1;
            self.gets_completed.fetch_add(1, Ordering::SeqCst);
        }

        /// As `RegistryTracker::unget_service`: release a borrow under the
        /// lock, mirroring the `shift_remove` from `borrowed`.
        pub fn unget_service(&self) {
            let mut borrows = self.borrows.lock().unwrap();
            if *borrows > 0 {
                *borrows -= 1;
            }
            self.ungets_completed.fetch_add(1, Ordering::SeqCst);
        }

        pub fn outstanding(&self) -> usize {
            *self.borrows.lock().unwrap()
        }

        pub fn gets(&self) -> usize {
            self.gets_completed.load(Ordering::SeqCst)
        }

        pub fn ungets(&self) -> usize {
            self.ungets_completed.load(Ordering::SeqCst)
        }
    }
}

/// Two threads each doing one `get_service`/`unget_service` pair always
/// leave zero outstanding borrows and matched get/unget counts, across
/// every interleaving.
#[test]
fn get_and_unget_stay_paired_under_concurrent_access() {
    loom::model(|| {
        let shared = model::Shared::new();

        let s1 = shared.clone();
        let t1 = loom::thread::spawn(move || {
            s1.get_service();
            s1.unget_service();
        });

        let s2 = shared.clone();
        let t2 = loom::thread::spawn(move || {
            s2.get_service();
            s2.unget_service();
        });

        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(shared.gets(), 2);
        assert_eq!(shared.ungets(), 2);
        assert_eq!(shared.outstanding(), 0);
    });
}

/// Borrows taken concurrently by two threads are both recorded before
/// either is released; releasing both afterward always returns the count
/// to zero.
#[test]
fn concurrent_borrows_are_both_recorded_then_both_released() {
    loom::model(|| {
        let shared = model::Shared::new();

        let s1 = shared.clone();
        let t1 = loom::thread::spawn(move || s1.get_service());

        let s2 = shared.clone();
        let t2 = loom::thread::spawn(move || s2.get_service());

        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(shared.outstanding(), 2);

        shared.unget_service();
        shared.unget_service();

        assert_eq!(shared.gets(), 2);
        assert_eq!(shared.ungets(), 2);
        assert_eq!(shared.outstanding(), 0);
    });
}
