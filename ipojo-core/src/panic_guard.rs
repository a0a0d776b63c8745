use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run an interceptor's `accept`-shaped hook, catching a panic and treating
/// it exactly like a `None` return.
///
/// §7: "Interceptor errors during `accept` / `get_service` are treated as
/// drop the reference (as if the interceptor had returned `None`) and
/// logged; they never abort the whole chain."
pub fn catch_accept<T>(label: &str, f: impl FnOnce() -> Option<T>) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            log_panic(label, payload.as_ref());
            None
        }
    }
}

/// Run an interceptor's `get_service`-shaped decoration hook, catching a
/// panic and falling back to `fallback` (the chain's output so far), so one
/// interceptor's failure never aborts the rest of the chain (§7).
pub fn catch_decorate<T>(label: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            log_panic(label, payload.as_ref());
            fallback
        }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_panic(label: &str, payload: &(dyn Any + Send)) {
    #[cfg(feature = "tracing")]
    {
        let message = panic_message(payload);
        tracing::warn!(
            target = "ipojo::core::interceptor",
            op = label,
            message = %message,
            "interceptor panicked; treating as a dropped reference"
        );
    }
}

#[cfg(feature = "tracing")]
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{catch_accept, catch_decorate};

    #[test]
    fn catch_accept_turns_a_panic_into_none() {
        let result: Option<i32> = catch_accept("test::accept", || panic!("boom"));
        assert_eq!(result, None);
    }

    #[test]
    fn catch_accept_passes_through_a_normal_result() {
        let result = catch_accept("test::accept", || Some(42));
        assert_eq!(result, Some(42));
    }

    #[test]
    fn catch_decorate_falls_back_on_panic() {
        let result = catch_decorate("test::get_service", 7, || -> i32 { panic!("boom") });
        assert_eq!(result, 7);
    }

    #[test]
    fn catch_decorate_passes_through_a_normal_result() {
        let result = catch_decorate("test::get_service", 7, || 9);
        assert_eq!(result, 9);
    }
}
