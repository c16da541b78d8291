//! Background worker boundary
//!
//! Every background thread the engine starts goes through [`spawn_reported`]:
//! a returned error or a panic is logged and swallowed, so a failing cache
//! refresh or listing never takes the process down.

use crate::error::Result;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

pub fn spawn_reported<F>(name: &str, work: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let label = name.to_string();
    let spawned = thread::Builder::new()
        .name(label.clone())
        .spawn(move || run_reported(&label, work));

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!(worker = name, error = %e, "failed to start background worker");
            None
        }
    }
}

/// Run `work` in the current thread with the same report-and-continue boundary.
pub fn run_reported<F>(name: &str, work: F)
where
    F: FnOnce() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(worker = name, error = %e, "background worker failed"),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(worker = name, panic = %message, "background worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnipkgError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn error_is_swallowed() {
        let handle = spawn_reported("failing", || Err(UnipkgError::Other("nope".into()))).unwrap();
        assert!(handle.join().is_ok());
    }

    #[test]
    fn panic_is_swallowed() {
        let handle = spawn_reported("panicking", || panic!("boom")).unwrap();
        assert!(handle.join().is_ok());
    }

    #[test]
    fn work_runs() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        spawn_reported("ok", move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap()
        .join()
        .unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
