//! `ExecutionGate`: process-wide mutual exclusion for order placement
//! (spec §5, §9 REDESIGN FLAG — replaces the original's module-level boolean).
//!
//! Grounded in `arbitrage-cross::executor::CrossCircuitBreaker`'s
//! atomic-state pattern, simplified down to the single boolean this spec
//! actually needs: no trip thresholds or daily P&L tracking, just "is an
//! OrderPlacer currently running".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, cloneable handle to the process-wide execution lock.
#[derive(Clone, Default)]
pub struct ExecutionGate {
    in_flight: Arc<AtomicBool>,
}

impl ExecutionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking try-lock. Returns `None` if another `ChainExecutor` is
    /// already placing orders — the caller must skip this tick, not queue.
    #[must_use]
    pub fn try_acquire(&self) -> Option<ExecutionGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExecutionGuard { gate: self.clone() })
    }
}

/// RAII guard: clears the gate's flag on drop, whether the execution
/// succeeded, partially failed, or panicked.
pub struct ExecutionGuard {
    gate: ExecutionGate,
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_first_guard_is_held() {
        let gate = ExecutionGate::new();
        let first = gate.try_acquire();
        assert!(first.is_some());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn dropping_the_guard_releases_the_gate() {
        let gate = ExecutionGate::new();
        {
            let _guard = gate.try_acquire().unwrap();
            assert!(gate.try_acquire().is_none());
        }
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn concurrent_ticks_never_overlap() {
        let gate = ExecutionGate::new();
        let mut handles = Vec::new();
        let overlaps = Arc::new(AtomicBool::new(false));

        for _ in 0..16 {
            let gate = gate.clone();
            let overlaps = overlaps.clone();
            handles.push(tokio::spawn(async move {
                if let Some(_guard) = gate.try_acquire() {
                    if gate.try_acquire().is_some() {
                        overlaps.store(true, Ordering::SeqCst);
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert!(!overlaps.load(Ordering::SeqCst));
    }
}
