pub mod apps;
pub mod executor;
pub mod leftovers;
pub mod plan;
pub mod scanner;
pub mod tables;
pub mod trash;
pub mod usage;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info_span;

use crate::error::EngineError;
use executor::ExecuteOptions;
use plan::{CleanupPlan, CleanupResult, ScanReport};
use scanner::{ResolvedRoot, ScanContext};

/// Serializes the destructive side: at most one scan and one execution at a
/// time, a second request of the same kind is rejected rather than queued.
/// Avoids two plans racing on the same filesystem state.
pub struct CleanupEngine {
    scan_gate: Mutex<()>,
    execute_gate: Mutex<()>,
    // One cancel flag per operation kind, so starting a scan cannot erase a
    // cancellation requested against an in-flight execution.
    scan_cancel: AtomicBool,
    execute_cancel: AtomicBool,
}

impl Default for CleanupEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupEngine {
    pub fn new() -> Self {
        CleanupEngine {
            scan_gate: Mutex::new(()),
            execute_gate: Mutex::new(()),
            scan_cancel: AtomicBool::new(false),
            execute_cancel: AtomicBool::new(false),
        }
    }

    /// Requests cooperative cancellation of whatever scan or execution is
    /// currently between path operations. Each operation clears only its own
    /// flag when it starts.
    pub fn request_cancel(&self) {
        self.scan_cancel.store(true, Ordering::Relaxed);
        self.execute_cancel.store(true, Ordering::Relaxed);
    }

    pub fn scan(&self, roots: &[ResolvedRoot], ctx: &ScanContext) -> Result<ScanReport, EngineError> {
        let _gate = self
            .scan_gate
            .try_lock()
            .map_err(|_| EngineError::Busy("scan"))?;
        self.scan_cancel.store(false, Ordering::Relaxed);
        let _span = info_span!("scan", roots = roots.len()).entered();
        Ok(scanner::scan_roots(roots, ctx, &self.scan_cancel))
    }

    pub fn execute(
        &self,
        plan: &CleanupPlan,
        confirmed: bool,
        opts: &ExecuteOptions,
    ) -> Result<CleanupResult, EngineError> {
        let _gate = self
            .execute_gate
            .try_lock()
            .map_err(|_| EngineError::Busy("execute"))?;
        self.execute_cancel.store(false, Ordering::Relaxed);
        let _span = info_span!("execute", paths = plan.len()).entered();
        executor::execute(plan, confirmed, opts, &self.execute_cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scan_rejects_concurrent_scan() {
        let engine = CleanupEngine::new();
        let _held = engine.scan_gate.try_lock().unwrap();
        let ctx = ScanContext {
            home: std::env::temp_dir(),
            max_depth: 1,
            running: HashSet::new(),
            probe: Box::new(usage::NoopProbe),
            allowed_roots: Vec::new(),
        };
        let err = engine.scan(&[], &ctx).unwrap_err();
        assert!(matches!(err, EngineError::Busy("scan")));
    }

    #[test]
    fn execute_rejects_concurrent_execute() {
        let engine = CleanupEngine::new();
        let _held = engine.execute_gate.try_lock().unwrap();
        let opts = ExecuteOptions::new(std::env::temp_dir());
        let err = engine
            .execute(&CleanupPlan::default(), true, &opts)
            .unwrap_err();
        assert!(matches!(err, EngineError::Busy("execute")));
    }

    #[test]
    fn scan_and_execute_do_not_block_each_other() {
        let engine = CleanupEngine::new();
        let _held = engine.scan_gate.try_lock().unwrap();
        let opts = ExecuteOptions::new(std::env::temp_dir());
        assert!(engine.execute(&CleanupPlan::default(), true, &opts).is_ok());
    }

    #[test]
    fn starting_a_scan_preserves_an_execute_cancellation() {
        let engine = CleanupEngine::new();
        engine.request_cancel();

        let ctx = ScanContext {
            home: std::env::temp_dir(),
            max_depth: 1,
            running: HashSet::new(),
            probe: Box::new(usage::NoopProbe),
            allowed_roots: Vec::new(),
        };
        engine.scan(&[], &ctx).unwrap();

        // The scan cleared only its own flag; the execution-side request
        // still stands.
        assert!(!engine.scan_cancel.load(Ordering::Relaxed));
        assert!(engine.execute_cancel.load(Ordering::Relaxed));
    }
}
