//! The execution loop: sequential action processing over the two shared
//! documents.
//!
//! Per batch: load both documents once, process each action strictly in
//! order (assign index, dispatch, capture the result, log), annotate
//! working memory with size statistics, save both documents once. A failing
//! action never aborts the batch; only persistence errors propagate to the
//! caller.

use std::sync::Arc;

use mindstore_core::action::{ActionResult, ResultStatus, ToolAction};
use mindstore_core::config::Config;

use crate::dispatch::{self, ToolHandlers};
use crate::logger::ActionLogger;
use crate::persistence::{PersistError, Persistence};
use crate::recorder::{self, SideEffectOutcome};
use crate::sequence::ActionSequencer;
use crate::stats;

/// Per-action diagnostics: the action's own status plus the outcome of each
/// best-effort side effect. Infrastructure failures stay observable here
/// without altering the recorded status.
#[derive(Debug, Clone)]
pub struct ActionDiagnostics {
    pub action_index: u64,
    pub status: ResultStatus,
    pub recorded: SideEffectOutcome,
    pub logged: SideEffectOutcome,
}

/// Diagnostics for one `execute` call. Not a success signal: action
/// statuses live in working memory.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub actions: Vec<ActionDiagnostics>,
}

/// The action-dispatch engine. Owns a sequencer handle and the collaborator
/// seams; cheap to construct per context.
pub struct Executor {
    sequencer: ActionSequencer,
    handlers: Arc<dyn ToolHandlers>,
    persistence: Arc<dyn Persistence>,
    logger: Arc<dyn ActionLogger>,
    config: Config,
}

impl Executor {
    pub fn new(
        sequencer: ActionSequencer,
        handlers: Arc<dyn ToolHandlers>,
        persistence: Arc<dyn Persistence>,
        logger: Arc<dyn ActionLogger>,
        config: Config,
    ) -> Self {
        Self {
            sequencer,
            handlers,
            persistence,
            logger,
            config,
        }
    }

    /// Execute a batch of validated actions strictly in order.
    ///
    /// Empty input returns immediately without loading or saving anything.
    /// Every action yields exactly one result with a definitive status;
    /// callers read success/failure from working memory, never from an
    /// error here. The only `Err` this returns is a persistence failure.
    pub async fn execute(&self, actions: &[ToolAction]) -> Result<BatchReport, PersistError> {
        if actions.is_empty() {
            return Ok(BatchReport::default());
        }

        let mut working_memory = self.persistence.load_working_memory().await?;
        let mut storage = self.persistence.load_storage().await?;
        let mut report = BatchReport::default();

        for action in actions {
            let index = self.sequencer.next();

            let mut result = match dispatch::dispatch(
                self.handlers.as_ref(),
                action,
                &mut working_memory,
                &mut storage,
                index,
            )
            .await
            {
                Ok(result) => result,
                Err(e) => {
                    ActionResult::failure(index, action, format!("Action execution failed: {e}"))
                }
            };
            recorder::annotate(&mut result, action);

            let recorded = recorder::record(&mut working_memory, index, &result);
            if let SideEffectOutcome::Failed(msg) = &recorded {
                tracing::error!("Failed to store result for action {index}: {msg}");
            }

            let logged = match self.logger.log_action(action, &result).await {
                Ok(()) => SideEffectOutcome::Ok,
                Err(e) => {
                    tracing::error!("Failed to log action {index}: {e}");
                    SideEffectOutcome::Failed(e.to_string())
                }
            };

            tracing::info!("Action {} ({}): {}", index, action.kind, result.status);
            if result.status == ResultStatus::Error {
                tracing::warn!(
                    "Action {} error: {}",
                    index,
                    result.error.as_deref().unwrap_or("")
                );
            }

            report.actions.push(ActionDiagnostics {
                action_index: index,
                status: result.status,
                recorded,
                logged,
            });
        }

        stats::apply_stats(&mut working_memory, &self.config);

        self.persistence.save_working_memory(&working_memory).await?;
        self.persistence.save_storage(&storage).await?;

        Ok(report)
    }

    /// Replace the entire `action_result` map with an empty mapping and
    /// persist. Destructive and irreversible; nothing else is altered.
    pub async fn clear_action_results(&self) -> Result<(), PersistError> {
        let mut working_memory = self.persistence.load_working_memory().await?;
        working_memory.clear_action_results();
        self.persistence.save_working_memory(&working_memory).await?;
        tracing::info!("Cleared all action results from working memory");
        Ok(())
    }

    /// Index the next action will receive.
    pub fn peek_next_index(&self) -> u64 {
        self.sequencer.peek_next()
    }

    /// Most recently issued index.
    pub fn current_index(&self) -> u64 {
        self.sequencer.current()
    }

    /// Test-support: rewind the index sequence. Does not touch persisted
    /// state.
    pub fn reset_counter(&self) {
        self.sequencer.reset();
    }

    pub fn sequencer(&self) -> &ActionSequencer {
        &self.sequencer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullActionLogger;
    use crate::persistence::MemoryPersistence;
    use anyhow::Result;
    use async_trait::async_trait;
    use mindstore_core::document::{Storage, WorkingMemory};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// set/mkdir mutate storage; get reads; everything else echoes. `fail`
    /// paths make the handler return Err.
    #[derive(Default)]
    struct StubHandlers;

    fn stub(action: &ToolAction, index: u64) -> Result<ActionResult> {
        if action.target_path.starts_with("/fail") {
            anyhow::bail!("handler exploded on {}", action.target_path);
        }
        Ok(ActionResult::success(index, action))
    }

    #[async_trait]
    impl ToolHandlers for StubHandlers {
        async fn handle_set(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            if action.target_path.starts_with("/fail") {
                anyhow::bail!("handler exploded on {}", action.target_path);
            }
            let value = action.value.clone().unwrap_or(serde_json::Value::Null);
            storage.set(&action.target_path, value)?;
            Ok(ActionResult::success(index, action))
        }

        async fn handle_get(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            let value = storage
                .get(&action.target_path)
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            Ok(ActionResult::success(index, action).with_payload("value", value))
        }

        async fn handle_rm(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            _storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            stub(action, index)
        }

        async fn handle_mv(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            _storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            stub(action, index)
        }

        async fn handle_ls(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            _storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            stub(action, index)
        }

        async fn handle_search(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            _storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            stub(action, index)
        }

        async fn handle_mkdir(
            &self,
            action: &ToolAction,
            _working_memory: &mut WorkingMemory,
            _storage: &mut Storage,
            index: u64,
        ) -> Result<ActionResult> {
            stub(action, index)
        }
    }

    /// Counts calls; fails when `fail` is set.
    #[derive(Default)]
    struct CountingLogger {
        calls: AtomicUsize,
        fail: bool,
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl ActionLogger for CountingLogger {
        async fn log_action(
            &self,
            _action: &ToolAction,
            result: &ActionResult,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(result.action_index);
            if self.fail {
                anyhow::bail!("logger down");
            }
            Ok(())
        }
    }

    fn build_executor(
        persistence: Arc<MemoryPersistence>,
        logger: Arc<dyn ActionLogger>,
    ) -> Executor {
        Executor::new(
            ActionSequencer::new(),
            Arc::new(StubHandlers),
            persistence,
            logger,
            Config::default(),
        )
    }

    fn set_action(path: &str, value: serde_json::Value) -> ToolAction {
        let mut action = ToolAction::new("set", path);
        action.value = Some(value);
        action
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let persistence = Arc::new(MemoryPersistence::new());
        let logger = Arc::new(CountingLogger::default());
        let executor = build_executor(persistence.clone(), logger.clone());

        let report = executor.execute(&[]).await.unwrap();
        assert!(report.actions.is_empty());
        assert_eq!(executor.current_index(), 0);
        assert_eq!(logger.calls.load(Ordering::SeqCst), 0);
        // No save happened: no stat record was written.
        assert!(persistence
            .working_memory_snapshot()
            .system_info
            .system_stat
            .is_none());
    }

    #[tokio::test]
    async fn test_each_action_yields_one_result_with_increasing_indices() {
        let persistence = Arc::new(MemoryPersistence::new());
        let executor = build_executor(persistence.clone(), Arc::new(NullActionLogger));

        let actions = vec![
            set_action("/a", json!("x")),
            set_action("/b", json!("y")),
            set_action("/c", json!("z")),
        ];
        let report = executor.execute(&actions).await.unwrap();
        assert_eq!(report.actions.len(), 3);

        let wm = persistence.working_memory_snapshot();
        assert_eq!(wm.action_result.len(), 3);
        let indices: Vec<u64> = report.actions.iter().map(|d| d.action_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        for i in 1..=3u64 {
            let entry = wm.result_at(i).unwrap();
            assert_eq!(entry["action_index"], i);
            assert_eq!(entry["status"], "ok");
        }
    }

    #[tokio::test]
    async fn test_handler_failure_is_isolated() {
        let persistence = Arc::new(MemoryPersistence::new());
        let executor = build_executor(persistence.clone(), Arc::new(NullActionLogger));

        let actions = vec![
            set_action("/a", json!(1)),
            set_action("/fail/here", json!(2)),
            set_action("/b", json!(3)),
        ];
        executor.execute(&actions).await.unwrap();

        let wm = persistence.working_memory_snapshot();
        assert_eq!(wm.action_result.len(), 3);
        assert_eq!(wm.result_at(1).unwrap()["status"], "ok");
        let failed = wm.result_at(2).unwrap();
        assert_eq!(failed["status"], "error");
        let message = failed["error"].as_str().unwrap();
        assert!(message.starts_with("Action execution failed:"));
        assert!(message.contains("/fail/here"));
        assert_eq!(wm.result_at(3).unwrap()["status"], "ok");

        // Storage kept the successful writes.
        let storage = persistence.storage_snapshot();
        assert_eq!(storage.get("/a"), Some(&json!(1)));
        assert_eq!(storage.get("/b"), Some(&json!(3)));
        assert_eq!(storage.get("/fail/here"), None);
    }

    #[tokio::test]
    async fn test_unknown_kind_scenario() {
        let persistence = Arc::new(MemoryPersistence::new());
        let executor = build_executor(persistence.clone(), Arc::new(NullActionLogger));

        let actions = vec![set_action("/a", json!("x")), ToolAction::new("bogus", "/b")];
        let report = executor.execute(&actions).await.unwrap();
        assert_eq!(report.actions[0].action_index, 1);
        assert_eq!(report.actions[1].action_index, 2);

        let wm = persistence.working_memory_snapshot();
        assert_eq!(wm.result_at(1).unwrap()["status"], "ok");
        let bogus = wm.result_at(2).unwrap();
        assert_eq!(bogus["status"], "error");
        assert_eq!(bogus["error"], "Unknown action kind: bogus");
        assert_eq!(bogus["kind"], "bogus");
        assert_eq!(bogus["target_path"], "/b");
    }

    #[tokio::test]
    async fn test_logger_failure_is_non_fatal_and_observable() {
        let persistence = Arc::new(MemoryPersistence::new());
        let logger = Arc::new(CountingLogger {
            fail: true,
            ..Default::default()
        });
        let executor = build_executor(persistence.clone(), logger.clone());

        let report = executor
            .execute(&[set_action("/a", json!(1)), set_action("/b", json!(2))])
            .await
            .unwrap();
        assert_eq!(logger.calls.load(Ordering::SeqCst), 2);
        for diag in &report.actions {
            assert_eq!(diag.status, ResultStatus::Ok);
            assert!(!diag.logged.is_ok());
            assert!(diag.recorded.is_ok());
        }
        // Statuses in working memory are unaffected.
        let wm = persistence.working_memory_snapshot();
        assert_eq!(wm.result_at(1).unwrap()["status"], "ok");
    }

    #[tokio::test]
    async fn test_logger_sees_every_action_in_order() {
        let persistence = Arc::new(MemoryPersistence::new());
        let logger = Arc::new(CountingLogger::default());
        let executor = build_executor(persistence, logger.clone());

        executor
            .execute(&[
                set_action("/a", json!(1)),
                ToolAction::new("bogus", "/b"),
                set_action("/fail/x", json!(2)),
            ])
            .await
            .unwrap();
        let seen = logger.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_indices_continue_across_batches() {
        let persistence = Arc::new(MemoryPersistence::new());
        let executor = build_executor(persistence.clone(), Arc::new(NullActionLogger));

        executor
            .execute(&[
                set_action("/a", json!(1)),
                set_action("/fail/b", json!(2)),
                ToolAction::new("bogus", "/c"),
            ])
            .await
            .unwrap();
        assert_eq!(executor.current_index(), 3);
        assert_eq!(executor.peek_next_index(), 4);

        let report = executor.execute(&[set_action("/d", json!(4))]).await.unwrap();
        assert_eq!(report.actions[0].action_index, 4);
    }

    #[tokio::test]
    async fn test_stats_written_after_batch() {
        let persistence = Arc::new(MemoryPersistence::new());
        let config = Config {
            working_memory_character_max: Some(123),
            working_memory_children_max: Some(7),
            ..Default::default()
        };
        let executor = Executor::new(
            ActionSequencer::new(),
            Arc::new(StubHandlers),
            persistence.clone(),
            Arc::new(NullActionLogger),
            config,
        );

        executor.execute(&[set_action("/a", json!(1))]).await.unwrap();
        let wm = persistence.working_memory_snapshot();
        let stat = wm.system_info.system_stat.unwrap();
        assert!(stat.working_memory_size > 0);
        assert_eq!(stat.working_memory_size_hard_limit, 123);
        assert_eq!(stat.working_memory_children_max, 7);
    }

    #[tokio::test]
    async fn test_clear_action_results_scoped_to_that_field() {
        let persistence = Arc::new(MemoryPersistence::new());
        let executor = build_executor(persistence.clone(), Arc::new(NullActionLogger));

        executor
            .execute(&[set_action("/a", json!(1)), set_action("/b", json!(2))])
            .await
            .unwrap();
        let before = persistence.working_memory_snapshot();
        assert_eq!(before.action_result.len(), 2);
        assert!(before.system_info.system_stat.is_some());

        executor.clear_action_results().await.unwrap();
        let after = persistence.working_memory_snapshot();
        assert!(after.action_result.is_empty());
        // system_info survives untouched.
        assert_eq!(after.system_info.system_stat, before.system_info.system_stat);
        // The counter is unaffected.
        assert_eq!(executor.current_index(), 2);
    }

    #[tokio::test]
    async fn test_reset_counter_only_touches_the_sequence() {
        let persistence = Arc::new(MemoryPersistence::new());
        let executor = build_executor(persistence.clone(), Arc::new(NullActionLogger));

        executor.execute(&[set_action("/a", json!(1))]).await.unwrap();
        executor.reset_counter();
        assert_eq!(executor.peek_next_index(), 1);
        // Persisted results are untouched.
        assert_eq!(persistence.working_memory_snapshot().action_result.len(), 1);
    }

    #[tokio::test]
    async fn test_two_executors_share_a_sequencer() {
        let sequencer = ActionSequencer::new();
        let persistence = Arc::new(MemoryPersistence::new());
        let a = Executor::new(
            sequencer.clone(),
            Arc::new(StubHandlers),
            persistence.clone(),
            Arc::new(NullActionLogger),
            Config::default(),
        );
        let b = Executor::new(
            sequencer,
            Arc::new(StubHandlers),
            persistence,
            Arc::new(NullActionLogger),
            Config::default(),
        );

        let ra = a.execute(&[set_action("/a", json!(1))]).await.unwrap();
        let rb = b.execute(&[set_action("/b", json!(2))]).await.unwrap();
        assert_eq!(ra.actions[0].action_index, 1);
        assert_eq!(rb.actions[0].action_index, 2);
    }
}
