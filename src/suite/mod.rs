//! Group runner with snapshot isolation.
//!
//! Every [`TestGroup`] runs between a checkpoint capture and a restore, so the
//! chain mutations of one group never reach the next. Cases inside a group run
//! sequentially in declaration order.

pub mod expect;
pub mod snapshot;

use crate::chain::ChainBackend;
use crate::utils::config::RunnerSettings;
use crate::utils::error::compact_error_message;
use snapshot::SnapshotStrategy;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

pub use expect::{expect_event, expect_revert, expect_revert_with};
pub use snapshot::Checkpoint;

const FAILURE_MESSAGE_MAX_LEN: usize = 600;

pub type CaseFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
type CaseFn<E> = Box<dyn for<'a> Fn(&'a E) -> CaseFuture<'a> + Send + Sync>;

fn panic_payload_to_string(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Polls a case future, turning a panic inside it into an `Err` so the
/// group still reaches its restore.
struct CatchPanic<'a> {
    inner: CaseFuture<'a>,
}

impl Future for CatchPanic<'_> {
    type Output = Result<anyhow::Result<()>, String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = &mut self.inner;
        match catch_unwind(AssertUnwindSafe(|| inner.as_mut().poll(cx))) {
            Ok(Poll::Ready(result)) => Poll::Ready(Ok(result)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => Poll::Ready(Err(panic_payload_to_string(payload))),
        }
    }
}

struct Step<E> {
    name: String,
    run: CaseFn<E>,
}

/// A named group of cases sharing one snapshot.
pub struct TestGroup<E> {
    name: String,
    before: Vec<Step<E>>,
    cases: Vec<Step<E>>,
    isolate_each_case: bool,
}

impl<E> TestGroup<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: Vec::new(),
            cases: Vec::new(),
            isolate_each_case: false,
        }
    }

    /// Runs once after the group snapshot, before the first case.
    pub fn before<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: for<'a> Fn(&'a E) -> CaseFuture<'a> + Send + Sync + 'static,
    {
        self.before.push(Step {
            name: name.into(),
            run: Box::new(hook),
        });
        self
    }

    pub fn case<F>(mut self, name: impl Into<String>, case: F) -> Self
    where
        F: for<'a> Fn(&'a E) -> CaseFuture<'a> + Send + Sync + 'static,
    {
        self.cases.push(Step {
            name: name.into(),
            run: Box::new(case),
        });
        self
    }

    /// Checkpoint before every case and roll back after it.
    pub fn isolate_each_case(mut self) -> Self {
        self.isolate_each_case = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub outcome: CaseOutcome,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct GroupReport {
    pub name: String,
    pub cases: Vec<CaseReport>,
    pub duration: Duration,
}

impl GroupReport {
    pub fn outcome_of(&self, case: &str) -> Option<&CaseOutcome> {
        self.cases.iter().find(|c| c.name == case).map(|c| &c.outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub groups: Vec<GroupReport>,
}

impl SuiteReport {
    fn count(&self, pred: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.cases)
            .filter(|c| pred(&c.outcome))
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| *o == CaseOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == CaseOutcome::Skipped)
    }

    pub fn group(&self, name: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// `Err` listing every failed case, for `cargo test`.
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.failed() == 0 {
            return Ok(());
        }
        let failures: Vec<String> = self
            .groups
            .iter()
            .flat_map(|g| {
                g.cases.iter().filter_map(move |c| match &c.outcome {
                    CaseOutcome::Failed(msg) => Some(format!("{} > {}: {msg}", g.name, c.name)),
                    _ => None,
                })
            })
            .collect();
        anyhow::bail!(
            "{} of {} cases failed ({} skipped):\n  {}",
            self.failed(),
            self.passed() + self.failed() + self.skipped(),
            self.skipped(),
            failures.join("\n  ")
        )
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Runs groups one after another against a shared environment.
pub struct SuiteRunner {
    chain: Arc<dyn ChainBackend>,
    strategy: SnapshotStrategy,
    settings: RunnerSettings,
}

impl SuiteRunner {
    pub fn new(
        chain: Arc<dyn ChainBackend>,
        strategy: SnapshotStrategy,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            chain,
            strategy,
            settings,
        }
    }

    pub fn strategy(&self) -> SnapshotStrategy {
        self.strategy
    }

    pub async fn run<E: Sync>(&self, env: &E, groups: Vec<TestGroup<E>>) -> SuiteReport {
        let mut report = SuiteReport::default();
        let mut bailed = false;
        for group in groups {
            let group_report = if bailed {
                skipped_group(&group)
            } else {
                self.run_group(env, &group, &mut bailed).await
            };
            report.groups.push(group_report);
        }
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "suite finished"
        );
        report
    }

    async fn run_group<E: Sync>(
        &self,
        env: &E,
        group: &TestGroup<E>,
        bailed: &mut bool,
    ) -> GroupReport {
        let started = Instant::now();
        tracing::info!(
            group = %group.name,
            cases = group.cases.len(),
            strategy = ?self.strategy,
            "group started"
        );

        let checkpoint = match self.strategy.capture(self.chain.as_ref()).await {
            Ok(checkpoint) => checkpoint,
            Err(err) => {
                let msg = format!("group checkpoint failed: {err}");
                tracing::error!(group = %group.name, error = %err, "group checkpoint failed");
                *bailed |= self.settings.bail;
                return failed_group(group, &msg, started);
            }
        };

        let mut cases = Vec::with_capacity(group.cases.len());
        let mut hook_failure = None;
        for hook in &group.before {
            if let Err(msg) = self.run_step(env, hook).await {
                tracing::warn!(
                    group = %group.name,
                    hook = %hook.name,
                    error = %msg,
                    "before hook failed"
                );
                hook_failure = Some(format!("before hook `{}` failed: {msg}", hook.name));
                break;
            }
        }

        if let Some(msg) = hook_failure {
            *bailed |= self.settings.bail;
            cases.extend(group.cases.iter().map(|case| CaseReport {
                name: case.name.clone(),
                outcome: CaseOutcome::Failed(msg.clone()),
                duration: Duration::ZERO,
            }));
        } else {
            for case in &group.cases {
                if *bailed {
                    cases.push(CaseReport {
                        name: case.name.clone(),
                        outcome: CaseOutcome::Skipped,
                        duration: Duration::ZERO,
                    });
                    continue;
                }
                let case_started = Instant::now();
                let outcome = self.run_case(env, group, case).await;
                let duration = case_started.elapsed();
                match &outcome {
                    CaseOutcome::Passed => {
                        tracing::info!(
                            group = %group.name,
                            case = %case.name,
                            ?duration,
                            "case passed"
                        )
                    }
                    CaseOutcome::Failed(msg) => {
                        tracing::error!(
                            group = %group.name,
                            case = %case.name,
                            error = %msg,
                            "case failed"
                        );
                        *bailed |= self.settings.bail;
                    }
                    CaseOutcome::Skipped => {}
                }
                cases.push(CaseReport {
                    name: case.name.clone(),
                    outcome,
                    duration,
                });
            }
        }

        self.restore(&group.name, checkpoint).await;
        GroupReport {
            name: group.name.clone(),
            cases,
            duration: started.elapsed(),
        }
    }

    async fn run_case<E: Sync>(
        &self,
        env: &E,
        group: &TestGroup<E>,
        case: &Step<E>,
    ) -> CaseOutcome {
        if !group.isolate_each_case {
            return match self.run_step(env, case).await {
                Ok(()) => CaseOutcome::Passed,
                Err(msg) => CaseOutcome::Failed(msg),
            };
        }
        let checkpoint = match self.strategy.capture(self.chain.as_ref()).await {
            Ok(checkpoint) => checkpoint,
            Err(err) => return CaseOutcome::Failed(format!("case checkpoint failed: {err}")),
        };
        let outcome = match self.run_step(env, case).await {
            Ok(()) => CaseOutcome::Passed,
            Err(msg) => CaseOutcome::Failed(msg),
        };
        self.restore(&group.name, checkpoint).await;
        outcome
    }

    async fn run_step<E: Sync>(&self, env: &E, step: &Step<E>) -> Result<(), String> {
        let guarded = CatchPanic {
            inner: (step.run)(env),
        };
        match tokio::time::timeout(self.settings.case_timeout, guarded).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(err))) => Err(compact_error_message(
                &format!("{err:#}"),
                FAILURE_MESSAGE_MAX_LEN,
            )),
            Ok(Err(panic)) => {
                tracing::error!(step = %step.name, panic = %panic, "step panicked");
                Err(compact_error_message(
                    &format!("panicked: {panic}"),
                    FAILURE_MESSAGE_MAX_LEN,
                ))
            }
            Err(_) => Err(format!(
                "timed out after {} ms",
                self.settings.case_timeout.as_millis()
            )),
        }
    }

    /// No retry: a failed restore leaks state into later groups.
    async fn restore(&self, group: &str, checkpoint: Checkpoint) {
        let label = checkpoint.to_string();
        match checkpoint.restore(self.chain.as_ref()).await {
            Ok(true) => tracing::debug!(group, checkpoint = %label, "chain state restored"),
            Ok(false) => tracing::warn!(
                group,
                checkpoint = %label,
                "node did not recognise checkpoint, state not restored"
            ),
            Err(err) => tracing::warn!(
                group,
                checkpoint = %label,
                error = %err,
                "failed to restore chain state"
            ),
        }
    }
}

fn skipped_group<E>(group: &TestGroup<E>) -> GroupReport {
    GroupReport {
        name: group.name.clone(),
        cases: group
            .cases
            .iter()
            .map(|case| CaseReport {
                name: case.name.clone(),
                outcome: CaseOutcome::Skipped,
                duration: Duration::ZERO,
            })
            .collect(),
        duration: Duration::ZERO,
    }
}

fn failed_group<E>(group: &TestGroup<E>, msg: &str, started: Instant) -> GroupReport {
    GroupReport {
        name: group.name.clone(),
        cases: group
            .cases
            .iter()
            .map(|case| CaseReport {
                name: case.name.clone(),
                outcome: CaseOutcome::Failed(msg.to_string()),
                duration: Duration::ZERO,
            })
            .collect(),
        duration: started.elapsed(),
    }
}
