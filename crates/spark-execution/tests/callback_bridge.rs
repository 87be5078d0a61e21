//! 回调桥接的“恰好一个终止信号”验证。
//!
//! # 教案级注释概览
//! - **核心目标 (Why)**：桥接路径上每个已连接的操作都必须恰好产生一个终止信号，
//!   无论工作被内联运行、延后运行、被丢弃还是被执行器拒绝；
//! - **结构 (How)**：以 `ManualExecutor` 控制运行 / 丢弃时机，以 `RejectingExecutor` 制造提交失败，
//!   以 `ThreadExecutor` 验证跨线程完成，并用 `tracing-test` 断言关键日志事件；
//! - **契约 (What)**：提交失败时消费者收到一次 `on_error`、零次 `on_value` / `on_cancelled`，且 `start` 不向外传播失败；
//!   执行器在提交时 panic 也不会穿出 `start`。

mod support;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures::executor::block_on;
use proptest::prelude::*;
use spark_execution::{
    BridgeConfig, BridgeOperation, CallbackCell, ExecutionError, Executor, Invocable,
    OperationHandle, Rejected, SharedCallbackCell, SubmitError, SubmitMode, codes, connect,
    test_stubs::{ManualExecutor, RecordingConsumer, RejectingExecutor, Signal},
};
use support::{ChannelConsumer, ThreadExecutor};
use tracing_test::traced_test;

/// ## 测试一：`dispatch` 在 `start` 调用栈内同步完成
#[test]
fn dispatch_completes_inline() {
    let executor = ManualExecutor::new();
    let (consumer, log) = RecordingConsumer::recording();
    BridgeOperation::new(executor.clone(), consumer).start();
    assert_eq!(log.signals(), vec![Signal::Value]);
    assert_eq!(executor.pending(), 0);
    assert_eq!(executor.submissions(), vec![SubmitMode::Dispatch]);
}

/// ## 测试二：`post` / `defer` 延后完成，运行前没有任何信号
#[test]
fn queued_modes_complete_after_run() {
    for mode in [SubmitMode::Post, SubmitMode::Defer] {
        let executor = ManualExecutor::new();
        let (consumer, log) = RecordingConsumer::recording();
        let config = BridgeConfig::default().with_submit_mode(mode);
        BridgeOperation::with_config(executor.clone(), consumer, config).start();

        assert!(log.signals().is_empty(), "{mode:?} 不应内联完成");
        assert_eq!(executor.run_pending(), 1);
        assert_eq!(log.signals(), vec![Signal::Value]);
        assert_eq!(executor.submissions(), vec![mode]);
    }
}

/// ## 测试三：工作被执行器丢弃时转为取消
#[test]
fn dropped_work_signals_cancellation() {
    let executor = ManualExecutor::new();
    let (consumer, log) = RecordingConsumer::recording();
    BridgeOperation::with_config(
        executor.clone(),
        consumer,
        BridgeConfig::default().with_submit_mode(SubmitMode::Post),
    )
    .start();

    assert_eq!(executor.drop_pending(), 1);
    assert_eq!(log.signals(), vec![Signal::Cancelled]);
}

/// ## 测试四：消费者拒绝成功值时改发错误
#[test]
fn rejected_value_becomes_error() {
    let executor = ManualExecutor::new();
    let (consumer, log) = RecordingConsumer::failing_on_value();
    connect!(executor, consumer).start();
    assert_eq!(log.signals(), vec![Signal::Error]);
    assert_eq!(log.errors()[0].code(), "test.value_rejected");
}

/// ## 测试五：提交失败 ⇒ 一次 `on_error`，零次其他信号
#[test]
#[traced_test]
fn submission_failure_reports_exactly_one_error() {
    let executor = RejectingExecutor::new(SubmitError::Shutdown);
    let (consumer, log) = RecordingConsumer::recording();
    connect!(executor.clone(), consumer).start();

    assert_eq!(log.signals(), vec![Signal::Error]);
    assert_eq!(
        log.errors(),
        vec![ExecutionError::SubmitRejected(SubmitError::Shutdown)]
    );
    assert_eq!(executor.attempts(), 1);
    assert!(logs_contain("executor rejected bridge work"));
    assert!(logs_contain(codes::EXECUTOR_SHUTDOWN));
    assert!(!logs_contain("signalling cancellation"));
}

/// ## 测试六：工作计数在运行、丢弃与拒绝三种结局下都恰好归还一次
#[test]
fn tracked_work_is_balanced() {
    let tracking = BridgeConfig::default()
        .with_submit_mode(SubmitMode::Post)
        .with_track_work(true);

    let executor = ManualExecutor::new();
    let (consumer, _log) = RecordingConsumer::recording();
    BridgeOperation::with_config(executor.clone(), consumer, tracking).start();
    assert_eq!(executor.outstanding_work(), 1);
    executor.run_pending();
    assert_eq!(executor.outstanding_work(), 0);

    let (consumer, log) = RecordingConsumer::recording();
    BridgeOperation::with_config(executor.clone(), consumer, tracking).start();
    executor.drop_pending();
    assert_eq!(executor.outstanding_work(), 0);
    assert_eq!(executor.work_started(), 2);
    assert_eq!(log.signals(), vec![Signal::Cancelled]);

    let rejecting = RejectingExecutor::default();
    let (consumer, log) = RecordingConsumer::recording();
    BridgeOperation::with_config(rejecting.clone(), consumer, tracking).start();
    assert_eq!(rejecting.work_started(), 1);
    assert_eq!(rejecting.outstanding_work(), 0);
    assert_eq!(log.signals(), vec![Signal::Error]);
}

/// ## 测试七：未启动即丢弃的句柄不产生任何信号
#[test]
fn unstarted_operation_is_silent() {
    let executor = ManualExecutor::new();
    let (consumer, log) = RecordingConsumer::recording();
    let op = BridgeOperation::new(executor.clone(), consumer);
    drop(op);
    assert!(log.signals().is_empty());
    assert!(executor.submissions().is_empty());
}

/// ## 测试八：跨线程完成
#[test]
fn completion_may_happen_on_another_thread() {
    let executor = ThreadExecutor::default();
    let (consumer, receiver) = ChannelConsumer::new();
    let config = BridgeConfig::default()
        .with_submit_mode(SubmitMode::Post)
        .with_track_work(true);
    BridgeOperation::with_config(executor.clone(), consumer, config).start();

    assert_eq!(block_on(receiver), Ok(Signal::Value));
}

/// ## 测试九：取消事件写入调试日志
#[test]
#[traced_test]
fn cancellation_is_logged() {
    let (consumer, log) = RecordingConsumer::recording();
    drop(CallbackCell::new(consumer));
    assert_eq!(log.signals(), vec![Signal::Cancelled]);
    assert!(logs_contain("signalling cancellation"));
}

/// ## 测试十：共享单元跨线程竞争，只有一个调用胜出
#[test]
#[cfg(not(any(loom, spark_loom)))]
fn shared_cell_admits_one_invocation_across_threads() {
    let (consumer, log) = RecordingConsumer::recording();
    let cell = SharedCallbackCell::new(consumer);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cell = cell.clone();
            std::thread::spawn(move || cell.try_invoke())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|handle| handle.join().expect("调用线程不应 panic"))
        .filter(|won| *won)
        .count();
    drop(cell);
    assert_eq!(winners, 1);
    assert_eq!(log.signals(), vec![Signal::Value]);
}

/// 每次提交都 panic 的执行器，工作项随展开析构。
#[derive(Clone, Debug, Default)]
struct PanickingExecutor {
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl PanickingExecutor {
    fn outstanding_work(&self) -> usize {
        self.started.load(Ordering::Acquire) - self.finished.load(Ordering::Acquire)
    }

    fn explode<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        let _held = work;
        panic!("executor lost its worker threads");
    }
}

impl Executor for PanickingExecutor {
    type Context = ();

    fn context(&self) -> &() {
        &()
    }

    fn on_work_started(&self) {
        self.started.fetch_add(1, Ordering::AcqRel);
    }

    fn on_work_finished(&self) {
        self.finished.fetch_add(1, Ordering::AcqRel);
    }

    fn dispatch<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.explode(work)
    }

    fn post<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.explode(work)
    }

    fn defer<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.explode(work)
    }
}

/// ## 测试十一：提交时 panic 被 `start` 截获，消费者恰好收到一次取消
#[test]
#[traced_test]
fn executor_panic_is_contained_in_start() {
    for mode in [SubmitMode::Dispatch, SubmitMode::Post, SubmitMode::Defer] {
        let executor = PanickingExecutor::default();
        let (consumer, log) = RecordingConsumer::recording();
        let config = BridgeConfig::default()
            .with_submit_mode(mode)
            .with_track_work(true);
        BridgeOperation::with_config(executor.clone(), consumer, config).start();

        assert_eq!(log.signals(), vec![Signal::Cancelled], "{mode:?}");
        assert_eq!(executor.outstanding_work(), 0);
    }
    assert!(logs_contain(codes::EXECUTION_SUBMIT_PANICKED));
    assert!(logs_contain("executor lost its worker threads"));
}

#[derive(Clone, Copy, Debug)]
enum Fate {
    Invoke,
    InvokeFailing,
    Drop,
    Reject,
}

fn fate() -> impl Strategy<Value = Fate> {
    prop_oneof![
        Just(Fate::Invoke),
        Just(Fate::InvokeFailing),
        Just(Fate::Drop),
        Just(Fate::Reject),
    ]
}

fn submit_mode() -> impl Strategy<Value = SubmitMode> {
    prop_oneof![
        Just(SubmitMode::Dispatch),
        Just(SubmitMode::Post),
        Just(SubmitMode::Defer),
    ]
}

proptest! {
    /// 任意结局、任意提交通道、任意计数开关下，每个操作恰好一个终止信号，且工作计数归零。
    #[test]
    fn every_operation_terminates_exactly_once(
        fates in proptest::collection::vec(fate(), 1..24),
        mode in submit_mode(),
        track_work in any::<bool>(),
    ) {
        let executor = ManualExecutor::new();
        let config = BridgeConfig { submit_mode: mode, track_work };
        let mut logs = Vec::new();

        for fate in &fates {
            let (consumer, log) = match fate {
                Fate::InvokeFailing => RecordingConsumer::failing_on_value(),
                _ => RecordingConsumer::recording(),
            };
            match fate {
                Fate::Reject => {
                    BridgeOperation::with_config(RejectingExecutor::default(), consumer, config).start();
                }
                Fate::Drop if mode != SubmitMode::Dispatch => {
                    BridgeOperation::with_config(executor.clone(), consumer, config).start();
                    executor.drop_pending();
                }
                _ => {
                    BridgeOperation::with_config(executor.clone(), consumer, config).start();
                    executor.run_pending();
                }
            }
            logs.push((*fate, log));
        }

        for (fate, log) in logs {
            prop_assert_eq!(log.terminal_count(), 1);
            let expected = match fate {
                Fate::Invoke => Signal::Value,
                Fate::InvokeFailing | Fate::Reject => Signal::Error,
                Fate::Drop if mode == SubmitMode::Dispatch => Signal::Value,
                Fate::Drop => Signal::Cancelled,
            };
            prop_assert_eq!(log.signals()[0], expected);
        }
        prop_assert_eq!(executor.outstanding_work(), 0);
    }
}
