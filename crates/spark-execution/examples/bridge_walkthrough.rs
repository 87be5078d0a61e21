//! 桥接路径演示：安装 `tracing-subscriber`，依次演示内联完成、延后完成、取消与提交失败。
//!
//! 运行方式：`RUST_LOG=spark_execution=trace cargo run -p spark-execution --example bridge_walkthrough`

use spark_execution::{
    AsConsumer, BridgeConfig, CallbackCell, ConnectStrategy, Executor, OperationHandle,
    SubmitError, SubmitMode, as_single, connect, connect_strategy,
    test_stubs::{ManualExecutor, RecordingConsumer, RejectingExecutor},
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(true)
        .init();

    let strategy = connect_strategy!(ManualExecutor, RecordingConsumer);
    assert_eq!(strategy, Some(ConnectStrategy::Adapter));
    tracing::info!(strategy = ?strategy, "resolved strategy for executor + consumer");

    let executor = ManualExecutor::new();

    let (consumer, log) = RecordingConsumer::recording();
    connect!(executor.clone(), consumer).start();
    tracing::info!(signals = ?log.signals(), "dispatch completes inline");

    let queued = BridgeConfig::default()
        .with_submit_mode(SubmitMode::Post)
        .with_track_work(true);
    let (consumer, log) = RecordingConsumer::recording();
    connect!(executor.clone(), as_single(consumer))
        .configure(queued)
        .start();
    tracing::info!(
        pending = executor.pending(),
        outstanding = executor.outstanding_work(),
        "posted work waits for the executor"
    );
    executor.run_pending();
    tracing::info!(signals = ?log.signals(), "posted work completed");

    let cell = CallbackCell::new(AsConsumer::new(|| tracing::info!("plain callback ran")));
    if let Err(rejected) = executor.post(cell) {
        tracing::warn!(code = rejected.error().code(), "manual executor refused the cell");
    }
    let dropped = executor.drop_pending();
    tracing::info!(dropped, "pending plain callback dropped without running");

    let (consumer, log) = RecordingConsumer::recording();
    connect!(RejectingExecutor::new(SubmitError::Saturated { capacity: 0 }), consumer).start();
    tracing::info!(errors = ?log.errors(), "rejected submission reported through on_error");
}
