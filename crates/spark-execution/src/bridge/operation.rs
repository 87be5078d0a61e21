use core::{any::Any, fmt};
use std::panic::{self, AssertUnwindSafe};

use super::{cell::CallbackCell, work_guard::WorkGuard};
use crate::{
    capability::{Executor, Invocable},
    config::BridgeConfig,
    error::{ExecutionError, codes},
    protocol::{Consumer, OperationHandle},
};

/// 桥接操作：把回调式执行器当作生产者，与消费者组合成可启动的操作句柄。
///
/// # 设计背景（Why）
/// - 执行器只提供“提交一项工作”的能力，而协议要求“恰好一个终止信号”；
///   桥接操作把消费者装入 [`CallbackCell`]，让“工作运行 / 工作被丢弃”分别对应值信号与取消信号；
/// - 提交失败属于运行期完成失败，必须转交给消费者的 `on_error`，不得从 `start` 向外传播。
///
/// # 逻辑解析（How）
/// 1. `start` 在 `spark_execution.bridge.start` span 内构造回调单元；
/// 2. 按 [`BridgeConfig::submit_mode`] 选择 `dispatch` / `post` / `defer` 提交；
/// 3. 若 `track_work` 开启，工作项额外携带 [`WorkGuard`]，工作结束（运行、丢弃或被拒绝）时计数归还；
/// 4. 执行器拒绝时取回工作项，解除回调单元的武装，再向消费者发出唯一一次
///    `on_error(ExecutionError::SubmitRejected(..).into())`；
/// 5. 提交过程中的 panic（执行器自身，或 `dispatch` 内联运行的消费者）在 `start` 内被截获并记录，
///    此时工作项已随展开析构，消费者收到的终止信号由回调单元决定。
///
/// # 契约说明（What）
/// - 句柄持有执行器与消费者；`start` 消费句柄，未启动即丢弃时两者一并释放，不发出任何信号；
/// - 终止信号可能在 `start` 调用栈内同步发生（`dispatch` 内联执行），也可能稍后在执行上下文中发生。
///
/// # 风险提示（Trade-offs）
/// - 工作项需要 `Send + 'static`，因此消费者与执行器句柄都必须满足该约束；
/// - 被截获的 panic 无法改写为 `on_error`：消费者在展开期间已随工作项交出，只能得到取消信号。
///   若 panic 发生在消费者自己的 `on_value` 中，消费者不会再收到任何信号。
pub struct BridgeOperation<S, R> {
    executor: S,
    consumer: R,
    config: BridgeConfig,
}

impl<S, R> BridgeOperation<S, R>
where
    S: Executor,
    R: Consumer<()>,
{
    /// 以默认配置构造桥接操作。
    pub fn new(executor: S, consumer: R) -> Self {
        Self::with_config(executor, consumer, BridgeConfig::default())
    }

    /// 以指定配置构造桥接操作。
    pub fn with_config(executor: S, consumer: R, config: BridgeConfig) -> Self {
        Self {
            executor,
            consumer,
            config,
        }
    }

    /// 替换配置，供 `connect!` 之后调整提交方式。
    pub fn configure(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// 当前配置。
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// 被桥接的执行器。
    pub fn executor(&self) -> &S {
        &self.executor
    }
}

impl<S, R> OperationHandle for BridgeOperation<S, R>
where
    S: Executor + Send + 'static,
    R: Consumer<()> + Send + 'static,
    R::Error: From<ExecutionError>,
{
    fn start(self) {
        let Self {
            executor,
            consumer,
            config,
        } = self;
        let span = tracing::debug_span!(
            "spark_execution.bridge.start",
            mode = config.submit_mode.as_str(),
            track_work = config.track_work,
        );
        let _entered = span.enter();

        let work = BridgeWork {
            cell: CallbackCell::new(consumer),
            guard: config
                .track_work
                .then(|| WorkGuard::new(executor.clone())),
        };

        let submitted = panic::catch_unwind(AssertUnwindSafe(|| {
            executor.submit(config.submit_mode, work)
        }));
        let outcome = match submitted {
            Ok(outcome) => outcome,
            Err(payload) => {
                // 展开途中工作项已被析构：回调单元发出了取消信号，守卫归还了计数。
                tracing::error!(
                    code = codes::EXECUTION_SUBMIT_PANICKED,
                    panic = panic_message(payload.as_ref()),
                    mode = config.submit_mode.as_str(),
                    "executor panicked while accepting bridge work; panic contained"
                );
                return;
            }
        };

        if let Err(rejected) = outcome {
            let (work, error) = rejected.into_parts();
            tracing::warn!(
                code = error.code(),
                error = %error,
                mode = config.submit_mode.as_str(),
                "executor rejected bridge work; forwarding to on_error"
            );
            let BridgeWork { cell, guard } = work;
            if let Some(mut consumer) = cell.disarm() {
                consumer.on_error(ExecutionError::SubmitRejected(error).into());
            }
            drop(guard);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

impl<S, R> fmt::Debug for BridgeOperation<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeOperation")
            .field("executor", &core::any::type_name::<S>())
            .field("consumer", &core::any::type_name::<R>())
            .field("config", &self.config)
            .finish()
    }
}

/// 实际提交给执行器的工作项：回调单元加可选的工作计数守卫。
///
/// 字段顺序决定析构顺序：回调单元先发出取消信号，守卫随后归还计数。
struct BridgeWork<S, R>
where
    S: Executor,
    R: Consumer<()>,
{
    cell: CallbackCell<R>,
    guard: Option<WorkGuard<S>>,
}

impl<S, R> Invocable for BridgeWork<S, R>
where
    S: Executor + Send + 'static,
    R: Consumer<()> + Send + 'static,
{
    fn invoke(self) {
        let BridgeWork { cell, guard } = self;
        cell.invoke();
        drop(guard);
    }
}
