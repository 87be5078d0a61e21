use core::fmt;

use crate::{
    error::{ExecutionError, codes},
    protocol::Consumer,
};

/// 把普通零参数回调适配为消费者。
///
/// # 设计背景（Why）
/// - 大量既有代码只持有 `FnOnce()` 形式的完成回调，需要一种无需手写消费者就能接入协议的方式；
/// - 普通回调没有错误通道：收到 `on_error` 时只能记录日志并丢弃回调，收到 `on_cancelled` 时直接丢弃。
///
/// # 契约说明（What）
/// - `on_value` 至多运行回调一次，之后的调用不再产生效果；
/// - 错误类型为 [`ExecutionError`]，因此可以直接作为桥接路径的消费者；
/// - 分派器拒绝把 `AsConsumer` 再次交给执行器桥接（双重包装没有意义，只会多一层调度）。
pub struct AsConsumer<F> {
    callback: Option<F>,
}

impl<F> AsConsumer<F>
where
    F: FnOnce(),
{
    /// 包装回调。
    pub fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// 回调是否尚未运行或丢弃。
    pub fn is_pending(&self) -> bool {
        self.callback.is_some()
    }

    /// 取回尚未运行的回调。
    pub fn into_inner(self) -> Option<F> {
        self.callback
    }
}

impl<F> Consumer<()> for AsConsumer<F>
where
    F: FnOnce(),
{
    type Error = ExecutionError;

    fn on_value(&mut self, (): ()) -> Result<(), ExecutionError> {
        if let Some(callback) = self.callback.take() {
            callback();
        }
        Ok(())
    }

    fn on_error(&mut self, error: ExecutionError) {
        tracing::error!(
            code = codes::EXECUTION_CALLBACK_DROPPED,
            cause = error.code(),
            error = %error,
            "plain callback received a terminal error and was dropped"
        );
        self.callback = None;
    }

    fn on_cancelled(&mut self) {
        self.callback = None;
    }
}

impl<F> fmt::Debug for AsConsumer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsConsumer")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::error::SubmitError;

    #[test]
    fn value_runs_callback_exactly_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut consumer = AsConsumer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(consumer.on_value(()).is_ok());
        assert!(consumer.on_value(()).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!consumer.is_pending());
    }

    #[test]
    fn error_drops_callback_without_running_it() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut consumer = AsConsumer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        consumer.on_error(SubmitError::Shutdown.into());
        assert!(consumer.on_value(()).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(consumer.into_inner().is_none());
    }
}
