use core::fmt;

use crate::{capability::Invocable, protocol::Consumer};

/// 回调单元：把消费者包装成执行器可以运行的一次性工作项。
///
/// # 设计背景（Why）
/// - 回调式执行器只认识“零参数、运行一次”的工作；桥接路径需要把消费者塞进这种形状，
///   同时保证消费者恰好收到一个终止信号；
/// - 单元独占消费者（不可 `Clone`），终止信号的唯一性由所有权直接保证。
///
/// # 逻辑解析（How）
/// - `invoke`：取出消费者并调用 `on_value(())`；若返回 `Err(e)`，紧接着调用 `on_error(e)`；
/// - `Drop`：若消费者仍在单元内（从未被调用），调用 `on_cancelled`；
/// - `disarm`：取出消费者且不发出任何信号，供桥接层在提交被拒绝时改走 `on_error`。
///
/// # 契约说明（What）
/// - 三条路径互斥，消费者在其中任意一条之后即被释放；
/// - `on_value` 若 panic，消费者已被取出，析构阶段不会再补发 `on_cancelled`。
pub struct CallbackCell<R: Consumer<()>> {
    consumer: Option<R>,
}

impl<R: Consumer<()>> CallbackCell<R> {
    /// 以消费者构造回调单元。
    pub fn new(consumer: R) -> Self {
        Self {
            consumer: Some(consumer),
        }
    }

    /// 运行回调：交付成功值，失败时改发错误。
    pub fn invoke(mut self) {
        if let Some(mut consumer) = self.consumer.take() {
            deliver(&mut consumer);
        }
    }

    /// 取回消费者且不发出任何终止信号。
    ///
    /// 未被调用过的单元总是返回 `Some`。
    pub fn disarm(mut self) -> Option<R> {
        self.consumer.take()
    }

    /// 单元是否仍持有消费者。
    pub fn is_armed(&self) -> bool {
        self.consumer.is_some()
    }
}

impl<R: Consumer<()>> Drop for CallbackCell<R> {
    fn drop(&mut self) {
        if let Some(mut consumer) = self.consumer.take() {
            tracing::debug!(
                consumer = core::any::type_name::<R>(),
                "callback cell dropped before invocation; signalling cancellation"
            );
            consumer.on_cancelled();
        }
    }
}

impl<R> Invocable for CallbackCell<R>
where
    R: Consumer<()> + Send + 'static,
{
    fn invoke(self) {
        CallbackCell::invoke(self);
    }
}

impl<R: Consumer<()>> fmt::Debug for CallbackCell<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackCell")
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// 交付成功值；消费者拒绝时在同一实例上改发 `on_error`。
pub(crate) fn deliver<R: Consumer<()>>(consumer: &mut R) {
    if let Err(error) = consumer.on_value(()) {
        tracing::debug!(
            consumer = core::any::type_name::<R>(),
            "on_value failed; redirecting to on_error"
        );
        consumer.on_error(error);
    }
}
