use std::sync::{Arc, PoisonError};

//
// 教案级说明：模型检查阶段（`--cfg loom`）切换到 Loom 的原子类型与互斥锁，
// 以便穷举“两次调用竞争”与“调用与析构竞争”的全部交错；`Arc` 保持标准实现。
#[cfg(not(any(loom, spark_loom)))]
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

#[cfg(any(loom, spark_loom))]
use loom::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use super::cell::deliver;
use crate::{capability::Invocable, protocol::Consumer};

/// 引用计数的回调单元，面向“可能重复回调”的外部接口。
///
/// # 设计背景（Why）
/// - 部分回调式 API 要求回调可复制，且不保证只调用一次；[`CallbackCell`](super::CallbackCell)
///   独占消费者，无法直接交给这类接口；
/// - 共享单元以原子一次性闸门收敛多次调用：只有第一次 `try_invoke` 能取走消费者。
///
/// # 逻辑解析（How）
/// - 闸门为 `AtomicBool`，`compare_exchange(false, true, AcqRel, Acquire)` 成功者获得交付权；
/// - 获得交付权的一方在锁内取出消费者，释放锁后再调用回调，避免回调重入时自锁；
/// - 最后一个克隆析构时若消费者仍未取走，发出 `on_cancelled`。
///
/// # 契约说明（What）
/// - `try_invoke` 返回 `true` 表示本次调用完成了交付，重复调用返回 `false` 且不产生任何信号；
/// - 任意克隆的调用都作用于同一个消费者，终止信号全局恰好一次。
pub struct SharedCallbackCell<R: Consumer<()>> {
    inner: Arc<SharedSlot<R>>,
}

struct SharedSlot<R: Consumer<()>> {
    fired: AtomicBool,
    consumer: Mutex<Option<R>>,
}

impl<R: Consumer<()>> SharedSlot<R> {
    fn take(&self) -> Option<R> {
        self.consumer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<R: Consumer<()>> Drop for SharedSlot<R> {
    fn drop(&mut self) {
        if let Some(mut consumer) = self.take() {
            tracing::debug!(
                consumer = core::any::type_name::<R>(),
                "shared callback cell released before invocation; signalling cancellation"
            );
            consumer.on_cancelled();
        }
    }
}

impl<R: Consumer<()>> SharedCallbackCell<R> {
    /// 以消费者构造共享单元。
    pub fn new(consumer: R) -> Self {
        Self {
            inner: Arc::new(SharedSlot {
                fired: AtomicBool::new(false),
                consumer: Mutex::new(Some(consumer)),
            }),
        }
    }

    /// 尝试交付成功值；只有第一次调用生效。
    pub fn try_invoke(&self) -> bool {
        if self
            .inner
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(
                consumer = core::any::type_name::<R>(),
                "duplicate invocation of shared callback cell ignored"
            );
            return false;
        }
        if let Some(mut consumer) = self.inner.take() {
            deliver(&mut consumer);
        }
        true
    }

    /// 闸门是否已经关闭。
    pub fn is_invoked(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }
}

impl<R: Consumer<()>> Clone for SharedCallbackCell<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Invocable for SharedCallbackCell<R>
where
    R: Consumer<()> + Send + 'static,
{
    fn invoke(self) {
        self.try_invoke();
    }
}
