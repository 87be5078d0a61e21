use crate::capability::Executor;

/// 工作计数守卫：存活期间告知执行上下文“仍有未完成工作”。
///
/// # 契约说明（What）
/// - 构造时调用一次 `on_work_started`；
/// - `reset` 或析构时调用一次 `on_work_finished`，两者合计恰好一次；
/// - 守卫持有执行器句柄的克隆，可随工作项一同转移到其他线程。
#[derive(Debug)]
pub struct WorkGuard<E: Executor> {
    executor: Option<E>,
}

impl<E: Executor> WorkGuard<E> {
    /// 登记一项未完成工作。
    pub fn new(executor: E) -> Self {
        executor.on_work_started();
        Self {
            executor: Some(executor),
        }
    }

    /// 守卫引用的执行器；`reset` 之后为 `None`。
    pub fn executor(&self) -> Option<&E> {
        self.executor.as_ref()
    }

    /// 守卫是否仍持有计数。
    pub fn owns_work(&self) -> bool {
        self.executor.is_some()
    }

    /// 提前结束计数。
    pub fn reset(&mut self) {
        if let Some(executor) = self.executor.take() {
            executor.on_work_finished();
        }
    }
}

impl<E: Executor> Drop for WorkGuard<E> {
    fn drop(&mut self) {
        self.reset();
    }
}
