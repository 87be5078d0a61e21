//! 执行器与消费者的测试桩集合。
//!
//! # 设计定位（Why）
//! - 契约测试需要反复构造三类执行器：内联完成（`dispatch`）、延后完成（`post` / `defer`）与拒绝提交；
//!   还需要能断言“收到了哪一个终止信号、收到了几次”的消费者；
//! - 统一出口避免各测试文件重复定义，契约演进时也能获得集中编译错误。
//!
//! # 使用方式（How）
//! - [`ManualExecutor`]：`dispatch` 在调用线程内联运行，`post` / `defer` 入队，
//!   由测试显式调用 [`ManualExecutor::run_pending`] 运行或 [`ManualExecutor::drop_pending`] 丢弃；
//! - [`RejectingExecutor`]：所有提交都以预设的 [`SubmitError`] 拒绝并交还工作项；
//! - [`RecordingConsumer`]：把终止信号写入共享的 [`CompletionLog`]。
//!
//! # 契约说明（What）
//! - 桩对象只用于测试与示例；计数器均为进程内原子量，可跨线程读取；
//! - 锁中毒时继续使用内部数据，桩对象不会因测试线程 panic 而二次 panic。

use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    capability::{Executor, Invocable},
    config::SubmitMode,
    error::{ExecutionError, Rejected, SubmitError},
    protocol::Consumer,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Job = Box<dyn FnOnce() + Send>;

/// [`ManualExecutor`] 共享的执行上下文。
#[derive(Default)]
pub struct ManualContext {
    queue: Mutex<VecDeque<Job>>,
    submissions: Mutex<Vec<SubmitMode>>,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl ManualContext {
    /// 队列中等待运行的工作数。
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }
}

impl fmt::Debug for ManualContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualContext")
            .field("pending", &self.pending())
            .field("started", &self.started.load(Ordering::Acquire))
            .field("finished", &self.finished.load(Ordering::Acquire))
            .finish()
    }
}

/// 由测试驱动的执行器。
///
/// # 行为描述（How）
/// - `dispatch`：立即在调用线程运行工作；
/// - `post` / `defer`：追加到队列尾部，等待 `run_pending`；
/// - 克隆共享同一个 [`ManualContext`]。
#[derive(Clone, Debug, Default)]
pub struct ManualExecutor {
    context: Arc<ManualContext>,
}

impl ManualExecutor {
    /// 创建空队列、零计数的执行器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次运行队列中的工作（包括运行过程中新入队的工作），返回运行数量。
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = lock(&self.context.queue).pop_front();
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// 丢弃队列中的全部工作而不运行，返回丢弃数量。
    pub fn drop_pending(&self) -> usize {
        let drained: Vec<Job> = lock(&self.context.queue).drain(..).collect();
        let count = drained.len();
        drop(drained);
        count
    }

    /// 队列中等待运行的工作数。
    pub fn pending(&self) -> usize {
        self.context.pending()
    }

    /// 历次提交所走的通道。
    pub fn submissions(&self) -> Vec<SubmitMode> {
        lock(&self.context.submissions).clone()
    }

    /// `on_work_started` 调用次数。
    pub fn work_started(&self) -> usize {
        self.context.started.load(Ordering::Acquire)
    }

    /// `on_work_finished` 调用次数。
    pub fn work_finished(&self) -> usize {
        self.context.finished.load(Ordering::Acquire)
    }

    /// 尚未结束的工作计数。
    pub fn outstanding_work(&self) -> usize {
        self.work_started().saturating_sub(self.work_finished())
    }

    fn record(&self, mode: SubmitMode) {
        lock(&self.context.submissions).push(mode);
    }

    fn enqueue<W: Invocable>(&self, mode: SubmitMode, work: W) {
        self.record(mode);
        lock(&self.context.queue).push_back(Box::new(move || work.invoke()));
    }
}

impl Executor for ManualExecutor {
    type Context = ManualContext;

    fn context(&self) -> &ManualContext {
        &self.context
    }

    fn on_work_started(&self) {
        self.context.started.fetch_add(1, Ordering::AcqRel);
    }

    fn on_work_finished(&self) {
        self.context.finished.fetch_add(1, Ordering::AcqRel);
    }

    fn dispatch<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.record(SubmitMode::Dispatch);
        work.invoke();
        Ok(())
    }

    fn post<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.enqueue(SubmitMode::Post, work);
        Ok(())
    }

    fn defer<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.enqueue(SubmitMode::Defer, work);
        Ok(())
    }
}

/// 拒绝一切提交的执行器。
#[derive(Clone, Debug)]
pub struct RejectingExecutor {
    error: SubmitError,
    attempts: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl RejectingExecutor {
    /// 以指定原因拒绝。
    pub fn new(error: SubmitError) -> Self {
        Self {
            error,
            attempts: Arc::default(),
            started: Arc::default(),
            finished: Arc::default(),
        }
    }

    /// 已尝试的提交次数。
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }

    /// 尚未结束的工作计数。
    pub fn outstanding_work(&self) -> usize {
        self.started
            .load(Ordering::Acquire)
            .saturating_sub(self.finished.load(Ordering::Acquire))
    }

    /// `on_work_started` 调用次数。
    pub fn work_started(&self) -> usize {
        self.started.load(Ordering::Acquire)
    }

    fn reject<W>(&self, work: W) -> Result<(), Rejected<W>> {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        Err(Rejected::new(work, self.error.clone()))
    }
}

impl Default for RejectingExecutor {
    fn default() -> Self {
        Self::new(SubmitError::Shutdown)
    }
}

impl Executor for RejectingExecutor {
    type Context = SubmitError;

    fn context(&self) -> &SubmitError {
        &self.error
    }

    fn on_work_started(&self) {
        self.started.fetch_add(1, Ordering::AcqRel);
    }

    fn on_work_finished(&self) {
        self.finished.fetch_add(1, Ordering::AcqRel);
    }

    fn dispatch<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.reject(work)
    }

    fn post<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.reject(work)
    }

    fn defer<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.reject(work)
    }
}

/// 消费者收到的终止信号。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Signal {
    Value,
    Error,
    Cancelled,
}

/// 终止信号记录，克隆共享同一份数据。
#[derive(Clone, Debug, Default)]
pub struct CompletionLog {
    signals: Arc<Mutex<Vec<Signal>>>,
    errors: Arc<Mutex<Vec<ExecutionError>>>,
}

impl CompletionLog {
    /// 创建空记录。
    pub fn new() -> Self {
        Self::default()
    }

    /// 按发生顺序返回全部信号。
    pub fn signals(&self) -> Vec<Signal> {
        lock(&self.signals).clone()
    }

    /// 返回 `on_error` 收到的全部错误。
    pub fn errors(&self) -> Vec<ExecutionError> {
        lock(&self.errors).clone()
    }

    /// 终止信号总数。
    pub fn terminal_count(&self) -> usize {
        lock(&self.signals).len()
    }

    fn push(&self, signal: Signal) {
        lock(&self.signals).push(signal);
    }
}

/// 把终止信号写入 [`CompletionLog`] 的消费者。
///
/// `fail_on_value` 模式下 `on_value` 返回错误且不记录值信号，用于验证“值被拒绝后改发错误”的路径。
#[derive(Debug)]
pub struct RecordingConsumer {
    log: CompletionLog,
    fail_on_value: bool,
}

impl RecordingConsumer {
    /// 构造正常消费者及其记录。
    pub fn recording() -> (Self, CompletionLog) {
        let log = CompletionLog::new();
        (Self::with_log(log.clone()), log)
    }

    /// 构造拒绝成功值的消费者及其记录。
    pub fn failing_on_value() -> (Self, CompletionLog) {
        let log = CompletionLog::new();
        let consumer = Self {
            log: log.clone(),
            fail_on_value: true,
        };
        (consumer, log)
    }

    /// 写入既有记录。
    pub fn with_log(log: CompletionLog) -> Self {
        Self {
            log,
            fail_on_value: false,
        }
    }
}

impl Consumer<()> for RecordingConsumer {
    type Error = ExecutionError;

    fn on_value(&mut self, (): ()) -> Result<(), ExecutionError> {
        if self.fail_on_value {
            return Err(ExecutionError::consumer(
                "test.value_rejected",
                "recording consumer refuses values",
            ));
        }
        self.log.push(Signal::Value);
        Ok(())
    }

    fn on_error(&mut self, error: ExecutionError) {
        lock(&self.log.errors).push(error);
        self.log.push(Signal::Error);
    }

    fn on_cancelled(&mut self) {
        self.log.push(Signal::Cancelled);
    }
}
