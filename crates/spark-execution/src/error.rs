//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 静态解析失败（无可用连接策略）由类型检查器直接拒绝，不在此处建模；
//! - 本模块只承载“运行期完成失败”：执行器拒绝提交、消费者自身报告的失败、缓冲区长度越界；
//! - 所有错误都带稳定的 `<领域>.<语义>` 错误码，便于日志检索与告警聚合。
//!
//! ## 设计要求（What）
//! - 错误类型派生 `thiserror::Error`，与 `std::error::Error` 生态兼容；
//! - 执行器拒绝提交时必须把工作项原样交还（[`Rejected`]），桥接层才能在不触发取消信号的情况下改走 `on_error`。

use std::borrow::Cow;

use thiserror::Error;

/// 稳定错误码集合。
///
/// # 契约说明（What）
/// - 码值遵循 `<领域>.<语义>` 命名约定，一经发布不得修改；
/// - 日志事件中的 `code` 字段统一取自此处。
pub mod codes {
    /// 执行器拒绝接收桥接工作项。
    pub const EXECUTION_SUBMIT_REJECTED: &str = "execution.submit_rejected";
    /// 执行器在接收桥接工作项时 panic，panic 已在 `start` 内截获。
    pub const EXECUTION_SUBMIT_PANICKED: &str = "execution.submit_panicked";
    /// `AsConsumer` 包装的普通回调收到了终止错误，回调被丢弃。
    pub const EXECUTION_CALLBACK_DROPPED: &str = "execution.callback_dropped";
    /// 执行器已关闭。
    pub const EXECUTOR_SHUTDOWN: &str = "executor.shutdown";
    /// 执行器队列已满。
    pub const EXECUTOR_SATURATED: &str = "executor.saturated";
    /// 执行器出于实现自定义原因拒绝。
    pub const EXECUTOR_REFUSED: &str = "executor.refused";
    /// 可增长缓冲区请求长度超过 `max_size`。
    pub const BUFFER_LENGTH_EXCEEDED: &str = "buffer.length_exceeded";
}

/// 执行器拒绝提交的原因。
///
/// # 教案式说明
/// - **意图 (Why)**：执行器是外部协作者，可能因关闭、饱和或自定义策略拒绝工作；
///   桥接层需要稳定的分类来决定日志级别并转交给消费者。
/// - **契约 (What)**：变体均为 `Send + Sync + 'static`，可安全跨线程传递。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SubmitError {
    /// 执行上下文已经停止接收新工作。
    #[error("executor has been shut down")]
    Shutdown,
    /// 执行器内部队列已满。
    #[error("executor queue is saturated (capacity {capacity})")]
    Saturated { capacity: usize },
    /// 其他实现自定义的拒绝原因。
    #[error("executor refused work: {reason}")]
    Refused { reason: Cow<'static, str> },
}

impl SubmitError {
    /// 构造自定义拒绝原因。
    pub fn refused(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Refused {
            reason: reason.into(),
        }
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Shutdown => codes::EXECUTOR_SHUTDOWN,
            Self::Saturated { .. } => codes::EXECUTOR_SATURATED,
            Self::Refused { .. } => codes::EXECUTOR_REFUSED,
        }
    }
}

/// 执行器拒绝提交时交还的工作项。
///
/// # 设计背景（Why）
/// - 回调单元（[`CallbackCell`](crate::bridge::CallbackCell)）在析构时会发出 `on_cancelled`；
///   若执行器在拒绝时直接丢弃工作项，消费者会先收到取消、再无法收到错误，违背“恰好一次”的约束；
/// - 借鉴 `std::sync::mpsc::SendError<T>` 的做法：失败路径把所有权还给调用方。
///
/// # 契约说明（What）
/// - `work`：被拒绝的原始工作项，调用方可以解除武装或重新提交；
/// - `error`：拒绝原因。
#[derive(Debug)]
pub struct Rejected<W> {
    work: W,
    error: SubmitError,
}

impl<W> Rejected<W> {
    /// 由执行器实现构造拒绝结果。
    pub fn new(work: W, error: SubmitError) -> Self {
        Self { work, error }
    }

    /// 查看拒绝原因。
    pub fn error(&self) -> &SubmitError {
        &self.error
    }

    /// 取回被拒绝的工作项。
    pub fn into_work(self) -> W {
        self.work
    }

    /// 同时取回工作项与拒绝原因。
    pub fn into_parts(self) -> (W, SubmitError) {
        (self.work, self.error)
    }
}

/// 运行期完成失败的统一错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：桥接层需要把“执行器拒绝”这种与消费者无关的失败转换成消费者能理解的错误；
///   因此桥接路径要求 `Consumer::Error: From<ExecutionError>`。
/// - **契约 (What)**：
///   - `SubmitRejected`：执行器拒绝提交，附带 [`SubmitError`]；
///   - `CallbackDropped`：普通回调无法处理错误而被丢弃；
///   - `Consumer`：消费者实现自行报告的失败，`code` 需遵循稳定命名。
/// - **设计权衡 (Trade-offs)**：消息使用 `Cow<'static, str>`，静态文本零分配，动态文本按需分配。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExecutionError {
    /// 执行器拒绝提交工作项。
    #[error("submission rejected: {0}")]
    SubmitRejected(#[from] SubmitError),
    /// `AsConsumer` 包装的回调收到终止错误。
    #[error("plain callback dropped after terminal error")]
    CallbackDropped,
    /// 消费者自定义失败。
    #[error("[{code}] {message}")]
    Consumer {
        code: &'static str,
        message: Cow<'static, str>,
    },
}

impl ExecutionError {
    /// 构造消费者自定义失败。
    pub fn consumer(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Consumer {
            code,
            message: message.into(),
        }
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::SubmitRejected(_) => codes::EXECUTION_SUBMIT_REJECTED,
            Self::CallbackDropped => codes::EXECUTION_CALLBACK_DROPPED,
            Self::Consumer { code, .. } => code,
        }
    }
}

/// 可增长缓冲区的容量错误。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum BufferError {
    /// 请求长度超过 `max_size`。
    #[error("requested {requested} bytes exceeds max_size {max_size}")]
    LengthExceeded { requested: usize, max_size: usize },
}

impl BufferError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::LengthExceeded { .. } => codes::BUFFER_LENGTH_EXCEEDED,
        }
    }
}
