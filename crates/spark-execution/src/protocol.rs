//! 生产者 / 消费者 / 操作句柄三项核心契约。
//!
//! # 设计综述（Why）
//! - 生产者只是“尚未启动的异步计算描述”，不持有运行状态，可被多次独立连接；
//! - 消费者暴露三条互斥的终止回调，任何已连接的操作都必须恰好触发其中之一一次；
//! - 连接产物是操作句柄，`start` 以值接收 `self`，“启动两次”因此在类型层面不可表达。
//!
//! # 使用契约（What）
//! - 生产者与消费者由调用方拥有，并在 `connect` 时按值移入；
//! - 操作句柄由调用方拥有，要么被 `start` 消费，要么被直接丢弃（未启动即放弃）；
//! - 终止信号发生在 `start` 之后，可以在 `start` 调用栈内同步发生，也可以在其他执行上下文异步发生。

/// 生产者契约：惰性的异步计算描述。
///
/// # 契约说明（What）
/// - `Value`：成功完成时交付给消费者的值类型；
/// - `Error`：失败时交付给消费者的错误类型；
/// - 实现者在被连接之前不得启动任何工作。
pub trait Producer {
    /// 成功值类型。
    type Value;
    /// 失败类型。
    type Error;
}

/// 消费者契约：三条互斥的终止回调。
///
/// # 设计背景（Why）
/// - 回调以 `&mut self` 接收，是因为交付值本身可能失败：`on_value` 返回 `Err` 时，
///   同一个消费者还要接着收到 `on_error`，两步必须作用在同一实例上；
/// - “恰好一次”由持有者（操作句柄或 [`CallbackCell`](crate::bridge::CallbackCell)）保证，
///   持有者在发出终止信号后立即释放消费者。
///
/// # 契约说明（What）
/// - **`on_value`**：交付成功值；返回 `Err(e)` 表示消费者拒绝该值，持有者需改发 `on_error(e)`；
/// - **`on_error`**：交付失败原因；
/// - **`on_cancelled`**：操作在交付前被放弃；
/// - **前置条件**：同一消费者实例在其生命周期内至多收到一次 `on_value`（成功）/ `on_error` / `on_cancelled`，
///   唯一的例外是上面描述的“值被拒绝后改发错误”。
pub trait Consumer<V = ()> {
    /// 失败类型。
    type Error;

    /// 交付成功值。
    fn on_value(&mut self, value: V) -> Result<(), Self::Error>;

    /// 交付失败原因。
    fn on_error(&mut self, error: Self::Error);

    /// 报告操作已被取消。
    fn on_cancelled(&mut self);
}

/// 操作句柄契约。
///
/// # 契约说明（What）
/// - `start` 消费句柄：零次调用（直接丢弃）是允许的放弃路径，多次调用无法通过编译；
/// - 句柄持有连接所需的全部资源；若工作异步完成，资源随工作项一同转移，保证存活到完成时刻；
/// - `start` 不得把运行期失败以 panic 形式抛出，失败应经由消费者的 `on_error` 报告。
pub trait OperationHandle {
    /// 启动操作。
    fn start(self);
}
