//! 回调桥接：让只接受“零参数回调”的执行器参与生产者/消费者协议。
//!
//! # 设计综述（Why）
//! - 执行器是外部协作者，只会运行或丢弃提交给它的工作；
//!   本模块把这两种结局分别映射为消费者的值信号与取消信号，并把“提交被拒绝”映射为错误信号；
//! - 所有路径共享同一条不变式：每个已连接的操作恰好产生一个终止信号。
//!
//! # 组成（What）
//! - [`CallbackCell`]：独占消费者的一次性工作项；
//! - [`BridgeOperation`]：适配器策略产出的操作句柄；
//! - [`WorkGuard`]：成对调用 `on_work_started` / `on_work_finished` 的计数守卫；
//! - [`AsConsumer`]：把普通回调包装为消费者；
//! - [`SharedCallbackCell`]：面向可能重复回调的接口的共享变体。

mod as_consumer;
mod cell;
mod operation;
mod shared;
mod work_guard;

pub use as_consumer::AsConsumer;
pub use cell::CallbackCell;
pub use operation::BridgeOperation;
pub use shared::SharedCallbackCell;
pub use work_guard::WorkGuard;
