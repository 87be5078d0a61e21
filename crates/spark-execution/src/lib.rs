#![deny(unsafe_code)]
#![doc = "spark-execution: 生产者/消费者异步操作组合协议。"]
#![doc = ""]
#![doc = "本 Crate 负责把“尚未启动的异步计算描述”（Producer）与“结果消费方式”（Consumer）连接为"]
#![doc = "一个只能启动一次的操作句柄（OperationHandle），并提供编译期能力分类、回调执行器桥接与结果形态归一化。"]
#![doc = ""]
#![doc = "== 模块地图 =="]
#![doc = "1. [`capability`]：Executor / BufferSequence / GrowableBuffer 能力契约与静态判定宏；"]
#![doc = "2. [`dispatch`]：`connect!` 按 Member > Free > Adapter 的固定次序选择连接策略；"]
#![doc = "3. [`bridge`]：`CallbackCell` 与 `BridgeOperation`，把回调式执行器接入生产者/消费者模型；"]
#![doc = "4. [`normalize`]：`AsSingle` 将变长完成参数折叠为单一值，并支持执行器默认完成令牌重绑定。"]

// 教案级说明：宏导出策略。
//
// # 意图（Why）
// - 能力判定与连接分派都依赖“在具体类型上做方法解析”的技巧，只能以 `macro_rules!` 形式提供；
// - 宏统一通过 `#[macro_export]` 暴露在 crate 根，调用方写 `spark_execution::connect!(..)` 即可。
//
// # 注意事项（Trade-offs）
// - 探测宏只能在非泛型上下文中得到精确结论；泛型代码应直接以对应 Trait 作为约束。
mod sealed;

pub mod bridge;
pub mod capability;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod prelude;
pub mod protocol;
/// 测试桩命名空间，集中暴露框架维护的手动执行器、拒绝执行器与记录型消费者。
///
/// # 设计背景（Why）
/// - 契约测试需要反复构造“同步完成 / 延后完成 / 提交失败”三类执行器与可断言的消费者；
/// - 统一维护可避免各测试文件重复定义，并在契约演进时获得集中编译错误。
pub mod test_stubs;

pub use bridge::{AsConsumer, BridgeOperation, CallbackCell, SharedCallbackCell, WorkGuard};
pub use capability::{
    BufferSequence, ConstKind, ConstRegion, ConstRegisteredRegion, Executor, GrowShrink,
    GrowableBuffer, GrowableShape, Invocable, MutableKind, MutableRegion, MutableRegisteredRegion,
    PrepareCommit, RegionKind, RegistrationId, buffer_size,
};
pub use config::{BridgeConfig, SubmitMode};
pub use dispatch::{ConnectFree, ConnectMember, ConnectStrategy};
pub use error::{BufferError, ExecutionError, Rejected, SubmitError, codes};
pub use normalize::{
    AsDefaultOn, AsSingle, Completion, DefaultCompletionToken, ExecutorWithDefault, IoObject,
    Normalize, RebindExecutor, as_single,
};
pub use protocol::{Consumer, OperationHandle, Producer};
