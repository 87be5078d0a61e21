//! 连接分派器：为 `(生产者, 消费者)` 组合在编译期选出唯一的连接策略。
//!
//! # 设计综述（Why）
//! - 一个组合可能同时满足多种连接方式：生产者自带的成员连接、消费者一侧提供的自由连接、
//!   以及“生产者是执行器”时的桥接适配；分派器必须按固定次序挑出一个，且结果可预测；
//! - Rust 没有重载决议，这里以显式的有序探测阶梯替代：探测值按引用层级依次匹配
//!   **Member > Free > 双重包装守卫 > Adapter**，约束成立的最高层级胜出；
//! - 自由连接只查找消费者类型上的 [`ConnectFree`] 实现，分派器自身从不实现它，
//!   因此自由连接的查找不可能回绕到分派器（既不自递归，也不会遮蔽调用方的同名实现）。
//!
//! # 使用契约（What）
//! - [`connect!`](crate::connect) 在没有任何层级适用时无法通过编译；
//! - 胜出层级的具体操作类型原样透传给调用方，不做类型擦除；
//! - 判定宏 [`can_connect!`](crate::can_connect)、[`connect_strategy!`](crate::connect_strategy)、
//!   [`is_nothrow_connect!`](crate::is_nothrow_connect) 与连接使用同一阶梯，结论一致。
//!
//! # 风险提示（Trade-offs）
//! - 探测依赖方法解析，只对具体类型给出精确结论；泛型代码请改用 [`connect_member`] / [`connect_free`]
//!   或直接以 Trait 约束表达意图。

use core::fmt;

use crate::protocol::{OperationHandle, Producer};

/// 连接策略。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConnectStrategy {
    /// 生产者自带的成员连接。
    Member,
    /// 消费者一侧提供的自由连接。
    Free,
    /// 把执行器桥接为生产者。
    Adapter,
}

impl ConnectStrategy {
    /// 返回用于日志字段的稳定名称。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Free => "free",
            Self::Adapter => "adapter",
        }
    }
}

impl fmt::Display for ConnectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 成员连接：生产者自己知道如何与消费者 `R` 组合。
///
/// # 契约说明（What）
/// - `connect` 按值消费生产者与消费者，返回尚未启动的操作句柄；
/// - `NOTHROW` 声明构造过程是否保证不 panic，供 [`is_nothrow_connect!`](crate::is_nothrow_connect) 报告；
///   缺省为 `false`。
pub trait ConnectMember<R>: Producer + Sized {
    /// 连接产物。
    type Operation: OperationHandle;

    /// 构造过程是否保证不 panic。
    const NOTHROW: bool = false;

    /// 连接消费者。
    fn connect(self, consumer: R) -> Self::Operation;
}

/// 自由连接：实现在消费者类型上，描述如何接收生产者 `S`。
///
/// # 设计背景（Why）
/// - 对应“在生产者与消费者的关联命名空间中查找自由函数”的做法；
///   在 Rust 中由孤儿规则保证实现只能出现在消费者或生产者所属的 crate；
/// - 分派器不为任何类型提供该实现，自由连接的查找因此不会解析回分派器本身。
pub trait ConnectFree<S: Producer>: Sized {
    /// 连接产物。
    type Operation: OperationHandle;

    /// 构造过程是否保证不 panic。
    const NOTHROW: bool = false;

    /// 连接生产者与消费者。
    fn connect_free(producer: S, consumer: Self) -> Self::Operation;
}

/// 泛型上下文中的成员连接入口。
pub fn connect_member<S, R>(producer: S, consumer: R) -> S::Operation
where
    S: ConnectMember<R>,
{
    __private::MemberTag::<S, R>::new().connect(producer, consumer)
}

/// 泛型上下文中的自由连接入口。
pub fn connect_free<S, R>(producer: S, consumer: R) -> R::Operation
where
    S: Producer,
    R: ConnectFree<S>,
{
    __private::FreeTag::<S, R>::new().connect(producer, consumer)
}

/// 宏展开所需的探测设施，不属于稳定接口。
#[doc(hidden)]
pub mod __private {
    use core::marker::PhantomData;

    use super::{ConnectFree, ConnectMember, ConnectStrategy};
    use crate::{
        bridge::{AsConsumer, BridgeOperation},
        capability::Executor,
        error::ExecutionError,
        protocol::{Consumer, Producer},
    };

    /// 探测值：只携带类型信息。
    pub struct Probe<S, R>(PhantomData<fn() -> (S, R)>);

    impl<S, R> Probe<S, R> {
        pub fn new() -> Self {
            Self(PhantomData)
        }

        /// 从值引用推断类型参数。
        pub fn of(_producer: &S, _consumer: &R) -> Self {
            Self(PhantomData)
        }
    }

    impl<S, R> Default for Probe<S, R> {
        fn default() -> Self {
            Self::new()
        }
    }

    macro_rules! tag {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            pub struct $name<S, R>(PhantomData<fn() -> (S, R)>);

            impl<S, R> $name<S, R> {
                pub fn new() -> Self {
                    Self(PhantomData)
                }
            }

            impl<S, R> Default for $name<S, R> {
                fn default() -> Self {
                    Self::new()
                }
            }
        };
    }

    tag!(
        /// 成员连接层级的结论。
        MemberTag
    );
    tag!(
        /// 自由连接层级的结论。
        FreeTag
    );
    tag!(
        /// 桥接适配层级的结论。
        AdapterTag
    );
    tag!(
        /// 双重包装守卫的结论：`AsConsumer` 不得再次被桥接。
        RejectedTag
    );
    tag!(
        /// 没有任何层级适用。
        IllFormedTag
    );

    impl<S, R> MemberTag<S, R>
    where
        S: ConnectMember<R>,
    {
        pub fn connect(self, producer: S, consumer: R) -> S::Operation {
            tracing::trace!(
                strategy = ConnectStrategy::Member.as_str(),
                producer = core::any::type_name::<S>(),
                "connect resolved"
            );
            producer.connect(consumer)
        }

        pub fn strategy(&self) -> Option<ConnectStrategy> {
            Some(ConnectStrategy::Member)
        }

        pub fn is_nothrow(&self) -> bool {
            S::NOTHROW
        }
    }

    impl<S, R> FreeTag<S, R>
    where
        S: Producer,
        R: ConnectFree<S>,
    {
        pub fn connect(self, producer: S, consumer: R) -> R::Operation {
            tracing::trace!(
                strategy = ConnectStrategy::Free.as_str(),
                producer = core::any::type_name::<S>(),
                "connect resolved"
            );
            R::connect_free(producer, consumer)
        }

        pub fn strategy(&self) -> Option<ConnectStrategy> {
            Some(ConnectStrategy::Free)
        }

        pub fn is_nothrow(&self) -> bool {
            R::NOTHROW
        }
    }

    impl<S, R> AdapterTag<S, R>
    where
        S: Executor + Send + 'static,
        R: Consumer<()> + Send + 'static,
        R::Error: From<ExecutionError>,
    {
        pub fn connect(self, executor: S, consumer: R) -> BridgeOperation<S, R> {
            tracing::trace!(
                strategy = ConnectStrategy::Adapter.as_str(),
                producer = core::any::type_name::<S>(),
                "connect resolved"
            );
            BridgeOperation::new(executor, consumer)
        }

        pub fn strategy(&self) -> Option<ConnectStrategy> {
            Some(ConnectStrategy::Adapter)
        }

        pub fn is_nothrow(&self) -> bool {
            true
        }
    }

    impl<S, R> RejectedTag<S, R> {
        pub fn strategy(&self) -> Option<ConnectStrategy> {
            None
        }

        pub fn is_nothrow(&self) -> bool {
            false
        }
    }

    impl<S, R> IllFormedTag<S, R> {
        pub fn strategy(&self) -> Option<ConnectStrategy> {
            None
        }

        pub fn is_nothrow(&self) -> bool {
            false
        }
    }

    /// 第一层：成员连接。
    pub trait MemberRank {
        type Tag;
        fn __spark_connect_tag(&self) -> Self::Tag;
    }

    impl<S, R> MemberRank for &&&&Probe<S, R>
    where
        S: ConnectMember<R>,
    {
        type Tag = MemberTag<S, R>;

        fn __spark_connect_tag(&self) -> MemberTag<S, R> {
            MemberTag::new()
        }
    }

    /// 第二层：自由连接。
    pub trait FreeRank {
        type Tag;
        fn __spark_connect_tag(&self) -> Self::Tag;
    }

    impl<S, R> FreeRank for &&&Probe<S, R>
    where
        S: Producer,
        R: ConnectFree<S>,
    {
        type Tag = FreeTag<S, R>;

        fn __spark_connect_tag(&self) -> FreeTag<S, R> {
            FreeTag::new()
        }
    }

    /// 第三层：拦截对 `AsConsumer` 的再次桥接。
    pub trait DoubleWrapRank {
        type Tag;
        fn __spark_connect_tag(&self) -> Self::Tag;
    }

    impl<S, F> DoubleWrapRank for &&Probe<S, AsConsumer<F>> {
        type Tag = RejectedTag<S, AsConsumer<F>>;

        fn __spark_connect_tag(&self) -> RejectedTag<S, AsConsumer<F>> {
            RejectedTag::new()
        }
    }

    /// 第四层：执行器桥接。
    pub trait AdapterRank {
        type Tag;
        fn __spark_connect_tag(&self) -> Self::Tag;
    }

    impl<S, R> AdapterRank for &Probe<S, R>
    where
        S: Executor + Send + 'static,
        R: Consumer<()> + Send + 'static,
        R::Error: From<ExecutionError>,
    {
        type Tag = AdapterTag<S, R>;

        fn __spark_connect_tag(&self) -> AdapterTag<S, R> {
            AdapterTag::new()
        }
    }

    /// 兜底层：仅判定宏引入。
    pub trait IllFormedRank {
        type Tag;
        fn __spark_connect_tag(&self) -> Self::Tag;
    }

    impl<S, R> IllFormedRank for Probe<S, R> {
        type Tag = IllFormedTag<S, R>;

        fn __spark_connect_tag(&self) -> IllFormedTag<S, R> {
            IllFormedTag::new()
        }
    }
}

/// 按 Member > Free > Adapter 的次序连接生产者与消费者，返回胜出策略的操作句柄。
///
/// 没有可用策略，或试图把 [`AsConsumer`](crate::bridge::AsConsumer) 再次桥接时，无法通过编译：
///
/// ```compile_fail
/// use spark_execution::{bridge::AsConsumer, connect, test_stubs::ManualExecutor};
///
/// let executor = ManualExecutor::new();
/// let _op = connect!(executor, AsConsumer::new(|| {}));
/// ```
///
/// 既非执行器、也没有成员或自由连接的生产者同样被拒绝；`connect_strategy!` 对同一组合给出 `None`：
///
/// ```
/// use spark_execution::{ExecutionError, Producer, connect_strategy, test_stubs::RecordingConsumer};
///
/// struct Silent;
///
/// impl Producer for Silent {
///     type Value = ();
///     type Error = ExecutionError;
/// }
///
/// assert_eq!(connect_strategy!(Silent, RecordingConsumer), None);
/// ```
///
/// ```compile_fail
/// use spark_execution::{ExecutionError, Producer, connect, test_stubs::RecordingConsumer};
///
/// struct Silent;
///
/// impl Producer for Silent {
///     type Value = ();
///     type Error = ExecutionError;
/// }
///
/// let (consumer, _log) = RecordingConsumer::recording();
/// let _op = connect!(Silent, consumer);
/// ```
#[macro_export]
macro_rules! connect {
    ($producer:expr, $consumer:expr $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::dispatch::__private::{
            AdapterRank as _, DoubleWrapRank as _, FreeRank as _, MemberRank as _,
        };
        let producer = $producer;
        let consumer = $consumer;
        let probe = $crate::dispatch::__private::Probe::of(&producer, &consumer);
        (&&&&&probe)
            .__spark_connect_tag()
            .connect(producer, consumer)
    }};
}

/// 返回 `(生产者类型, 消费者类型)` 组合的胜出策略；不可连接时为 `None`。
#[macro_export]
macro_rules! connect_strategy {
    ($producer:ty, $consumer:ty $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::dispatch::__private::{
            AdapterRank as _, DoubleWrapRank as _, FreeRank as _, IllFormedRank as _,
            MemberRank as _,
        };
        let probe = $crate::dispatch::__private::Probe::<$producer, $consumer>::new();
        (&&&&&probe).__spark_connect_tag().strategy()
    }};
}

/// 判断组合是否存在可用的连接策略。
#[macro_export]
macro_rules! can_connect {
    ($producer:ty, $consumer:ty $(,)?) => {
        $crate::connect_strategy!($producer, $consumer).is_some()
    };
}

/// 判断胜出策略的构造过程是否保证不 panic；不可连接时为 `false`。
#[macro_export]
macro_rules! is_nothrow_connect {
    ($producer:ty, $consumer:ty $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::dispatch::__private::{
            AdapterRank as _, DoubleWrapRank as _, FreeRank as _, IllFormedRank as _,
            MemberRank as _,
        };
        let probe = $crate::dispatch::__private::Probe::<$producer, $consumer>::new();
        (&&&&&probe).__spark_connect_tag().is_nothrow()
    }};
}
