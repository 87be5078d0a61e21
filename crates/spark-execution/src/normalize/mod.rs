//! 结果形态归一化：把变长的完成参数折叠为单一值再转交下游。
//!
//! # 设计综述（Why）
//! - 异步操作报告结果时可能携带零个、一个或多个参数，而下游完成令牌通常只想处理一个值；
//! - [`AsSingle`] 装饰下游令牌：零个参数转交 `()`，一个参数原样转交，两个及以上按到达顺序收集为元组；
//! - 装饰发生在连接之前，对分派器透明：`AsSingle<T>` 在 `T` 是消费者时自身也是消费者。
//!
//! # 使用契约（What）
//! - 完成参数统一以元组表示：`()`、`(A,)`、`(A, B)` … 最多八个元素；
//! - 下游令牌总是以“单元素元组”形式收到归一化后的值，即 `T: Completion<(Args::Single,)>`；
//! - 重绑定入口 [`AsSingle::as_default_on`] 把 I/O 对象的执行器替换为以 `AsSingle<T>` 为默认令牌的执行器。

mod rebind;

pub use rebind::{AsDefaultOn, DefaultCompletionToken, ExecutorWithDefault, IoObject, RebindExecutor};

use crate::protocol::Consumer;

/// 完成令牌：接收一次完成参数元组。
pub trait Completion<Args> {
    /// 报告完成。
    fn complete(self, args: Args);
}

/// 完成参数元组到单一值的折叠规则。
///
/// - `()` 折叠为 `()`；
/// - `(A,)` 折叠为 `A`；
/// - `(A, B, ..)` 保持为同序元组。
pub trait Normalize {
    /// 折叠后的值类型。
    type Single;

    /// 执行折叠。
    fn normalize(self) -> Self::Single;
}

impl Normalize for () {
    type Single = ();

    fn normalize(self) {}
}

impl<A> Normalize for (A,) {
    type Single = A;

    fn normalize(self) -> A {
        self.0
    }
}

macro_rules! closure_completion {
    ($($arg:ident),*) => {
        impl<Func, $($arg),*> Completion<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*),
        {
            #[allow(non_snake_case)]
            fn complete(self, ($($arg,)*): ($($arg,)*)) {
                self($($arg),*)
            }
        }
    };
}

macro_rules! aggregate_normalize {
    ($($arg:ident),+) => {
        impl<$($arg),+> Normalize for ($($arg,)+) {
            type Single = ($($arg,)+);

            fn normalize(self) -> Self::Single {
                self
            }
        }
    };
}

closure_completion!();
closure_completion!(A);
closure_completion!(A, B);
closure_completion!(A, B, C);
closure_completion!(A, B, C, D);
closure_completion!(A, B, C, D, E);
closure_completion!(A, B, C, D, E, F);
closure_completion!(A, B, C, D, E, F, G);
closure_completion!(A, B, C, D, E, F, G, H);

aggregate_normalize!(A, B);
aggregate_normalize!(A, B, C);
aggregate_normalize!(A, B, C, D);
aggregate_normalize!(A, B, C, D, E);
aggregate_normalize!(A, B, C, D, E, F);
aggregate_normalize!(A, B, C, D, E, F, G);
aggregate_normalize!(A, B, C, D, E, F, G, H);

/// 单值装饰器。
///
/// # 教案式说明
/// - **意图 (Why)**：让只处理单一值的下游令牌或消费者直接对接多参数完成的操作；
/// - **逻辑 (How)**：作为完成令牌时先折叠参数再调用 `T::complete((single,))`；
///   作为消费者时在 `on_value` 中折叠，`on_error` / `on_cancelled` 原样转交；
/// - **契约 (What)**：装饰器不改变终止信号的数量与种类，只改变值的形态；
/// - **构造 (Trade-offs)**：除 [`AsSingle::new`] / [`as_single`] 外，
///   [`AsSingle::from_default_token`] 以 `T::default()` 构造，用具名工厂取代隐式默认构造。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AsSingle<T> {
    token: T,
}

impl<T> AsSingle<T> {
    /// 装饰下游令牌。
    pub fn new(token: T) -> Self {
        Self { token }
    }

    /// 以下游令牌的默认值构造。
    pub fn from_default_token() -> Self
    where
        T: Default,
    {
        Self::new(T::default())
    }

    /// 查看下游令牌。
    pub fn token(&self) -> &T {
        &self.token
    }

    /// 取回下游令牌。
    pub fn into_inner(self) -> T {
        self.token
    }

    /// 把 I/O 对象的执行器重绑定为以 `AsSingle<T>` 为默认令牌的执行器。
    pub fn as_default_on<O>(object: O) -> AsDefaultOn<O, T>
    where
        O: IoObject + RebindExecutor<ExecutorWithDefault<<O as IoObject>::Executor, AsSingle<T>>>,
    {
        object.rebind_executor(ExecutorWithDefault::new)
    }
}

/// 装饰下游令牌，使其收到单一值。
#[must_use = "AsSingle does nothing until it is used as a completion token or consumer"]
pub fn as_single<T>(token: T) -> AsSingle<T> {
    AsSingle::new(token)
}

impl<T, Args> Completion<Args> for AsSingle<T>
where
    Args: Normalize,
    T: Completion<(Args::Single,)>,
{
    fn complete(self, args: Args) {
        self.token.complete((args.normalize(),));
    }
}

impl<T, Args> Consumer<Args> for AsSingle<T>
where
    Args: Normalize,
    T: Consumer<Args::Single>,
{
    type Error = T::Error;

    fn on_value(&mut self, value: Args) -> Result<(), Self::Error> {
        self.token.on_value(value.normalize())
    }

    fn on_error(&mut self, error: Self::Error) {
        self.token.on_error(error);
    }

    fn on_cancelled(&mut self) {
        self.token.on_cancelled();
    }
}
