use core::{fmt, marker::PhantomData};

use super::AsSingle;
use crate::{
    capability::{Executor, Invocable},
    error::Rejected,
};

/// 以执行器参数化的 I/O 对象。
pub trait IoObject {
    /// 对象使用的执行器类型。
    type Executor: Executor;

    /// 返回对象执行器句柄的克隆。
    fn executor(&self) -> Self::Executor;
}

/// 把 I/O 对象改造为使用另一种执行器的等价对象。
///
/// # 契约说明（What）
/// - `rebind_executor` 消费原对象，以 `map` 把原执行器转换为 `E` 后构造新对象；
/// - 新对象除执行器类型外与原对象等价，`Rebound::Executor` 必须为 `E`。
pub trait RebindExecutor<E: Executor>: IoObject {
    /// 重绑定后的对象类型。
    type Rebound: IoObject<Executor = E>;

    /// 执行重绑定。
    fn rebind_executor<M>(self, map: M) -> Self::Rebound
    where
        M: FnOnce(Self::Executor) -> E;
}

/// 执行器声明的默认完成令牌。
pub trait DefaultCompletionToken: Executor {
    /// 默认令牌类型。
    type Token;

    /// 构造一个默认令牌。
    fn default_completion_token() -> Self::Token
    where
        Self::Token: Default,
    {
        Self::Token::default()
    }
}

/// 为内部执行器附加默认完成令牌 `Tok` 的执行器包装。
///
/// # 设计背景（Why）
/// - 调用方在每个异步调用处重复书写 `as_single(..)` 既啰嗦又容易遗漏；
///   把默认令牌挂在执行器类型上，I/O 对象即可在未显式指定令牌时自动采用它；
/// - 包装只在类型层面携带 `Tok`，运行期行为完全委托内部执行器。
///
/// # 契约说明（What）
/// - 六项执行器能力全部转发给内部执行器，`Context` 与内部执行器一致；
/// - 克隆只复制内部句柄，不要求 `Tok: Clone`。
pub struct ExecutorWithDefault<E, Tok> {
    inner: E,
    token: PhantomData<fn() -> Tok>,
}

impl<E, Tok> ExecutorWithDefault<E, Tok> {
    /// 包装内部执行器。
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            token: PhantomData,
        }
    }

    /// 先把任意可转换的执行器转换为内部类型，再包装。
    pub fn from_executor<O>(executor: O) -> Self
    where
        O: Into<E>,
    {
        Self::new(executor.into())
    }

    /// 查看内部执行器。
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// 取回内部执行器。
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E, Tok> From<E> for ExecutorWithDefault<E, Tok> {
    fn from(inner: E) -> Self {
        Self::new(inner)
    }
}

impl<E: Clone, Tok> Clone for ExecutorWithDefault<E, Tok> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<E: fmt::Debug, Tok> fmt::Debug for ExecutorWithDefault<E, Tok> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorWithDefault")
            .field("inner", &self.inner)
            .field("token", &core::any::type_name::<Tok>())
            .finish()
    }
}

impl<E: Executor, Tok> Executor for ExecutorWithDefault<E, Tok> {
    type Context = E::Context;

    fn context(&self) -> &Self::Context {
        self.inner.context()
    }

    fn on_work_started(&self) {
        self.inner.on_work_started();
    }

    fn on_work_finished(&self) {
        self.inner.on_work_finished();
    }

    fn dispatch<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.inner.dispatch(work)
    }

    fn post<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.inner.post(work)
    }

    fn defer<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.inner.defer(work)
    }
}

impl<E: Executor, Tok> DefaultCompletionToken for ExecutorWithDefault<E, Tok> {
    type Token = Tok;
}

/// 把 I/O 对象 `O` 改造为以 `AsSingle<T>` 为默认完成令牌的对象类型。
pub type AsDefaultOn<O, T> = <O as RebindExecutor<
    ExecutorWithDefault<<O as IoObject>::Executor, AsSingle<T>>,
>>::Rebound;
