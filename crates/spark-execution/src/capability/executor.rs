use crate::{config::SubmitMode, error::Rejected};

/// 可被执行器运行一次的零参数工作单元。
///
/// # 设计背景（Why）
/// - 执行器拒绝提交时必须把工作项还给调用方（见 [`Rejected`]），因此提交接口以具名类型 `W`
///   而非擦除后的闭包接收工作；桥接层据此取回回调单元并解除武装；
/// - 所有 `FnOnce() + Send + 'static` 闭包天然满足该契约，执行器实现无需区分两者。
///
/// # 契约说明（What）
/// - `invoke` 消费自身，至多运行一次；
/// - 工作项未被调用就被丢弃时，由工作项自己的 `Drop` 决定语义（回调单元会发出取消信号）。
pub trait Invocable: Send + 'static {
    /// 运行工作单元。
    fn invoke(self);
}

impl<F> Invocable for F
where
    F: FnOnce() + Send + 'static,
{
    fn invoke(self) {
        self()
    }
}

/// `Executor` 定义外部执行上下文的能力契约。
///
/// # 设计背景（Why）
/// - 本 crate 不实现任何线程池或事件循环，执行器始终是外部协作者；
/// - 能力集合固定为六项：`context`、`on_work_started`、`on_work_finished`、`dispatch`、`post`、`defer`，
///   只要类型实现这六项即可参与适配器策略，无需额外标记。
///
/// # 逻辑解析（How）
/// - `dispatch` 允许在调用线程内联运行（同步完成路径）；
/// - `post` 保证不在调用栈内运行；`defer` 同样延后运行，并提示这是当前工作的延续，
///   实现可据此选择更廉价的排队方式；
/// - `on_work_started` / `on_work_finished` 成对调用，用于告知上下文“仍有未完成工作”。
///
/// # 契约说明（What）
/// - **`Clone`**：执行器是指向执行上下文的轻量句柄，克隆只复制句柄，不得复制底层上下文；
/// - **提交返回值**：成功入队或已运行返回 `Ok(())`；拒绝时返回携带原工作项的 [`Rejected`]，
///   实现不得在拒绝路径上丢弃或运行工作项；
/// - **前置条件**：`on_work_finished` 的调用次数不得超过 `on_work_started`。
///
/// # 风险提示（Trade-offs）
/// - 提交接口为泛型方法，因此 `Executor` 不是对象安全的；需要动态分派时请在外层包裹具体类型。
pub trait Executor: Clone {
    /// 执行上下文类型。
    type Context: ?Sized;

    /// 返回该句柄所引用的执行上下文。
    fn context(&self) -> &Self::Context;

    /// 告知上下文有新的未完成工作。
    fn on_work_started(&self);

    /// 告知上下文一项未完成工作已经结束。
    fn on_work_finished(&self);

    /// 提交工作，允许内联执行。
    fn dispatch<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>>;

    /// 提交工作，保证延后执行。
    fn post<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>>;

    /// 提交延续工作，保证延后执行。
    fn defer<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>>;

    /// 按 [`SubmitMode`] 选择提交通道。
    fn submit<W: Invocable>(&self, mode: SubmitMode, work: W) -> Result<(), Rejected<W>> {
        match mode {
            SubmitMode::Dispatch => self.dispatch(work),
            SubmitMode::Post => self.post(work),
            SubmitMode::Defer => self.defer(work),
        }
    }
}
