//! 常用 Trait 与类型的一站式导入。
//!
//! ```
//! use spark_execution::prelude::*;
//! ```

pub use crate::{
    bridge::{AsConsumer, BridgeOperation, CallbackCell, SharedCallbackCell, WorkGuard},
    capability::{
        BufferSequence, ConstKind, ConstRegion, Executor, GrowShrink, GrowableBuffer,
        GrowableShape, Invocable, MutableKind, MutableRegion, PrepareCommit,
    },
    config::{BridgeConfig, SubmitMode},
    dispatch::{ConnectFree, ConnectMember, ConnectStrategy},
    error::{ExecutionError, Rejected, SubmitError},
    normalize::{AsSingle, Completion, IoObject, RebindExecutor, as_single},
    protocol::{Consumer, OperationHandle, Producer},
};
