//! 能力分类器：在编译期回答“某个类型是否满足某项结构化能力”。
//!
//! # 设计综述（Why）
//! - 连接分派、桥接与缓冲区适配都需要先判断类型具备哪些能力，再决定走哪条路径；
//! - 能力以显式 Trait 表达（[`Executor`]、[`BufferSequence`]、[`GrowableBuffer`] 及其两个子模型），
//!   判定则通过自动引用探测（autoref probing）完成：候选实现按接收者引用层级排序，
//!   约束成立的最高层级胜出，约束不成立时回落到恒为 `false` 的兜底实现；
//! - 兜底实现不依赖任何成员查找，因此标量与内建类型（`u32`、`bool`、`&str`、`()`）一律得到 `false`。
//!
//! # 使用契约（What）
//! - 判定宏返回普通 `bool` / `Option<GrowableShape>`，无副作用；
//! - 宏内部声明局部探测类型，只能作用于具体类型；泛型代码请直接以对应 Trait 作为约束。
//!
//! # 风险提示（Trade-offs）
//! - 缓冲序列判定固定在 `'static` 生命周期下求值：对借用型序列请以 `'static` 借用书写类型
//!   （如 `&'static [ConstRegion<'static>]`），判定结果与具体生命周期无关。

mod buffer;
mod executor;
mod growable;

pub use buffer::{
    BufferSequence, ConstKind, ConstRegion, ConstRegisteredRegion, MutableKind, MutableRegion,
    MutableRegisteredRegion, RegionKind, RegistrationId, buffer_size,
};
pub use executor::{Executor, Invocable};
pub use growable::{GrowShrink, GrowableBuffer, GrowableShape, PrepareCommit};

/// 单一能力探测的公共骨架。
///
/// 约束成立时按值命中 `__Holds`，否则经自动引用命中 `__Lacks`。
#[doc(hidden)]
#[macro_export]
macro_rules! __capability_probe {
    ($ty:ty => $($bound:tt)+) => {{
        struct __Probe<T: ?Sized>(::core::marker::PhantomData<T>);

        trait __Holds {
            fn __hit(&self) -> bool {
                true
            }
        }
        impl<T: ?Sized + $($bound)+> __Holds for __Probe<T> {}

        trait __Lacks {
            fn __hit(&self) -> bool {
                false
            }
        }
        impl<T: ?Sized> __Lacks for &__Probe<T> {}

        (&__Probe::<$ty>(::core::marker::PhantomData)).__hit()
    }};
}

/// 判断类型是否实现 [`Executor`] 全部六项能力。
///
/// ```
/// use spark_execution::{is_executor, test_stubs::ManualExecutor};
///
/// assert!(is_executor!(ManualExecutor));
/// assert!(!is_executor!(u32));
/// ```
#[macro_export]
macro_rules! is_executor {
    ($ty:ty) => {
        $crate::__capability_probe!($ty => $crate::capability::Executor)
    };
}

/// 判断类型是否为给定种类的区域序列（在 `'static` 下求值）。
///
/// ```
/// use spark_execution::{ConstKind, ConstRegion, MutableKind, MutableRegion, is_buffer_sequence};
///
/// assert!(is_buffer_sequence!(MutableRegion<'static>, ConstKind));
/// assert!(is_buffer_sequence!(Vec<MutableRegion<'static>>, MutableKind));
/// assert!(!is_buffer_sequence!(ConstRegion<'static>, MutableKind));
/// assert!(!is_buffer_sequence!(&'static str, ConstKind));
/// ```
#[macro_export]
macro_rules! is_buffer_sequence {
    ($ty:ty, $kind:ty) => {
        $crate::__capability_probe!($ty => $crate::capability::BufferSequence<'static, $kind>)
    };
}

/// 给出可增长缓冲区的唯一分类。
///
/// # 逻辑解析（How）
/// - 三级探测：`&&P` 上的第二代候选、`&P` 上的第一代候选、`P` 上的兜底；
/// - 同时实现两种模型的类型由第二代候选先行命中，结果因此唯一。
#[macro_export]
macro_rules! growable_shape {
    ($ty:ty) => {{
        struct __Probe<T: ?Sized>(::core::marker::PhantomData<T>);

        trait __ShapeGrowShrink {
            fn __shape(&self) -> ::core::option::Option<$crate::capability::GrowableShape> {
                ::core::option::Option::Some($crate::capability::GrowableShape::GrowShrink)
            }
        }
        impl<T: ?Sized + $crate::capability::GrowShrink> __ShapeGrowShrink for &&__Probe<T> {}

        trait __ShapePrepareCommit {
            fn __shape(&self) -> ::core::option::Option<$crate::capability::GrowableShape> {
                ::core::option::Option::Some($crate::capability::GrowableShape::PrepareCommit)
            }
        }
        impl<T: ?Sized + $crate::capability::PrepareCommit> __ShapePrepareCommit for &__Probe<T> {}

        trait __ShapeNone {
            fn __shape(&self) -> ::core::option::Option<$crate::capability::GrowableShape> {
                ::core::option::Option::None
            }
        }
        impl<T: ?Sized> __ShapeNone for __Probe<T> {}

        (&&&__Probe::<$ty>(::core::marker::PhantomData)).__shape()
    }};
}

/// 判断类型是否被归类为第一代（prepare / commit）可增长缓冲区。
#[macro_export]
macro_rules! is_growable_buffer_v1 {
    ($ty:ty) => {
        ::core::matches!(
            $crate::growable_shape!($ty),
            ::core::option::Option::Some($crate::capability::GrowableShape::PrepareCommit)
        )
    };
}

/// 判断类型是否被归类为第二代（grow / shrink）可增长缓冲区。
#[macro_export]
macro_rules! is_growable_buffer_v2 {
    ($ty:ty) => {
        ::core::matches!(
            $crate::growable_shape!($ty),
            ::core::option::Option::Some($crate::capability::GrowableShape::GrowShrink)
        )
    };
}
