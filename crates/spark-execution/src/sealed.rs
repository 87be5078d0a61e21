//! 内部 sealed 模块用于控制外部扩展边界。
//!
//! # 设计背景（Why）
//! - 缓冲区兼容格（mutable ⇒ {mutable, const}，const ⇒ {const}）是固定的，
//!   若允许外部追加新的 [`RegionKind`](crate::capability::RegionKind)，格的封闭性就无从保证；
//! - 模块本身私有，外部 crate 无法命名 `Sealed`，因此只有这里列举的类型能实现依赖它的公开 Trait。
//!
//! # 契约说明（What）
//! - 新增区域种类时必须同步更新此处并复核分类宏的测试。
pub trait Sealed {}

impl Sealed for crate::capability::MutableKind {}
impl Sealed for crate::capability::ConstKind {}
