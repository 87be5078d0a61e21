use super::buffer::{BufferSequence, ConstKind, MutableKind};
use crate::error::BufferError;

/// 可增长缓冲区的公共能力面。
///
/// # 设计背景（Why）
/// - 两代可增长缓冲模型共享同一组观察接口：`size`、`max_size`、`capacity`、`data`、`consume`，
///   并各自声明只读视图与可写视图类型；
/// - 差异只在“如何扩容”，因此拆成 [`PrepareCommit`]（先预留再确认）与 [`GrowShrink`]（直接调整长度）两个子契约。
///
/// # 契约说明（What）
/// - `ConstView<'a>` 必须是只读区域序列，`MutableView<'a>` 必须是可写区域序列；
/// - `size() <= capacity()` 且 `size() <= max_size()` 恒成立；
/// - `consume(n)` 从头部移除至多 `n` 字节，超出部分忽略。
pub trait GrowableBuffer {
    /// 只读视图类型。
    type ConstView<'a>: BufferSequence<'a, ConstKind>
    where
        Self: 'a;
    /// 可写视图类型。
    type MutableView<'a>: BufferSequence<'a, MutableKind>
    where
        Self: 'a;

    /// 当前可读字节数。
    fn size(&self) -> usize;

    /// 允许的最大字节数。
    fn max_size(&self) -> usize;

    /// 无需重新分配即可容纳的字节数。
    fn capacity(&self) -> usize;

    /// 可读数据的只读视图。
    fn data(&self) -> Self::ConstView<'_>;

    /// 从头部移除 `n` 字节。
    fn consume(&mut self, n: usize);
}

/// 第一代模型：`prepare` 预留输出区，`commit` 将其并入可读区。
pub trait PrepareCommit: GrowableBuffer {
    /// 预留 `n` 字节的输出区。
    fn prepare(&mut self, n: usize) -> Result<Self::MutableView<'_>, BufferError>;

    /// 把输出区前 `n` 字节移入可读区。
    fn commit(&mut self, n: usize);
}

/// 第二代模型：`grow` / `shrink` 直接调整长度，`data_mut` 访问任意区间。
pub trait GrowShrink: GrowableBuffer {
    /// 在尾部追加 `n` 字节。
    fn grow(&mut self, n: usize) -> Result<(), BufferError>;

    /// 从尾部移除至多 `n` 字节。
    fn shrink(&mut self, n: usize);

    /// 区间 `[pos, pos + n)` 的可写视图（越界部分截断）。
    fn data_mut(&mut self, pos: usize, n: usize) -> Self::MutableView<'_>;
}

/// 可增长缓冲区分类结果。
///
/// 同时实现两种模型的类型归入 [`GrowableShape::GrowShrink`]，保证分类唯一。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GrowableShape {
    /// 第一代：预留 + 确认。
    PrepareCommit,
    /// 第二代：直接增长 / 收缩。
    GrowShrink,
}
