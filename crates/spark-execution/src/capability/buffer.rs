use core::iter::{Once, once};

use crate::sealed::Sealed;

/// 可写内存区域：对一段连续字节的独占借用。
///
/// # 契约说明（What）
/// - 区域本身不拥有内存，生命周期 `'a` 受底层存储约束；
/// - 可无损转换为 [`ConstRegion`]，反向转换不存在（兼容格的一部分）。
#[derive(Debug)]
pub struct MutableRegion<'a> {
    bytes: &'a mut [u8],
}

impl<'a> MutableRegion<'a> {
    /// 包装一段可写字节。
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// 区域长度（字节）。
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 区域是否为空。
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 只读视图。
    pub fn as_slice(&self) -> &[u8] {
        &*self.bytes
    }

    /// 可写视图。
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    /// 交还底层借用。
    pub fn into_inner(self) -> &'a mut [u8] {
        self.bytes
    }
}

/// 只读内存区域：对一段连续字节的共享借用。
#[derive(Clone, Copy, Debug)]
pub struct ConstRegion<'a> {
    bytes: &'a [u8],
}

impl<'a> ConstRegion<'a> {
    /// 包装一段只读字节。
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// 区域长度（字节）。
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 区域是否为空。
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 只读视图。
    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> From<MutableRegion<'a>> for ConstRegion<'a> {
    fn from(region: MutableRegion<'a>) -> Self {
        Self {
            bytes: region.bytes,
        }
    }
}

impl<'b, 'a: 'b> From<&'b MutableRegion<'a>> for ConstRegion<'b> {
    fn from(region: &'b MutableRegion<'a>) -> Self {
        Self {
            bytes: &*region.bytes,
        }
    }
}

impl<'b, 'a: 'b> From<&'b ConstRegion<'a>> for ConstRegion<'b> {
    fn from(region: &'b ConstRegion<'a>) -> Self {
        *region
    }
}

impl<'b, 'a: 'b> From<&'b mut MutableRegion<'a>> for MutableRegion<'b> {
    fn from(region: &'b mut MutableRegion<'a>) -> Self {
        Self {
            bytes: &mut *region.bytes,
        }
    }
}

/// 预注册内存的标识：由外部 I/O 后端在登记内存时分配，本 crate 只负责携带。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RegistrationId {
    index: usize,
}

impl RegistrationId {
    /// 以后端分配的登记序号构造标识。
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// 登记序号。
    pub fn index(&self) -> usize {
        self.index
    }
}

/// 已向 I/O 后端预注册的可写区域。
///
/// # 契约说明（What）
/// - 在兼容格中的位置与 [`MutableRegion`] 相同：单个可写注册区域同时兼容两种种类；
/// - 降级为普通区域时丢弃注册标识，反向转换不存在。
#[derive(Debug)]
pub struct MutableRegisteredRegion<'a> {
    region: MutableRegion<'a>,
    id: RegistrationId,
}

impl<'a> MutableRegisteredRegion<'a> {
    /// 为区域附加注册标识。
    pub fn new(region: MutableRegion<'a>, id: RegistrationId) -> Self {
        Self { region, id }
    }

    /// 注册标识。
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// 底层区域。
    pub fn region(&self) -> &MutableRegion<'a> {
        &self.region
    }

    /// 区域长度（字节）。
    pub fn len(&self) -> usize {
        self.region.len()
    }

    /// 区域是否为空。
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// 丢弃注册标识，交还普通区域。
    pub fn into_region(self) -> MutableRegion<'a> {
        self.region
    }
}

/// 已向 I/O 后端预注册的只读区域，仅兼容 [`ConstKind`]。
#[derive(Clone, Copy, Debug)]
pub struct ConstRegisteredRegion<'a> {
    region: ConstRegion<'a>,
    id: RegistrationId,
}

impl<'a> ConstRegisteredRegion<'a> {
    /// 为区域附加注册标识。
    pub fn new(region: ConstRegion<'a>, id: RegistrationId) -> Self {
        Self { region, id }
    }

    /// 注册标识。
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// 底层区域。
    pub fn region(&self) -> ConstRegion<'a> {
        self.region
    }

    /// 区域长度（字节）。
    pub fn len(&self) -> usize {
        self.region.len()
    }

    /// 区域是否为空。
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}

impl<'a> From<MutableRegisteredRegion<'a>> for MutableRegion<'a> {
    fn from(registered: MutableRegisteredRegion<'a>) -> Self {
        registered.region
    }
}

impl<'a> From<MutableRegisteredRegion<'a>> for ConstRegion<'a> {
    fn from(registered: MutableRegisteredRegion<'a>) -> Self {
        registered.region.into()
    }
}

impl<'a> From<MutableRegisteredRegion<'a>> for ConstRegisteredRegion<'a> {
    fn from(registered: MutableRegisteredRegion<'a>) -> Self {
        Self {
            region: registered.region.into(),
            id: registered.id,
        }
    }
}

impl<'a> From<ConstRegisteredRegion<'a>> for ConstRegion<'a> {
    fn from(registered: ConstRegisteredRegion<'a>) -> Self {
        registered.region
    }
}

impl<'b, 'a: 'b> From<&'b mut MutableRegisteredRegion<'a>> for MutableRegion<'b> {
    fn from(registered: &'b mut MutableRegisteredRegion<'a>) -> Self {
        MutableRegion::from(&mut registered.region)
    }
}

impl<'b, 'a: 'b> From<&'b MutableRegisteredRegion<'a>> for ConstRegion<'b> {
    fn from(registered: &'b MutableRegisteredRegion<'a>) -> Self {
        ConstRegion::from(&registered.region)
    }
}

impl<'b, 'a: 'b> From<&'b ConstRegisteredRegion<'a>> for ConstRegion<'b> {
    fn from(registered: &'b ConstRegisteredRegion<'a>) -> Self {
        registered.region
    }
}

/// 区域种类：兼容格的两个节点。
///
/// # 设计背景（Why）
/// - 兼容格是固定的：可写区域序列同时兼容可写与只读消费者，只读区域序列仅兼容只读消费者；
/// - 该 Trait 被 sealed，外部无法追加第三种节点，格的封闭性因此由编译器保证。
pub trait RegionKind: Sealed {
    /// 该种类对应的区域类型。
    type Region<'a>;

    /// 区域长度（字节）。
    fn region_len(region: &Self::Region<'_>) -> usize;
}

/// 可写区域种类。
#[derive(Clone, Copy, Debug)]
pub enum MutableKind {}

/// 只读区域种类。
#[derive(Clone, Copy, Debug)]
pub enum ConstKind {}

impl RegionKind for MutableKind {
    type Region<'a> = MutableRegion<'a>;

    fn region_len(region: &MutableRegion<'_>) -> usize {
        region.len()
    }
}

impl RegionKind for ConstKind {
    type Region<'a> = ConstRegion<'a>;

    fn region_len(region: &ConstRegion<'_>) -> usize {
        region.len()
    }
}

/// 区域序列契约：按序产出可转换为 `K::Region<'a>` 的元素。
///
/// # 逻辑解析（How）
/// - 任何 `IntoIterator` 只要元素可转换为目标区域类型即自动满足（`Vec`、数组、切片引用等）；
/// - 单个区域本身不可迭代，因此基例显式给出：单个 [`MutableRegion`] / [`MutableRegisteredRegion`]
///   兼容两种种类，单个 [`ConstRegion`] / [`ConstRegisteredRegion`] 只兼容 [`ConstKind`]。
///
/// # 契约说明（What）
/// - `regions` 消费序列并按原顺序产出区域；
/// - 不存在 `ConstRegion => MutableKind` 的转换，因此只读序列永远不会被判定为可写序列。
pub trait BufferSequence<'a, K: RegionKind> {
    /// 序列元素类型。
    type Region: Into<K::Region<'a>>;
    /// 元素迭代器。
    type Regions: Iterator<Item = Self::Region>;

    /// 按顺序展开区域。
    fn regions(self) -> Self::Regions;
}

impl<'a, K, S> BufferSequence<'a, K> for S
where
    K: RegionKind,
    S: IntoIterator,
    S::Item: Into<K::Region<'a>>,
{
    type Region = S::Item;
    type Regions = S::IntoIter;

    fn regions(self) -> Self::Regions {
        self.into_iter()
    }
}

impl<'a> BufferSequence<'a, MutableKind> for MutableRegion<'a> {
    type Region = MutableRegion<'a>;
    type Regions = Once<MutableRegion<'a>>;

    fn regions(self) -> Self::Regions {
        once(self)
    }
}

impl<'a> BufferSequence<'a, ConstKind> for MutableRegion<'a> {
    type Region = MutableRegion<'a>;
    type Regions = Once<MutableRegion<'a>>;

    fn regions(self) -> Self::Regions {
        once(self)
    }
}

impl<'a> BufferSequence<'a, ConstKind> for ConstRegion<'a> {
    type Region = ConstRegion<'a>;
    type Regions = Once<ConstRegion<'a>>;

    fn regions(self) -> Self::Regions {
        once(self)
    }
}

impl<'a> BufferSequence<'a, MutableKind> for MutableRegisteredRegion<'a> {
    type Region = MutableRegisteredRegion<'a>;
    type Regions = Once<MutableRegisteredRegion<'a>>;

    fn regions(self) -> Self::Regions {
        once(self)
    }
}

impl<'a> BufferSequence<'a, ConstKind> for MutableRegisteredRegion<'a> {
    type Region = MutableRegisteredRegion<'a>;
    type Regions = Once<MutableRegisteredRegion<'a>>;

    fn regions(self) -> Self::Regions {
        once(self)
    }
}

impl<'a> BufferSequence<'a, ConstKind> for ConstRegisteredRegion<'a> {
    type Region = ConstRegisteredRegion<'a>;
    type Regions = Once<ConstRegisteredRegion<'a>>;

    fn regions(self) -> Self::Regions {
        once(self)
    }
}

/// 统计序列中全部区域的总字节数。
pub fn buffer_size<'a, K, S>(sequence: S) -> usize
where
    K: RegionKind,
    S: BufferSequence<'a, K>,
{
    sequence
        .regions()
        .map(|region| K::region_len(&region.into()))
        .sum()
}
