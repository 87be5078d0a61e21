//! 桥接路径的配置项。
//!
//! # 设计背景（Why）
//! - 适配器策略把消费者包装成回调单元后提交给执行器，但“提交到哪条通道”属于部署决策：
//!   `dispatch` 允许内联执行（同步完成），`post` / `defer` 保证延后执行；
//! - 宿主常以 TOML/JSON 管理运行参数，因此配置结构派生 `serde`，字段缺省时回落到默认值。
//!
//! # 契约说明（What）
//! - 默认配置：`submit_mode = "dispatch"`，`track_work = false`；
//! - 配置只影响提交方式与工作计数，不改变“恰好一次终止信号”的语义。

use serde::{Deserialize, Serialize};

/// 回调单元提交到执行器时使用的通道。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitMode {
    /// 允许在调用线程内联执行。
    #[default]
    Dispatch,
    /// 总是排队到执行上下文。
    Post,
    /// 排队执行，并提示这是当前工作的延续。
    Defer,
}

impl SubmitMode {
    /// 返回用于日志字段的稳定名称。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dispatch => "dispatch",
            Self::Post => "post",
            Self::Defer => "defer",
        }
    }
}

/// 桥接操作配置。
///
/// # 教案式说明
/// - **意图 (Why)**：让宿主在不改代码的前提下切换提交通道，并按需开启工作计数，
///   使执行上下文在桥接工作尚未完成时不会被判定为空闲；
/// - **契约 (What)**：`track_work = true` 时，桥接层在提交前调用 `on_work_started`，
///   并保证在工作执行、被丢弃或被拒绝后恰好调用一次 `on_work_finished`；
/// - **风险 (Trade-offs)**：开启计数要求执行器句柄可跨线程克隆（`Send + 'static`），
///   这一约束在桥接路径上本就成立。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub submit_mode: SubmitMode,
    pub track_work: bool,
}

impl BridgeConfig {
    /// 以指定提交通道构造配置。
    pub fn with_submit_mode(mut self, mode: SubmitMode) -> Self {
        self.submit_mode = mode;
        self
    }

    /// 开启或关闭工作计数。
    pub fn with_track_work(mut self, track: bool) -> Self {
        self.track_work = track;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_dispatches_without_tracking() {
        let config = BridgeConfig::default();
        assert_eq!(config.submit_mode, SubmitMode::Dispatch);
        assert!(!config.track_work);
    }

    #[test]
    fn builder_methods_override_fields() {
        let config = BridgeConfig::default()
            .with_submit_mode(SubmitMode::Defer)
            .with_track_work(true);
        assert_eq!(config.submit_mode.as_str(), "defer");
        assert!(config.track_work);
    }
}
