//! 容器生命周期状态

use serde::{Deserialize, Serialize};
use std::fmt;

/// 容器初始化状态机
///
/// 状态严格按顺序推进：
/// `UNINITIALIZED → DISCOVERING → REGISTERED → INJECTED_PASS1 → MATERIALIZED → INJECTED_PASS2 → READY`，
/// 任何非终止状态都可以进入 `FAILED`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerState {
    /// 尚未初始化
    Uninitialized,
    /// 正在发现候选组件
    Discovering,
    /// 组件已注册
    Registered,
    /// 第一轮注入完成
    InjectedPass1,
    /// 工厂方法组件已物化
    Materialized,
    /// 第二轮注入完成
    InjectedPass2,
    /// 可用
    Ready,
    /// 初始化失败，容器不可用
    Failed,
}

impl ContainerState {
    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// 状态机中的下一个状态
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Uninitialized => Some(Self::Discovering),
            Self::Discovering => Some(Self::Registered),
            Self::Registered => Some(Self::InjectedPass1),
            Self::InjectedPass1 => Some(Self::Materialized),
            Self::Materialized => Some(Self::InjectedPass2),
            Self::InjectedPass2 => Some(Self::Ready),
            Self::Ready | Self::Failed => None,
        }
    }

    /// 是否允许查询和移除组件
    pub fn allows_lookup(self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Failed)
    }

    /// 状态名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Discovering => "DISCOVERING",
            Self::Registered => "REGISTERED",
            Self::InjectedPass1 => "INJECTED_PASS1",
            Self::Materialized => "MATERIALIZED",
            Self::InjectedPass2 => "INJECTED_PASS2",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
        }
    }
}

impl Default for ContainerState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
