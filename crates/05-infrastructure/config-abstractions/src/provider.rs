//! 配置源抽象接口

use std::collections::HashMap;

/// 常用配置源优先级，数值越大越优先
pub mod priority {
    /// 命令行参数
    pub const COMMAND_LINE: i32 = 400;
    /// 启动配置文件
    pub const BOOT_FILE: i32 = 300;
    /// 环境（profile）配置文件
    pub const PROFILE_FILE: i32 = 200;
    /// 环境变量
    pub const ENVIRONMENT_VARIABLES: i32 = 100;
    /// 默认值
    pub const DEFAULTS: i32 = 0;
}

/// 配置源 trait
///
/// 每个配置源提供扁平化的 `a.b.c` / `a.list[0]` 键值对，
/// 由分层环境按优先级合并。
pub trait PropertySource: Send + Sync {
    /// 配置源名称
    fn name(&self) -> &str;

    /// 配置源优先级
    fn priority(&self) -> i32 {
        priority::DEFAULTS
    }

    /// 获取原始值（不展开占位符）
    fn get(&self, key: &str) -> Option<String>;

    /// 所有配置键
    fn keys(&self) -> Vec<String>;

    /// 配置源是否为空
    fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// 导出全部键值
    fn to_map(&self) -> HashMap<String, String> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }
}
