//! 配置环境抽象接口

use infrastructure_common::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::str::FromStr;

/// 配置环境 trait
///
/// 容器在标量值注入和结构化配置绑定时只读地访问配置环境。
pub trait ConfigurationEnvironment: Send + Sync {
    /// 获取配置值
    fn get(&self, key: &str) -> Option<String>;

    /// 获取配置值，缺失时返回默认值
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// 是否包含配置键
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 导出全部键值
    fn to_map(&self) -> HashMap<String, String>;

    /// 以给定前缀开头的所有键
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.to_map()
            .into_keys()
            .filter(|key| key.starts_with(prefix))
            .collect()
    }
}

impl<'a> dyn ConfigurationEnvironment + 'a {
    /// 获取并解析为目标类型
    pub fn get_typed<T>(&self, key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| ConfigError::TypeConversionError {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// 获取必需配置
    pub fn require(&self, key: &str) -> ConfigResult<String> {
        self.get(key).ok_or_else(|| ConfigError::KeyNotFound {
            key: key.to_string(),
        })
    }
}

/// 空配置环境
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyEnvironment;

impl ConfigurationEnvironment for EmptyEnvironment {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn to_map(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

impl ConfigurationEnvironment for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn to_map(&self) -> HashMap<String, String> {
        self.clone()
    }
}
