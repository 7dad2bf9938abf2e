//! 启动配置加载器
//!
//! 按固定优先级组装分层环境：
//! 命令行参数 > 启动配置文件 > 环境配置文件 > 环境变量 > 默认值。

use crate::manager::LayeredEnvironment;
use crate::providers::{
    CommandLinePropertySource, EnvironmentVariablePropertySource, FilePropertySource,
    MapPropertySource, SUPPORTED_EXTENSIONS,
};
use config_abstractions::{priority, PropertySource};
use infrastructure_common::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 启动配置文件名配置键
pub const BOOT_CONFIG_KEY: &str = "server.boot.conf";
/// 激活环境配置键
pub const PROFILE_KEY: &str = "server.profile";
/// 默认启动配置文件名主干
pub const DEFAULT_BOOT_CONFIG: &str = "application";
/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "APP";

/// 启动配置加载器
pub struct EnvironmentLoader {
    args: Vec<String>,
    config_dir: PathBuf,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
    defaults: HashMap<String, String>,
    profile: Option<String>,
    extra_sources: Vec<Arc<dyn PropertySource>>,
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentLoader {
    /// 创建加载器，配置目录默认为当前目录
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            config_dir: PathBuf::from("."),
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
            env_vars: None,
            defaults: HashMap::new(),
            profile: None,
            extra_sources: Vec::new(),
        }
    }

    /// 设置命令行参数
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// 设置配置目录
    pub fn with_config_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config_dir = dir.as_ref().to_path_buf();
        self
    }

    /// 设置环境变量前缀
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// 不读取环境变量
    pub fn without_env_vars(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// 使用给定变量集合代替进程环境变量
    pub fn with_env_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    /// 添加默认值
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// 显式指定激活环境
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// 添加额外配置源
    pub fn with_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.extra_sources.push(Arc::new(source));
        self
    }

    /// 加载分层环境
    pub fn load(self) -> ConfigResult<LayeredEnvironment> {
        let args = CommandLinePropertySource::parse(&self.args);
        let env_vars = self.env_prefix.as_ref().map(|prefix| match &self.env_vars {
            Some(vars) => EnvironmentVariablePropertySource::from_vars(prefix.clone(), vars.clone()),
            None => EnvironmentVariablePropertySource::new(prefix.clone()),
        });
        let defaults = MapPropertySource::from_pairs("defaults", self.defaults.clone())
            .with_priority(priority::DEFAULTS);

        let lookup = |key: &str, boot: Option<&FilePropertySource>| {
            args.get(key)
                .or_else(|| boot.and_then(|b| b.get(key)))
                .or_else(|| env_vars.as_ref().and_then(|e| e.get(key)))
                .or_else(|| defaults.get(key))
        };

        let explicit_boot = lookup(BOOT_CONFIG_KEY, None);
        let boot_name = explicit_boot
            .clone()
            .unwrap_or_else(|| DEFAULT_BOOT_CONFIG.to_string());
        let boot_file = self.load_file(&boot_name, priority::BOOT_FILE)?;
        match (&boot_file, &explicit_boot) {
            (Some(file), _) => info!("加载启动配置: {}", file.path().display()),
            (None, Some(name)) => {
                return Err(ConfigError::FileNotFound {
                    path: self.config_dir.join(name).display().to_string(),
                })
            }
            (None, None) => info!("未找到启动配置 {}，跳过", boot_name),
        }

        let profile = self
            .profile
            .clone()
            .or_else(|| lookup(PROFILE_KEY, boot_file.as_ref()))
            .filter(|p| !p.trim().is_empty());

        let stem = Path::new(&boot_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| boot_name.clone());

        let mut environment = LayeredEnvironment::new().with_source(args);
        if let Some(file) = boot_file {
            environment = environment.with_source(file);
        }
        if let Some(profile) = &profile {
            info!("激活环境: {}", profile);
            match self.load_file(&format!("{}-{}", stem, profile), priority::PROFILE_FILE)? {
                Some(file) => environment = environment.with_source(file),
                None => warn!("环境 {} 没有对应的配置文件", profile),
            }
            environment = environment.with_source(
                MapPropertySource::new("activeProfile")
                    .with_value(PROFILE_KEY, profile.clone())
                    .with_priority(priority::COMMAND_LINE - 1),
            );
        }
        if let Some(env_vars) = env_vars {
            environment = environment.with_source(env_vars);
        }
        environment = environment.with_source(defaults);
        for source in self.extra_sources {
            environment.add_source(source);
        }
        Ok(environment)
    }

    /// 加载 `name`：带受支持扩展名时直接加载，否则按主干查找
    fn load_file(&self, name: &str, priority: i32) -> ConfigResult<Option<FilePropertySource>> {
        let path = self.config_dir.join(name);
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e));
        let file = if has_extension {
            if path.is_file() {
                Some(FilePropertySource::load(&path)?)
            } else {
                None
            }
        } else {
            FilePropertySource::find(&path)?
        };
        Ok(file.map(|f| f.with_priority(priority)))
    }
}
