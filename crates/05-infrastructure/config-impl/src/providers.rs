//! 配置源实现

use config_abstractions::{priority, PropertySource};
use infrastructure_common::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 支持的配置文件扩展名，按查找顺序
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["properties", "toml", "yaml", "yml", "json"];

/// 内存键值配置源
#[derive(Debug, Clone)]
pub struct MapPropertySource {
    name: String,
    priority: i32,
    values: HashMap<String, String>,
}

impl MapPropertySource {
    /// 创建新的内存配置源
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: priority::DEFAULTS,
            values: HashMap::new(),
        }
    }

    /// 从键值对创建
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::new(name);
        for (key, value) in pairs {
            source.values.insert(key.into(), value.into());
        }
        source
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 添加配置
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 写入配置
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn to_map(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}

/// 命令行参数配置源
///
/// 识别 `--key=value`；单独的 `--flag` 视为 `flag=true`，其他参数忽略。
#[derive(Debug, Clone)]
pub struct CommandLinePropertySource {
    inner: MapPropertySource,
}

impl CommandLinePropertySource {
    /// 解析命令行参数
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = MapPropertySource::new("commandLineArgs").with_priority(priority::COMMAND_LINE);
        for arg in args {
            let arg = arg.as_ref();
            let Some(body) = arg.strip_prefix("--") else {
                debug!("忽略非选项参数: {}", arg);
                continue;
            };
            match body.split_once('=') {
                Some((key, value)) if !key.is_empty() => inner.insert(key.trim(), value),
                None if !body.is_empty() => inner.insert(body.trim(), "true"),
                _ => debug!("忽略无效参数: {}", arg),
            }
        }
        if !inner.values.is_empty() {
            debug!("命令行参数: {:?}", inner.values);
        }
        Self { inner }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.inner = self.inner.with_priority(priority);
        self
    }
}

impl PropertySource for CommandLinePropertySource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn to_map(&self) -> HashMap<String, String> {
        self.inner.to_map()
    }
}

/// 文件配置源，支持 properties / TOML / YAML / JSON
///
/// 嵌套表扁平化为 `a.b`，数组扁平化为 `a[0]`。键保持原样，不做大小写转换。
#[derive(Debug, Clone)]
pub struct FilePropertySource {
    path: PathBuf,
    name: String,
    priority: i32,
    values: HashMap<String, String>,
}

impl FilePropertySource {
    /// 加载指定文件，格式由扩展名决定
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        debug!("加载配置文件: {}", path.display());

        let text = std::fs::read_to_string(&path).map_err(ConfigError::parse_error)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut values = HashMap::new();
        match extension.as_str() {
            "properties" => values = parse_properties(&text),
            "toml" => {
                let tree: Value = toml::from_str(&text).map_err(ConfigError::parse_error)?;
                flatten_into("", &tree, &mut values);
            }
            "yaml" | "yml" => {
                let tree: Value = serde_yaml::from_str(&text).map_err(ConfigError::parse_error)?;
                flatten_into("", &tree, &mut values);
            }
            "json" => {
                let tree: Value = serde_json::from_str(&text).map_err(ConfigError::parse_error)?;
                flatten_into("", &tree, &mut values);
            }
            other => {
                return Err(ConfigError::parse_error(format!(
                    "不支持的配置文件格式: {}",
                    other
                )))
            }
        }
        debug!("配置文件 {} 加载了 {} 个键", path.display(), values.len());

        Ok(Self {
            name: format!("file:{}", path.display()),
            path,
            priority: priority::DEFAULTS,
            values,
        })
    }

    /// 按文件名主干查找 `stem.{properties,toml,yaml,yml,json}`，都不存在时返回 `None`
    pub fn find<P: AsRef<Path>>(stem: P) -> ConfigResult<Option<Self>> {
        let stem = stem.as_ref();
        for extension in SUPPORTED_EXTENSIONS {
            let candidate = stem.with_extension(extension);
            if candidate.is_file() {
                return Self::load(candidate).map(Some);
            }
        }
        debug!("未找到配置文件: {}.*", stem.display());
        Ok(None)
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PropertySource for FilePropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn to_map(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}

/// 解析 `key=value` / `key: value` 格式，`#` 和 `!` 开头的行为注释，行尾 `\` 续行
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut pending = String::new();
    for line in text.lines() {
        let line = line.trim_start();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        if let Some(head) = line.strip_suffix('\\') {
            pending.push_str(head);
            continue;
        }
        pending.push_str(line);
        let entry = std::mem::take(&mut pending);
        match entry.find(['=', ':']) {
            Some(at) => {
                let key = entry[..at].trim();
                if !key.is_empty() {
                    values.insert(key.to_string(), entry[at + 1..].trim().to_string());
                }
            }
            None => {
                let key = entry.trim();
                if !key.is_empty() {
                    values.insert(key.to_string(), String::new());
                }
            }
        }
    }
    values
}

/// 将嵌套配置树扁平化
pub fn flatten_into(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&full_key, child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&format!("{}[{}]", prefix, index), child, out);
            }
        }
        Value::Null => {}
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// 环境变量配置源
///
/// `APP_SERVER_PORT`（前缀 `APP`，分隔符 `_`）映射为 `server.port`。
#[derive(Debug, Clone)]
pub struct EnvironmentVariablePropertySource {
    prefix: String,
    separator: String,
    priority: i32,
    raw_vars: Vec<(String, String)>,
    env_vars: HashMap<String, String>,
}

impl EnvironmentVariablePropertySource {
    /// 从当前进程环境变量加载
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// 从给定变量集合加载
    pub fn from_vars<I>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = prefix.into();
        let raw_vars = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .collect();
        let mut source = Self {
            prefix,
            separator: "_".to_string(),
            priority: priority::ENVIRONMENT_VARIABLES,
            raw_vars,
            env_vars: HashMap::new(),
        };
        source.load_env_vars();
        source
    }

    /// 设置分隔符并重新映射
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self.load_env_vars();
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn load_env_vars(&mut self) {
        debug!("加载环境变量，前缀: {}", self.prefix);
        self.env_vars = self
            .raw_vars
            .iter()
            .filter_map(|(key, value)| {
                self.env_key_to_config_key(key)
                    .map(|config_key| (config_key, value.clone()))
            })
            .collect();
        debug!("加载了 {} 个环境变量", self.env_vars.len());
    }

    /// 将环境变量键转换为配置键，前缀不匹配时返回 `None`
    fn env_key_to_config_key(&self, env_key: &str) -> Option<String> {
        let rest = env_key.strip_prefix(&self.prefix)?;
        let key = if self.prefix.is_empty() {
            rest
        } else {
            rest.strip_prefix(self.separator.as_str())?
        };
        if key.is_empty() {
            return None;
        }
        Some(key.replace(self.separator.as_str(), ".").to_lowercase())
    }
}

impl PropertySource for EnvironmentVariablePropertySource {
    fn name(&self) -> &str {
        "environmentVariables"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn get(&self, key: &str) -> Option<String> {
        self.env_vars.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.env_vars.keys().cloned().collect()
    }

    fn to_map(&self) -> HashMap<String, String> {
        self.env_vars.clone()
    }
}
