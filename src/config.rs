use crate::Result;
use crate::settings::Preferences;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 覆盖数据目录的环境变量
pub const DATA_DIR_ENV: &str = "REQLAB_DATA_DIR";

/// 未配置时使用的数据目录名
const DEFAULT_DATA_DIR: &str = ".reqlab";

/// 配置文件内容
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// 数据目录（历史、集合、设置）
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// 首次运行时的默认设置；已保存的设置优先
    #[serde(default)]
    pub defaults: Option<Preferences>,
}

impl Config {
    /// 数据目录
    /// 优先级：
    /// 1. 环境变量 REQLAB_DATA_DIR
    /// 2. 配置文件 data_dir
    /// 3. ~/.reqlab
    /// 4. 当前目录下的 .reqlab
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DATA_DIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn default_preferences(&self) -> Preferences {
        self.defaults.unwrap_or_default()
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "reqlab.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/reqlab/
    ///
    /// 找到但解析失败时返回错误；找不到时返回默认配置。
    pub fn find_and_load() -> Result<Config> {
        match Self::find() {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load_from_path(path)
            }
            None => Ok(Config::default()),
        }
    }

    fn find() -> Option<PathBuf> {
        Self::find_in_ancestors().or_else(Self::find_in_user_dir)
    }

    /// 当前目录及其父目录
    fn find_in_ancestors() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            // 尝试父目录
            if !current.pop() {
                break;
            }
        }

        None
    }

    /// 用户配置目录
    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("reqlab").join(Self::CONFIG_FILE);
        config_path.exists().then_some(config_path)
    }
}
