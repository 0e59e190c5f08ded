//! 配置管理器
//!
//! 按 `.env` 文件 → 配置文件 → 环境变量 的顺序合成配置，后者覆盖前者

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};

use super::{constants, TranslatorConfig};
use crate::translation::error::{TranslationError, TranslationResult};

/// 配置管理器
pub struct ConfigManager {
    config: TranslatorConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 加载配置
    ///
    /// `explicit` 指定时必须存在；否则按 [`constants::CONFIG_PATHS`] 查找第一个存在的文件，
    /// 都不存在时只使用默认值和环境变量。
    pub fn load(explicit: Option<&Path>) -> TranslationResult<Self> {
        Self::load_dotenv();

        let source = match explicit {
            Some(path) if !path.exists() => {
                return Err(TranslationError::ConfigError(format!(
                    "配置文件不存在: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        let config = Self::build(source.as_deref())?;
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslatorConfig {
        self.config
    }

    /// 实际加载的配置文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn build(path: Option<&Path>) -> TranslationResult<TranslatorConfig> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            tracing::info!("加载配置文件: {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            tracing::debug!("未找到配置文件，使用默认配置");
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(constants::ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("keywords"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件内容
    pub fn example_config() -> TranslationResult<String> {
        let config = TranslatorConfig {
            cache_path: Some(constants::DEFAULT_CACHE_PATH.to_string()),
            ..TranslatorConfig::default()
        };
        toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))
    }
}
