use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::DomgenError;

/// 持久化的安装配置，每个安装只有一份
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    pub token: String,
    pub domain: String,
    pub last_known_address: Option<String>,
}

// token 只允许出现在配置文件里
impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("token", &"<redacted>")
            .field("domain", &self.domain)
            .field("last_known_address", &self.last_known_address)
            .finish()
    }
}

impl Configuration {
    pub fn new(token: impl Into<String>, domain: impl Into<String>, address: Option<String>) -> Self {
        Configuration {
            token: token.into(),
            domain: domain.into(),
            last_known_address: address,
        }
    }

    pub fn with_address(&self, address: impl Into<String>) -> Self {
        Configuration {
            last_known_address: Some(address.into()),
            ..self.clone()
        }
    }
}

// 磁盘上的 JSON 格式，字段名与旧版本保持兼容
#[derive(Serialize, Deserialize, Default)]
struct StoredConfig {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    ip_interno: Option<String>,
}

impl StoredConfig {
    fn validate(self) -> Result<Configuration, DomgenError> {
        let token = self.token.filter(|t| !t.trim().is_empty());
        let domain = self.domain.filter(|d| !d.trim().is_empty());
        match (token, domain) {
            (Some(token), Some(domain)) => Ok(Configuration {
                token,
                domain,
                last_known_address: self.ip_interno,
            }),
            (None, _) => Err(DomgenError::ConfigurationInvalid(
                "token is missing or empty".to_string(),
            )),
            (_, None) => Err(DomgenError::ConfigurationInvalid(
                "domain is missing or empty".to_string(),
            )),
        }
    }
}

impl From<&Configuration> for StoredConfig {
    fn from(config: &Configuration) -> Self {
        StoredConfig {
            token: Some(config.token.clone()),
            domain: Some(config.domain.clone()),
            ip_interno: config.last_known_address.clone(),
        }
    }
}

/// JSON 文件形式的配置存储
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取并校验配置，token 和 domain 缺一不可
    pub fn load(&self) -> Result<Configuration, DomgenError> {
        if !self.path.exists() {
            return Err(DomgenError::ConfigurationMissing(self.path.clone()));
        }
        let text = fs::read_to_string(&self.path)?;
        let stored: StoredConfig = serde_json::from_str(&text).map_err(|e| {
            DomgenError::ConfigurationInvalid(format!("error parse {}: {}", self.path.display(), e))
        })?;
        stored.validate()
    }

    /// 整个文件重写：先写临时文件再 rename，避免写到一半留下损坏的配置
    pub fn save(&self, config: &Configuration) -> Result<(), DomgenError> {
        let json = serde_json::to_string(&StoredConfig::from(config))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
