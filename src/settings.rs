use anyhow::{anyhow, Error};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "duckdns_config.json";
pub const LOG_FILE_NAME: &str = "duckdns_update.log";
pub const SETTINGS_FILE_NAME: &str = "domgen.toml";

const DEFAULT_PROVIDER_URL: &str = "https://www.duckdns.org/update";
const DEFAULT_DNS_SUFFIX: &str = "duckdns.org";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PING_COUNT: u32 = 2;
const DEFAULT_TASK_NAME: &str = "DuckDNSUpdaterTask";
// VPN 隧道以及常见有线/无线网卡名称片段
const DEFAULT_INTERFACE_KEYWORDS: [&str; 8] = [
    "tun", "vpn", "openvpn", "enp", "eth0", "wlp", "wlan0", "ethernet",
];

/// 程序用到的所有文件路径，进程启动时确定一次
#[derive(Clone, Debug)]
pub struct AppPaths {
    pub base_dir: PathBuf,
    pub executable: PathBuf,
    pub config_file: PathBuf,
    pub log_file: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// 以可执行文件所在目录为基准，计划任务启动时的工作目录不可靠
    pub fn from_current_exe() -> Result<Self, Error> {
        let executable = std::env::current_exe()?;
        let base_dir = executable
            .parent()
            .ok_or_else(|| anyhow!("executable has no parent directory: {}", executable.display()))?
            .to_path_buf();
        Ok(Self::new(base_dir, executable))
    }

    pub fn new(base_dir: PathBuf, executable: PathBuf) -> Self {
        AppPaths {
            config_file: base_dir.join(CONFIG_FILE_NAME),
            log_file: base_dir.join(LOG_FILE_NAME),
            settings_file: base_dir.join(SETTINGS_FILE_NAME),
            base_dir,
            executable,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join("log")
    }
}

/// domgen.toml 中的可选项，缺省时使用 DuckDNS 的默认值
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub provider_url: String,
    pub dns_suffix: String,
    pub http_timeout_secs: u64,
    pub ping_count: u32,
    pub interface_keywords: Vec<String>,
    pub task_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            dns_suffix: DEFAULT_DNS_SUFFIX.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            ping_count: DEFAULT_PING_COUNT,
            interface_keywords: DEFAULT_INTERFACE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            task_name: DEFAULT_TASK_NAME.to_string(),
        }
    }
}

impl Settings {
    /// 文件不存在时返回默认配置，格式错误则直接报错
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| anyhow!("error parse {}: {}", path.display(), e))
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        let settings: Settings = toml::from_str(text)?;
        if settings.interface_keywords.is_empty() {
            return Err(anyhow!("interface_keywords must not be empty"));
        }
        // ping -c 0 在部分 iputils 版本上永不退出；超时 0 会让每次请求立即失败
        if settings.ping_count == 0 {
            return Err(anyhow!("ping_count must be at least 1"));
        }
        if settings.http_timeout_secs == 0 {
            return Err(anyhow!("http_timeout_secs must be at least 1"));
        }
        Ok(settings)
    }
}
