use std::net::Ipv4Addr;

// 子模块声明
pub mod config;
pub mod duckdns;
pub mod error;
pub mod journal;
pub mod orchestrator;
pub mod probe;
pub mod resolver;
pub mod scheduler;
pub mod settings;

// 重新导出常用类型
pub use config::{ConfigStore, Configuration};
pub use duckdns::DuckDnsClient;
pub use error::DomgenError;
pub use journal::Journal;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use probe::{PingProbe, Verification};
pub use resolver::InterfaceResolver;
pub use scheduler::{InstallStatus, SchedulerInstaller};
pub use settings::{AppPaths, Settings};

/// 一次更新请求的结果，用完即丢，不会持久化
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateResult {
    pub success: bool,
    pub reported_address: Option<String>,
    pub provider_message: String,
    /// 网络层失败（超时、连接被拒等），与服务商拒绝区分开
    pub transport_failure: bool,
}

impl UpdateResult {
    pub fn accepted(address: &str, body: &str) -> Self {
        UpdateResult {
            success: true,
            reported_address: Some(address.to_string()),
            provider_message: body.to_string(),
            transport_failure: false,
        }
    }

    pub fn rejected(body: &str) -> Self {
        UpdateResult {
            success: false,
            reported_address: None,
            provider_message: body.to_string(),
            transport_failure: false,
        }
    }

    pub fn transport(message: String) -> Self {
        UpdateResult {
            success: false,
            reported_address: None,
            provider_message: message,
            transport_failure: true,
        }
    }

    pub fn into_error(self) -> Option<DomgenError> {
        match (self.success, self.transport_failure) {
            (true, _) => None,
            (false, true) => Some(DomgenError::TransportFailure(self.provider_message)),
            (false, false) => Some(DomgenError::ProviderRejected(self.provider_message)),
        }
    }
}

// 获取本机当前要发布的地址；找不到时返回 None，由实现自己输出诊断信息
pub trait AddressSource {
    fn current_address(&self) -> Option<Ipv4Addr>;
}

// DDNS 服务商 - 把地址推送到远端
pub trait DnsUpdater {
    fn update(&self, domain: &str, token: &str, address: &str) -> UpdateResult;
}

// 更新后的 DNS 解析与连通性检查
pub trait Verifier {
    fn verify(&self, domain: &str, published: Ipv4Addr) -> Verification;
}
