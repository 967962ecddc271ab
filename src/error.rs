use std::path::PathBuf;

use thiserror::Error;

/// 一次运行中可能出现的全部失败。全部在本地被记录并结束本次运行，不会让进程崩溃。
#[derive(Error, Debug)]
pub enum DomgenError {
    #[error("no configuration found at {}", .0.display())]
    ConfigurationMissing(PathBuf),

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("no VPN or private network adapter found")]
    AddressNotFound,

    #[error("could not reach the DDNS provider: {0}")]
    TransportFailure(String),

    #[error("the DDNS provider rejected the update: {0}")]
    ProviderRejected(String),

    #[error("could not resolve {domain}: {reason}")]
    ResolutionFailed { domain: String, reason: String },

    #[error("{domain} did not answer ICMP: {diagnostic}")]
    VerificationUnreachable { domain: String, diagnostic: String },

    #[error("could not register the scheduled job: {0}")]
    Scheduler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DomgenError {
    /// 进程退出码，脚本可以据此区分失败类型
    pub fn exit_code(&self) -> u8 {
        match self {
            DomgenError::ConfigurationMissing(_) | DomgenError::ConfigurationInvalid(_) => 2,
            DomgenError::AddressNotFound => 3,
            DomgenError::TransportFailure(_) => 4,
            DomgenError::ProviderRejected(_) => 5,
            DomgenError::Scheduler(_) => 6,
            // 校验失败只是提示信息，正常情况下不会作为错误返回
            DomgenError::ResolutionFailed { .. }
            | DomgenError::VerificationUnreachable { .. }
            | DomgenError::Io(_)
            | DomgenError::Json(_) => 1,
        }
    }

    /// 配置缺失或不完整，此时不会发起任何网络请求
    pub fn is_not_configured(&self) -> bool {
        matches!(
            self,
            DomgenError::ConfigurationMissing(_) | DomgenError::ConfigurationInvalid(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_failure_modes() {
        let codes = [
            DomgenError::ConfigurationMissing(PathBuf::from("x.json")).exit_code(),
            DomgenError::AddressNotFound.exit_code(),
            DomgenError::TransportFailure("timeout".into()).exit_code(),
            DomgenError::ProviderRejected("KO".into()).exit_code(),
            DomgenError::Scheduler("denied".into()).exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5, 6]);
        assert_eq!(
            DomgenError::ConfigurationInvalid("token".into()).exit_code(),
            2
        );
    }

    #[test]
    fn not_configured_covers_missing_and_invalid() {
        assert!(DomgenError::ConfigurationMissing(PathBuf::new()).is_not_configured());
        assert!(DomgenError::ConfigurationInvalid(String::new()).is_not_configured());
        assert!(!DomgenError::AddressNotFound.is_not_configured());
    }
}
