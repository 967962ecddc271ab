use log::debug;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::process::Command;

use crate::journal::Journal;
use crate::{DomgenError, Verifier};

/// 更新后的校验结果，只用于提示，不影响已保存的状态
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    Reachable { address: Ipv4Addr },
    Unreachable { address: Ipv4Addr, diagnostic: String },
    ResolutionFailed(String),
}

impl Verification {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Verification::Reachable { .. })
    }

    pub fn into_error(self, domain: &str) -> Option<DomgenError> {
        match self {
            Verification::Reachable { .. } => None,
            Verification::Unreachable { diagnostic, .. } => Some(DomgenError::VerificationUnreachable {
                domain: domain.to_string(),
                diagnostic,
            }),
            Verification::ResolutionFailed(reason) => Some(DomgenError::ResolutionFailed {
                domain: domain.to_string(),
                reason,
            }),
        }
    }
}

/// 系统 DNS 解析 + 调用平台自带的 ping
pub struct PingProbe {
    suffix: String,
    count: u32,
    journal: Journal,
}

impl PingProbe {
    pub fn new(suffix: impl Into<String>, count: u32, journal: Journal) -> Self {
        PingProbe {
            suffix: suffix.into(),
            count,
            journal,
        }
    }

    pub fn fqdn(&self, domain: &str) -> String {
        format!("{}.{}", domain, self.suffix)
    }

    fn ping(&self, address: Ipv4Addr) -> Result<(), String> {
        let output = Command::new("ping")
            .args(ping_args(self.count, address))
            .output()
            .map_err(|e| format!("failed to run ping: {e}"))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            Err(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(stderr)
        }
    }
}

impl Verifier for PingProbe {
    fn verify(&self, domain: &str, published: Ipv4Addr) -> Verification {
        let fqdn = self.fqdn(domain);
        let address = match resolve_ipv4(&fqdn) {
            Ok(address) => address,
            Err(reason) => {
                self.journal
                    .failure(&format!("Error querying DNS for {fqdn}: {reason}"));
                return Verification::ResolutionFailed(reason);
            }
        };
        debug!("{fqdn} resolves to {address}");

        if address == published {
            self.journal
                .notice(&format!("DNS is correctly set to {published}."));
        } else {
            // 解析器缓存可能还没刷新
            self.journal.notice(&format!(
                "DNS points to {address}, but the current address is {published}."
            ));
        }

        match self.ping(address) {
            Ok(()) => {
                self.journal
                    .success(&format!("ICMP connection to {fqdn} succeeded."));
                Verification::Reachable { address }
            }
            Err(diagnostic) => {
                self.journal
                    .failure(&format!("ICMP connection to {fqdn} failed: {diagnostic}"));
                Verification::Unreachable { address, diagnostic }
            }
        }
    }
}

/// 用系统解析器查询第一个 IPv4 地址
pub fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, String> {
    let addrs = (host, 0).to_socket_addrs().map_err(|e| e.to_string())?;
    addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| format!("no IPv4 address for {host}"))
}

#[cfg(windows)]
fn ping_args(count: u32, address: Ipv4Addr) -> Vec<String> {
    vec!["-n".to_string(), count.to_string(), address.to_string()]
}

#[cfg(not(windows))]
fn ping_args(count: u32, address: Ipv4Addr) -> Vec<String> {
    vec!["-c".to_string(), count.to_string(), address.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqdn_appends_provider_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let probe = PingProbe::new("duckdns.org", 2, Journal::new(dir.path().join("log")));
        assert_eq!(probe.fqdn("myhost"), "myhost.duckdns.org");
    }

    #[test]
    fn ping_uses_platform_count_flag() {
        let args = ping_args(2, Ipv4Addr::new(10, 8, 0, 6));
        #[cfg(windows)]
        assert_eq!(args, ["-n", "2", "10.8.0.6"]);
        #[cfg(not(windows))]
        assert_eq!(args, ["-c", "2", "10.8.0.6"]);
    }

    #[test]
    fn literal_address_resolves_without_dns() {
        assert_eq!(resolve_ipv4("127.0.0.1").unwrap(), Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn unresolvable_name_is_resolution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("update.log"));
        // .invalid 保证无法解析
        let probe = PingProbe::new("invalid", 2, journal.clone());
        let outcome = probe.verify("domgen-test", Ipv4Addr::new(10, 8, 0, 6));
        assert!(matches!(outcome, Verification::ResolutionFailed(_)));
        assert!(!outcome.is_reachable());

        let error = outcome.into_error("domgen-test").unwrap();
        assert!(matches!(error, DomgenError::ResolutionFailed { .. }));
        let log = std::fs::read_to_string(journal.path()).unwrap();
        assert!(log.contains("Error querying DNS for domgen-test.invalid"));
    }
}
