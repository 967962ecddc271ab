use log::{debug, info};
use std::net::Ipv4Addr;

use crate::config::{ConfigStore, Configuration};
use crate::journal::Journal;
use crate::probe::Verification;
use crate::{AddressSource, DnsUpdater, DomgenError, Verifier};

/// 一次 `--update` 正常结束时的结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// 地址与上次保存的一致，没有发起任何网络请求
    Unchanged(Ipv4Addr),
    /// 服务商已接受新地址并已保存；校验结果仅供参考
    Updated {
        address: Ipv4Addr,
        verification: Verification,
    },
}

/// 串起 读配置 → 取地址 → 比较 → 更新 → 校验 → 保存 的完整流程。
///
/// 每次调用都是独立的一轮，除了配置文件之外不保留任何状态。
pub struct Orchestrator<'a> {
    store: &'a ConfigStore,
    journal: &'a Journal,
    source: &'a dyn AddressSource,
    updater: &'a dyn DnsUpdater,
    verifier: &'a dyn Verifier,
    dns_suffix: &'a str,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a ConfigStore,
        journal: &'a Journal,
        source: &'a dyn AddressSource,
        updater: &'a dyn DnsUpdater,
        verifier: &'a dyn Verifier,
        dns_suffix: &'a str,
    ) -> Self {
        Orchestrator {
            store,
            journal,
            source,
            updater,
            verifier,
            dns_suffix,
        }
    }

    /// 读取配置，缺失或不完整时输出提示并返回错误
    pub fn ensure_configured(&self) -> Result<Configuration, DomgenError> {
        self.store.load().inspect_err(|e| match e {
            DomgenError::ConfigurationMissing(_) => self
                .journal
                .failure("No configuration found. Run with --config to configure."),
            DomgenError::ConfigurationInvalid(reason) => self
                .journal
                .failure(&format!("Invalid configuration: {reason}.")),
            other => self
                .journal
                .failure(&format!("Error reading the configuration file: {other}")),
        })
    }

    /// `--config`：探测当前地址并写入配置，不调用服务商接口
    pub fn configure(&self, token: &str, domain: &str) -> Result<Configuration, DomgenError> {
        if token.trim().is_empty() || domain.trim().is_empty() {
            self.journal
                .failure("Invalid configuration: token and domain must not be empty.");
            return Err(DomgenError::ConfigurationInvalid(
                "token and domain must not be empty".to_string(),
            ));
        }

        let Some(address) = self.source.current_address() else {
            self.journal
                .failure("Could not obtain the current address for configuration.");
            return Err(DomgenError::AddressNotFound);
        };

        let config = Configuration::new(token, domain, Some(address.to_string()));
        self.persist(&config)?;
        self.journal
            .success(&format!("Configuration saved: domain={domain}, ip_interno={address}"));
        Ok(config)
    }

    /// `--update`：地址变化时推送并保存，否则什么都不做
    pub fn run_update(&self) -> Result<RunOutcome, DomgenError> {
        let config = self.ensure_configured()?;

        let Some(address) = self.source.current_address() else {
            self.journal.notice("Current address not found, nothing to update.");
            return Err(DomgenError::AddressNotFound);
        };

        // 按字符串逐字节比较，与配置文件中保存的形式一致
        let current = address.to_string();
        if config.last_known_address.as_deref() == Some(current.as_str()) {
            self.journal.success(&format!(
                "The current address ({current}) matches the configured one. No update necessary."
            ));
            return Ok(RunOutcome::Unchanged(address));
        }

        info!(
            "address changed from {} to {current}",
            config.last_known_address.as_deref().unwrap_or("<none>")
        );
        self.journal.success("Address changed. Updating DuckDNS...");

        let result = self.updater.update(&config.domain, &config.token, &current);
        if let Some(err) = result.into_error() {
            // 不保存，下一轮定时任务会用同一个地址重试
            self.journal.failure(&format!("Update failed: {err}"));
            return Err(err);
        }
        self.journal.success(&format!(
            "Update succeeded: {}.{} now points to {current}",
            config.domain, self.dns_suffix
        ));

        // 校验只做提示，结果不影响保存
        let verification = self.verifier.verify(&config.domain, address);
        if let Some(e) = verification.clone().into_error(&config.domain) {
            debug!("verification did not pass: {e}");
        }

        self.persist(&config.with_address(current))?;
        Ok(RunOutcome::Updated {
            address,
            verification,
        })
    }

    fn persist(&self, config: &Configuration) -> Result<(), DomgenError> {
        self.store.save(config).inspect_err(|e| {
            self.journal
                .failure(&format!("Error saving the configuration: {e}"))
        })
    }
}
