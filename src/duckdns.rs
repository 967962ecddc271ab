use log::{debug, info, warn};
use std::time::Duration;

use crate::{DnsUpdater, DomgenError, UpdateResult};

// DuckDNS 的更新接口返回纯文本，只有 "OK" 代表成功
const SUCCESS_BODY: &str = "OK";

// ========== DuckDNS Provider 实现 ==========

pub struct DuckDnsClient {
    update_url: String,
    client: reqwest::blocking::Client,
}

impl DuckDnsClient {
    pub fn new(update_url: impl Into<String>, timeout: Duration) -> Result<Self, DomgenError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomgenError::TransportFailure(describe(e)))?;
        Ok(Self::with_client(update_url, client))
    }

    pub fn with_client(update_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        DuckDnsClient {
            update_url: update_url.into(),
            client,
        }
    }

    fn send(&self, domain: &str, token: &str, address: &str) -> Result<String, reqwest::Error> {
        let params = [("domains", domain), ("token", token), ("ip", address)];
        self.client
            .get(&self.update_url)
            .query(&params)
            .send()?
            .text()
    }
}

impl DnsUpdater for DuckDnsClient {
    /// 发起一次更新请求，不重试；重试交给下一次定时任务
    fn update(&self, domain: &str, token: &str, address: &str) -> UpdateResult {
        debug!("updating {domain} to {address}");
        match self.send(domain, token, address) {
            Ok(body) => {
                let result = interpret_body(&body, address);
                if result.success {
                    info!("provider accepted {address} for {domain}");
                } else {
                    warn!("provider rejected update for {domain}: {body}");
                }
                result
            }
            Err(e) => {
                let message = describe(e);
                warn!("error request provider for {domain}: {message}");
                UpdateResult::transport(message)
            }
        }
    }
}

// 错误信息里带着完整 URL（含 token），必须去掉；
// reqwest 自己的 Display 不含底层原因（超时、连接被拒、DNS 失败），逐级拼上 source
fn describe(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::from(e.without_url()))
}

/// 响应体与 "OK" 逐字节比较，不做 trim 或大小写处理
pub fn interpret_body(body: &str, address: &str) -> UpdateResult {
    if body == SUCCESS_BODY {
        UpdateResult::accepted(address, body)
    } else {
        UpdateResult::rejected(body)
    }
}
