use log::debug;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use std::net::Ipv4Addr;

use crate::journal::Journal;
use crate::AddressSource;

/// 网卡名 + 绑定的 IPv4 地址，每次探测时临时生成
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub interface_name: String,
    pub address: Ipv4Addr,
}

/// 从本机网卡中挑选要发布的地址：私有网段 + VPN/物理网卡名称
pub struct InterfaceResolver {
    keywords: Vec<String>,
    journal: Journal,
}

impl InterfaceResolver {
    pub fn new(keywords: &[String], journal: Journal) -> Self {
        InterfaceResolver {
            keywords: keywords.to_vec(),
            journal,
        }
    }
}

impl AddressSource for InterfaceResolver {
    fn current_address(&self) -> Option<Ipv4Addr> {
        let interfaces = datalink::interfaces();
        debug!("found {} network interfaces", interfaces.len());
        match select_address(&interfaces, &self.keywords) {
            Some(found) => {
                debug!("selected {} on {}", found.address, found.interface_name);
                Some(found.address)
            }
            None => {
                self.journal.failure(not_found_message(interfaces.len()));
                None
            }
        }
    }
}

// 一块网卡都没枚举到时多半是 Windows 上缺少 Npcap 驱动
fn not_found_message(interface_count: usize) -> &'static str {
    if interface_count == 0 {
        "No network interfaces could be enumerated. On Windows, install Npcap (https://npcap.com)."
    } else {
        "No VPN or private network adapter found."
    }
}

/// 按枚举顺序返回第一个合格的地址，多个候选时结果取决于平台的枚举顺序
pub fn select_address(interfaces: &[NetworkInterface], keywords: &[String]) -> Option<InterfaceAddress> {
    interfaces
        .iter()
        .filter(|iface| is_recognized_adapter(iface, keywords))
        .find_map(|iface| {
            iface.ips.iter().find_map(|net| match net {
                IpNetwork::V4(v4) if v4.ip().is_private() => Some(InterfaceAddress {
                    interface_name: iface.name.clone(),
                    address: v4.ip(),
                }),
                _ => None,
            })
        })
}

// Windows 上 name 是设备 GUID，可读的名字在 description 里
fn is_recognized_adapter(iface: &NetworkInterface, keywords: &[String]) -> bool {
    let name = iface.name.to_lowercase();
    let description = iface.description.to_lowercase();
    keywords
        .iter()
        .map(|k| k.to_lowercase())
        .any(|k| name.contains(&k) || description.contains(&k))
}
