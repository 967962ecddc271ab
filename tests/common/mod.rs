//! Test doubles shared by the pipeline tests.

#![allow(dead_code)]

use domgen_lib::{
    AddressSource, ConfigStore, Configuration, DnsUpdater, Journal, UpdateResult, Verification,
    Verifier,
};
use std::cell::RefCell;
use std::net::Ipv4Addr;
use std::path::Path;
use tempfile::TempDir;

/// Always reports the same address (or none)
pub struct FixedSource(pub Option<Ipv4Addr>);

impl AddressSource for FixedSource {
    fn current_address(&self) -> Option<Ipv4Addr> {
        self.0
    }
}

/// Answers every update with a canned provider body or transport error
pub struct ScriptedProvider {
    reply: Result<&'static str, &'static str>,
    calls: RefCell<Vec<(String, String, String)>>,
}

impl ScriptedProvider {
    pub fn answering(body: &'static str) -> Self {
        ScriptedProvider {
            reply: Ok(body),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn unreachable(message: &'static str) -> Self {
        ScriptedProvider {
            reply: Err(message),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.borrow().clone()
    }
}

impl DnsUpdater for ScriptedProvider {
    fn update(&self, domain: &str, token: &str, address: &str) -> UpdateResult {
        self.calls
            .borrow_mut()
            .push((domain.to_string(), token.to_string(), address.to_string()));
        match self.reply {
            Ok(body) => domgen_lib::duckdns::interpret_body(body, address),
            Err(message) => UpdateResult::transport(message.to_string()),
        }
    }
}

/// Records which domains were verified and returns a fixed outcome
pub struct RecordingVerifier {
    outcome: Verification,
    domains: RefCell<Vec<String>>,
}

impl RecordingVerifier {
    pub fn returning(outcome: Verification) -> Self {
        RecordingVerifier {
            outcome,
            domains: RefCell::new(Vec::new()),
        }
    }

    pub fn verified(&self) -> Vec<String> {
        self.domains.borrow().clone()
    }
}

impl Verifier for RecordingVerifier {
    fn verify(&self, domain: &str, _published: Ipv4Addr) -> Verification {
        self.domains.borrow_mut().push(domain.to_string());
        self.outcome.clone()
    }
}

/// Scratch install directory with a config store and a journal
pub struct Install {
    pub dir: TempDir,
    pub store: ConfigStore,
    pub journal: Journal,
}

impl Install {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("duckdns_config.json"));
        let journal = Journal::new(dir.path().join("duckdns_update.log"));
        Install { dir, store, journal }
    }

    pub fn configured(token: &str, domain: &str, address: Option<&str>) -> Self {
        let install = Self::empty();
        install
            .store
            .save(&Configuration::new(token, domain, address.map(str::to_string)))
            .expect("save config");
        install
    }

    pub fn config_bytes(&self) -> Vec<u8> {
        std::fs::read(self.store.path()).expect("read config")
    }

    pub fn log(&self) -> String {
        read_or_empty(self.journal.path())
    }
}

pub fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().expect("valid ipv4")
}

pub fn reachable(s: &str) -> Verification {
    Verification::Reachable { address: ip(s) }
}
