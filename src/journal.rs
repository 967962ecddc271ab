use chrono::Local;
use log::{info, warn};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 追加写入的事件日志：`<时间戳> - <消息>`，不轮转也不回读。
///
/// 控制台输出也统一经过这里，前缀 `[+]` 成功、`[-]` 失败、`[*]` 提示；
/// 成功和失败两类会同步写入日志文件。
#[derive(Clone, Debug)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Journal { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn success(&self, message: &str) {
        let line = format!("[+] {message}");
        println!("{line}");
        info!("{message}");
        self.append(&line);
    }

    pub fn failure(&self, message: &str) {
        let line = format!("[-] {message}");
        println!("{line}");
        warn!("{message}");
        self.append(&line);
    }

    pub fn notice(&self, message: &str) {
        println!("[*] {message}");
        info!("{message}");
    }

    /// 写日志失败不影响本次运行
    pub fn append(&self, message: &str) {
        let entry = format!("{} - {}\n", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"), message);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));
        if let Err(e) = written {
            warn!("error write log file {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_appended_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("update.log"));
        journal.failure("first");
        journal.success("second");

        let text = std::fs::read_to_string(journal.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - [-] first"), "{}", lines[0]);
        assert!(lines[1].ends_with(" - [+] second"), "{}", lines[1]);
        // 2026-10-18 09:30:00.123456
        let stamp = lines[0].split(" - ").next().unwrap();
        assert_eq!(stamp.len(), 26);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[19..20], ".");
    }

    #[test]
    fn notices_stay_on_console() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("update.log"));
        journal.notice("just looking");
        assert!(!journal.path().exists());
    }

    #[test]
    fn unwritable_log_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("missing").join("update.log"));
        journal.failure("nowhere to go");
        assert!(!journal.path().exists());
    }
}
