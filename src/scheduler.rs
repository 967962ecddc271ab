use log::{debug, info};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::settings::Settings;
use crate::DomgenError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    AlreadyInstalled,
    /// 权限不足，已用管理员权限重新启动自身去完成注册
    Relaunched,
}

// 把可执行文件注册为每分钟执行一次 `--update` 的系统定时任务
pub trait SchedulerInstaller {
    fn name(&self) -> &'static str;
    fn install(&self, executable: &Path) -> Result<InstallStatus, DomgenError>;
}

/// 按编译目标选择系统自带的调度器
#[cfg(windows)]
pub fn native(settings: &Settings) -> Box<dyn SchedulerInstaller> {
    Box::new(TaskSchedulerInstaller::new(settings.task_name.clone()))
}

#[cfg(not(windows))]
pub fn native(_settings: &Settings) -> Box<dyn SchedulerInstaller> {
    Box::new(CronInstaller)
}

// ========== cron ==========

pub struct CronInstaller;

impl SchedulerInstaller for CronInstaller {
    fn name(&self) -> &'static str {
        "Cron job"
    }

    fn install(&self, executable: &Path) -> Result<InstallStatus, DomgenError> {
        let line = cron_line(executable);
        let existing = read_crontab();
        let Some(merged) = merge_crontab(&existing, &line) else {
            debug!("cron line already present: {line}");
            return Ok(InstallStatus::AlreadyInstalled);
        };

        let mut child = Command::new("crontab")
            .arg("-")
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DomgenError::Scheduler(format!("failed to run crontab: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(merged.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(DomgenError::Scheduler(format!(
                "crontab exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        info!("installed cron line: {line}");
        Ok(InstallStatus::Installed)
    }
}

// 没有 crontab 时 `crontab -l` 返回非零，当作空表处理
fn read_crontab() -> String {
    match Command::new("crontab").arg("-l").output() {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout).into_owned(),
        _ => String::new(),
    }
}

pub fn cron_line(executable: &Path) -> String {
    format!("* * * * * '{}' --update", executable.display())
}

/// 已存在同样的行时返回 None
pub fn merge_crontab(existing: &str, line: &str) -> Option<String> {
    if existing.lines().any(|l| l.trim() == line) {
        return None;
    }
    let mut merged = existing.to_string();
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    merged.push_str(line);
    merged.push('\n');
    Some(merged)
}

// ========== Windows 任务计划程序 ==========

pub struct TaskSchedulerInstaller {
    task_name: String,
}

impl TaskSchedulerInstaller {
    pub fn new(task_name: String) -> Self {
        TaskSchedulerInstaller { task_name }
    }

    // `net session` 只有管理员才能执行成功
    fn is_elevated() -> bool {
        Command::new("net")
            .arg("session")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn relaunch_elevated(executable: &Path) -> Result<(), DomgenError> {
        let status = Command::new("powershell")
            .args(elevation_args(executable))
            .status()
            .map_err(|e| DomgenError::Scheduler(format!("failed to request elevation: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(DomgenError::Scheduler(format!(
                "elevation request exited with {status}"
            )))
        }
    }
}

impl SchedulerInstaller for TaskSchedulerInstaller {
    fn name(&self) -> &'static str {
        "Scheduled task"
    }

    fn install(&self, executable: &Path) -> Result<InstallStatus, DomgenError> {
        if !Self::is_elevated() {
            Self::relaunch_elevated(executable)?;
            return Ok(InstallStatus::Relaunched);
        }
        let output = Command::new("schtasks")
            .args(schtasks_args(&self.task_name, executable))
            .output()
            .map_err(|e| DomgenError::Scheduler(format!("failed to run schtasks: {e}")))?;
        if !output.status.success() {
            return Err(DomgenError::Scheduler(format!(
                "schtasks exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        info!("registered scheduled task {}", self.task_name);
        Ok(InstallStatus::Installed)
    }
}

// /f 覆盖同名任务，所以重复注册也是幂等的
pub fn schtasks_args(task_name: &str, executable: &Path) -> Vec<String> {
    vec![
        "/create".to_string(),
        "/tn".to_string(),
        task_name.to_string(),
        "/tr".to_string(),
        format!("\"{}\" --update", executable.display()),
        "/sc".to_string(),
        "minute".to_string(),
        "/mo".to_string(),
        "1".to_string(),
        "/f".to_string(),
    ]
}

fn elevation_args(executable: &Path) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-Command".to_string(),
        format!(
            "Start-Process -FilePath '{}' -ArgumentList '--cron' -Verb RunAs",
            executable.display()
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cron_line_runs_update_every_minute() {
        let line = cron_line(&PathBuf::from("/opt/domgen/domgen"));
        assert_eq!(line, "* * * * * '/opt/domgen/domgen' --update");
    }

    #[test]
    fn merge_appends_to_existing_table() {
        let line = cron_line(&PathBuf::from("/opt/domgen/domgen"));
        let merged = merge_crontab("0 3 * * * /usr/bin/backup", &line).unwrap();
        assert_eq!(
            merged,
            "0 3 * * * /usr/bin/backup\n* * * * * '/opt/domgen/domgen' --update\n"
        );
        assert_eq!(merge_crontab("", &line).unwrap(), format!("{line}\n"));
    }

    #[test]
    fn merge_is_idempotent() {
        let line = cron_line(&PathBuf::from("/opt/domgen/domgen"));
        let once = merge_crontab("MAILTO=\"\"\n", &line).unwrap();
        assert_eq!(merge_crontab(&once, &line), None);
    }

    #[test]
    fn schtasks_registers_minutely_task() {
        let args = schtasks_args("DuckDNSUpdaterTask", &PathBuf::from("C:/Tools/domgen.exe"));
        assert_eq!(
            args,
            [
                "/create",
                "/tn",
                "DuckDNSUpdaterTask",
                "/tr",
                "\"C:/Tools/domgen.exe\" --update",
                "/sc",
                "minute",
                "/mo",
                "1",
                "/f"
            ]
        );
    }

    #[test]
    fn elevation_relaunches_cron_mode() {
        let args = elevation_args(&PathBuf::from("C:/Tools/domgen.exe"));
        assert!(args[2].contains("-ArgumentList '--cron'"));
        assert!(args[2].contains("-Verb RunAs"));
    }

    #[test]
    fn native_installer_matches_platform() {
        let installer = native(&Settings::default());
        #[cfg(windows)]
        assert_eq!(installer.name(), "Scheduled task");
        #[cfg(not(windows))]
        assert_eq!(installer.name(), "Cron job");
    }
}
