#![cfg_attr(windows_subsystem, windows_subsystem = "windows")]

use anyhow::Error;
use clap::{ArgGroup, CommandFactory, Parser};
use log::{error, info};
use std::process::ExitCode;
use std::time::Duration;

use domgen_lib::scheduler;
use domgen_lib::{
    AppPaths, ConfigStore, DomgenError, DuckDnsClient, InstallStatus, InterfaceResolver, Journal,
    Orchestrator, PingProbe, RunOutcome, Settings,
};

const BANNER: &str = r"
  ____
 |  _ \  ___  _ __ ___   __ _  ___ _ __
 | | | |/ _ \| '_ ` _ \ / _` |/ _ \ '_ \
 | |_| | (_) | | | | | | (_| |  __/ | | |
 |____/ \___/|_| |_| |_|\__, |\___|_| |_|
                        |___/
";

/// 把本机 VPN / 内网网卡的地址同步到 DuckDNS
#[derive(Parser, Debug)]
#[command(version, about = "Updates DuckDNS with the address of the VPN adapter.")]
#[command(group(ArgGroup::new("mode").args(["config", "update", "cron"])))]
struct Cli {
    /// Configure the DuckDNS token and domain
    #[arg(long, num_args = 2, value_names = ["TOKEN", "DOMAIN"])]
    config: Option<Vec<String>>,

    /// Update DuckDNS with the current address
    #[arg(long)]
    update: bool,

    /// Register a job that runs --update every minute (cron or Task Scheduler)
    #[arg(long)]
    cron: bool,
}

impl Cli {
    /// 三种模式都没选时只打印用法
    fn wants_help(&self) -> bool {
        self.config.is_none() && !self.update && !self.cron
    }
}

fn main() -> Result<ExitCode, Error> {
    let cli = Cli::parse();
    println!("{BANNER}");
    if cli.wants_help() {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    let paths = AppPaths::from_current_exe()?;
    let log_dir = paths.log_dir().to_string_lossy().into_owned();
    log_x::init_log(&log_dir, "domgen.log")?;
    let settings = Settings::load(&paths.settings_file)?;
    info!("base dir = {}", paths.base_dir.display());

    let journal = Journal::new(&paths.log_file);
    let store = ConfigStore::new(&paths.config_file);
    let resolver = InterfaceResolver::new(&settings.interface_keywords, journal.clone());
    let client = DuckDnsClient::new(
        settings.provider_url.as_str(),
        Duration::from_secs(settings.http_timeout_secs),
    )?;
    let probe = PingProbe::new(settings.dns_suffix.as_str(), settings.ping_count, journal.clone());
    let orchestrator = Orchestrator::new(
        &store,
        &journal,
        &resolver,
        &client,
        &probe,
        &settings.dns_suffix,
    );

    let result = match (cli.config, cli.update, cli.cron) {
        (Some(args), _, _) => match args.as_slice() {
            [token, domain] => orchestrator.configure(token, domain).map(|_| {
                journal.success("Configuration completed successfully.");
            }),
            _ => Err(DomgenError::ConfigurationInvalid(
                "--config expects TOKEN and DOMAIN".to_string(),
            )),
        },
        (None, true, _) => orchestrator.run_update().map(|outcome| {
            if let RunOutcome::Updated { verification, .. } = outcome {
                info!("update finished, reachable = {}", verification.is_reachable());
            }
        }),
        (None, false, _) => install_schedule(&orchestrator, &journal, &paths, &settings),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("run failed: {e}");
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

/// `--cron`：配置有效时才注册定时任务
fn install_schedule(
    orchestrator: &Orchestrator,
    journal: &Journal,
    paths: &AppPaths,
    settings: &Settings,
) -> Result<(), DomgenError> {
    orchestrator.ensure_configured()?;
    let installer = scheduler::native(settings);
    match installer.install(&paths.executable) {
        Ok(InstallStatus::Installed) => {
            journal.success(&format!("{} configured to run every minute.", installer.name()));
            Ok(())
        }
        Ok(InstallStatus::AlreadyInstalled) => {
            journal.notice(&format!("{} already configured.", installer.name()));
            Ok(())
        }
        Ok(InstallStatus::Relaunched) => {
            journal.notice("Re-running with administrator privileges...");
            Ok(())
        }
        Err(e) => {
            journal.failure(&format!("Error configuring the {}: {e}", installer.name().to_lowercase()));
            Err(e)
        }
    }
}
