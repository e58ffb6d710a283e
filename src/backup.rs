use crate::{
    config::device,
    retention,
    secrets::Secrets,
    session::Session,
};
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};
use time::OffsetDateTime;

const REMOTE_BACKUP: &str = "temp_backup.backup";
const REMOTE_EXPORT: &str = "temp_export.rsc";

const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

/// Per-device result of one backup run, rendered into the summary report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded {
        device: device::Name,
    },
    Failed {
        device: device::Name,
        error: String,
    },
}

impl Outcome {
    pub fn marker(&self) -> String {
        match self {
            Outcome::Succeeded { device } => format!("*{}* ✅", device),
            Outcome::Failed { device, .. } => format!("*{}* ❌", device),
        }
    }
}

/// Runs the full backup sequence for one device and prunes its old runs
/// afterwards. Never fails past this boundary: every error becomes a failure
/// outcome so the remaining devices still get their turn.
pub fn run_device(backup_root: &Path, device: &device::Definition, secrets: &Secrets) -> Outcome {
    tracing::info!(device = %device.name, host = %device.host, "starting backup");
    match try_run_device(backup_root, device, secrets) {
        Ok(()) => {
            retention::prune(backup_root, &device.name, SystemTime::now());
            tracing::info!(device = %device.name, "backup finished successfully");
            Outcome::Succeeded {
                device: device.name.clone(),
            }
        }
        Err(report) => {
            let error = first_line(&report);
            tracing::error!(device = %device.name, %error, "backup failed");
            Outcome::Failed {
                device: device.name.clone(),
                error,
            }
        }
    }
}

pub fn run_folder_name(device: &device::Name, timestamp: OffsetDateTime) -> eyre::Result<String> {
    Ok(format!("{}_{}", device, timestamp.format(TIMESTAMP_FORMAT)?))
}

fn try_run_device(
    backup_root: &Path,
    device: &device::Definition,
    secrets: &Secrets,
) -> eyre::Result<()> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let run_name = run_folder_name(&device.name, now)?;
    let run_dir = create_run_dir(backup_root, device, &run_name)?;

    let password = secrets.get_secret(&device.password)?;
    let session = Session::connect(device, &password)?;
    tracing::debug!(device = %device.name, "session established");

    tracing::info!(device = %device.name, "generating binary backup");
    session.exec(
        &format!("/system backup save name={}", REMOTE_BACKUP),
        device.command_timeout,
    )?;
    tracing::info!(device = %device.name, "generating export script");
    session.exec(
        &format!("/export file={}", REMOTE_EXPORT),
        device.export_timeout,
    )?;

    tracing::info!(device = %device.name, "downloading artifacts");
    session.download(REMOTE_BACKUP, &run_dir.join(format!("{}.backup", run_name)))?;
    session.download(REMOTE_EXPORT, &run_dir.join(format!("{}.rsc", run_name)))?;

    tracing::debug!(device = %device.name, "removing remote temp files");
    session.exec(
        &format!("/file remove {}", REMOTE_BACKUP),
        device.command_timeout,
    )?;
    session.exec(
        &format!("/file remove {}", REMOTE_EXPORT),
        device.command_timeout,
    )?;

    session.disconnect()?;
    Ok(())
}

fn create_run_dir(
    backup_root: &Path,
    device: &device::Definition,
    run_name: &str,
) -> eyre::Result<PathBuf> {
    let run_dir = backup_root.join(&device.name.0).join(run_name);
    if !run_dir.exists() {
        std::fs::create_dir_all(&run_dir)?;
        tracing::debug!(path = %run_dir.display(), "created run folder");
    }
    Ok(run_dir)
}

fn first_line(report: &eyre::Report) -> String {
    report
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::Secret;
    use std::{net::TcpListener, time::Duration};
    use time::macros::datetime;

    fn unreachable_device(name: &str, port: u16) -> device::Definition {
        device::Definition {
            name: device::Name(name.to_owned()),
            host: "127.0.0.1".to_owned(),
            port,
            username: "backup".to_owned(),
            password: Secret::Inline("pwd".to_owned()),
            connect_timeout: Duration::from_secs(1),
            command_timeout: Duration::from_secs(1),
            export_timeout: Duration::from_secs(1),
        }
    }

    // Binds an ephemeral port and releases it again, so connecting to it
    // afterwards gets refused.
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn should_attempt_every_device_even_when_one_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let port = closed_port();
        let first = unreachable_device("r1", port);
        let second = unreachable_device("r2", port);

        let first_outcome = run_device(tmp.path(), &first, &Secrets);
        let second_outcome = run_device(tmp.path(), &second, &Secrets);

        assert!(matches!(first_outcome, Outcome::Failed { .. }));
        assert!(matches!(second_outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn should_leave_run_folder_behind_when_connection_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let device = unreachable_device("r1", closed_port());

        let outcome = run_device(tmp.path(), &device, &Secrets);

        assert!(matches!(outcome, Outcome::Failed { .. }));
        let runs: Vec<_> = std::fs::read_dir(tmp.path().join("r1"))
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].file_type().unwrap().is_dir());
    }

    #[test]
    fn should_render_success_marker() {
        let outcome = Outcome::Succeeded {
            device: device::Name("core-router".to_owned()),
        };

        assert_eq!(outcome.marker(), "*core-router* ✅");
    }

    #[test]
    fn should_render_failure_marker() {
        let outcome = Outcome::Failed {
            device: device::Name("core-router".to_owned()),
            error: "connection refused".to_owned(),
        };

        assert_eq!(outcome.marker(), "*core-router* ❌");
    }

    #[test]
    fn should_build_timestamped_run_folder_name() {
        let name = run_folder_name(
            &device::Name("r1".to_owned()),
            datetime!(2026-02-03 04:05:06 UTC),
        )
        .unwrap();

        assert_eq!(name, "r1_2026-02-03_04-05-06");
    }

    #[test]
    fn should_keep_only_first_line_of_error() {
        let report = eyre::eyre!("first line\nsecond line");

        assert_eq!(first_line(&report), "first line");
    }
}
