//! Installing an APK on connected devices.
//!
//! Each target goes through `Pending -> Running -> Succeeded | Failed`. There are no
//! retries; a failed device stays failed until the user reruns the command.
//!
//! Three strategies are available:
//!
//! - [`install_single`]: one explicitly chosen device, output streamed live.
//! - [`install_sequential`]: every device in turn, output streamed live, stopping at
//!   the first failure.
//! - [`install_parallel`]: every device at once with captured output. Failures are
//!   recorded per device and never stop the others.

use std::{fmt, path::Path};

use futures_util::future::join_all;
use serde::Serialize;
use tracing::debug;

use super::adb::{Adb, DeviceHandle};
use crate::{error::FltError, process::ProcessRunner};

/// Which devices an install should reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallTargets {
    /// A device the user asked for by id.
    Single(String),
    /// Every online device, in `adb devices` order.
    All(Vec<String>),
}

/// Decide the install targets from the live device list.
///
/// # Errors
/// - [`FltError::NoDevicesConnected`] if no device is online.
/// - [`FltError::DeviceNotConnected`] if `requested` is not among the online devices.
pub fn select_targets(
    online: &[DeviceHandle],
    requested: Option<&str>,
) -> Result<InstallTargets, FltError> {
    if online.is_empty() {
        return Err(FltError::NoDevicesConnected);
    }

    let ids: Vec<String> = online.iter().map(|device| device.id.clone()).collect();

    match requested {
        Some(device) if ids.iter().any(|id| id == device) => {
            Ok(InstallTargets::Single(device.to_string()))
        }
        Some(device) => Err(FltError::DeviceNotConnected {
            device: device.to_string(),
            available: ids,
        }),
        None => Ok(InstallTargets::All(ids)),
    }
}

/// Position of a device within a multi-device install, rendered as `[i/N] id:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLabel<'a> {
    /// One-based position in the target list.
    pub index: usize,
    pub total: usize,
    pub device: &'a str,
}

impl fmt::Display for DeviceLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}:", self.index, self.total, self.device)
    }
}

/// Result of installing on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    /// One-based position in the target list.
    pub index: usize,
    pub device: String,
    /// Captured tool output with progress chatter removed.
    pub output: Vec<String>,
    /// Why the install failed; `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstallOutcome {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Overall shape of a multi-device install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallVerdict {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// Outcomes of an install, in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallSummary {
    pub outcomes: Vec<InstallOutcome>,
}

impl InstallSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    #[must_use]
    pub fn verdict(&self) -> InstallVerdict {
        match (self.succeeded(), self.failed()) {
            (_, 0) => InstallVerdict::AllSucceeded,
            (0, _) => InstallVerdict::AllFailed,
            _ => InstallVerdict::Partial,
        }
    }

    /// One-line result shown once every device has finished.
    #[must_use]
    pub fn message(&self) -> String {
        match self.verdict() {
            InstallVerdict::AllSucceeded => "Installed on all devices".to_string(),
            InstallVerdict::Partial => format!(
                "{} device(s) installed, {} device(s) failed",
                self.succeeded(),
                self.failed()
            ),
            InstallVerdict::AllFailed => {
                format!("installation failed on all {} device(s)", self.failed())
            }
        }
    }
}

/// Receives progress from [`install_parallel`].
///
/// Calls for different devices may interleave in any order; the label identifies
/// the device.
pub trait InstallObserver: Send + Sync {
    fn started(&self, label: DeviceLabel<'_>);
    fn finished(&self, label: DeviceLabel<'_>, outcome: &InstallOutcome);
}

/// Drop lines that carry no information: blanks and `Performing Streamed Install`.
#[must_use]
pub fn filter_install_output(stdout: &str, stderr: &str) -> Vec<String> {
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.contains("Performing"))
        .map(ToString::to_string)
        .collect()
}

/// Install on one device with the tool's output shown live.
///
/// # Errors
/// Returns [`FltError::InstallFailed`] if `adb install` fails.
pub async fn install_single<R: ProcessRunner>(
    adb: &Adb<R>,
    device: &str,
    apk: &Path,
) -> Result<(), FltError> {
    adb.install_interactive(device, apk)
        .await
        .map_err(|source| FltError::InstallFailed {
            device: device.to_string(),
            source,
        })
}

/// Install on each device in turn with output shown live.
///
/// `before_each` runs ahead of every device, e.g. to print a header.
///
/// # Errors
/// Stops at the first device that fails and returns [`FltError::InstallFailed`].
pub async fn install_sequential<R, F>(
    adb: &Adb<R>,
    devices: &[String],
    apk: &Path,
    mut before_each: F,
) -> Result<(), FltError>
where
    R: ProcessRunner,
    F: FnMut(DeviceLabel<'_>),
{
    let total = devices.len();
    for (offset, device) in devices.iter().enumerate() {
        before_each(DeviceLabel {
            index: offset + 1,
            total,
            device,
        });
        install_single(adb, device, apk).await?;
    }
    Ok(())
}

/// Install on every device concurrently.
///
/// All installs run to completion; the summary lists one outcome per device in the
/// order of `devices`, regardless of which finished first.
pub async fn install_parallel<R, O>(
    adb: &Adb<R>,
    devices: &[String],
    apk: &Path,
    observer: &O,
) -> InstallSummary
where
    R: ProcessRunner,
    O: InstallObserver + ?Sized,
{
    let total = devices.len();
    let units = devices.iter().enumerate().map(|(offset, device)| async move {
        let label = DeviceLabel {
            index: offset + 1,
            total,
            device,
        };
        observer.started(label);

        let outcome = match adb.install_captured(device, apk).await {
            Ok(output) => InstallOutcome {
                index: label.index,
                device: device.clone(),
                output: filter_install_output(&output.stdout, &output.stderr),
                error: None,
            },
            Err(err) => {
                debug!("install on {device} failed: {err}");
                InstallOutcome {
                    index: label.index,
                    device: device.clone(),
                    output: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };

        observer.finished(label, &outcome);
        outcome
    });

    InstallSummary {
        outcomes: join_all(units).await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        android::adb::DeviceStatus,
        process::fake::{self, FakeRunner},
    };

    const THREE_DEVICES: &str = "List of devices attached\n\
        emulator-5554\tdevice\n\
        emulator-5556\tdevice\n\
        R58M1234ABC\tdevice\n";

    fn handle(id: &str, status: DeviceStatus) -> DeviceHandle {
        DeviceHandle {
            id: id.to_string(),
            status,
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl InstallObserver for Recorder {
        fn started(&self, label: DeviceLabel<'_>) {
            self.events.lock().unwrap().push(format!("start {label}"));
        }

        fn finished(&self, label: DeviceLabel<'_>, outcome: &InstallOutcome) {
            let state = if outcome.succeeded() { "ok" } else { "failed" };
            self.events
                .lock()
                .unwrap()
                .push(format!("{state} {label}"));
        }
    }

    fn scripted_runner(failing: &'static str) -> FakeRunner {
        FakeRunner::new(move |invocation| {
            let command = invocation.to_string();
            if command == "adb devices" {
                fake::ok(THREE_DEVICES)
            } else if command.contains(failing) {
                fake::failed(invocation, "adb: failed to install: INSTALL_FAILED_INSUFFICIENT_STORAGE")
            } else if command.contains("install") {
                fake::ok("Performing Streamed Install\nSuccess\n")
            } else {
                fake::ok("Android Debug Bridge version 1.0.41\n")
            }
        })
    }

    #[test]
    fn no_online_devices_is_an_error() {
        let err = select_targets(&[], None).unwrap_err();
        assert!(matches!(err, FltError::NoDevicesConnected));
    }

    #[test]
    fn selects_all_online_devices_in_order() {
        let online = [
            handle("b", DeviceStatus::Device),
            handle("a", DeviceStatus::Device),
        ];
        assert_eq!(
            select_targets(&online, None).unwrap(),
            InstallTargets::All(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn selects_requested_device() {
        let online = [
            handle("a", DeviceStatus::Device),
            handle("b", DeviceStatus::Device),
        ];
        assert_eq!(
            select_targets(&online, Some("b")).unwrap(),
            InstallTargets::Single("b".to_string())
        );
    }

    #[test]
    fn unknown_requested_device_lists_available() {
        let online = [handle("a", DeviceStatus::Device)];
        let err = select_targets(&online, Some("ghost")).unwrap_err();
        match err {
            FltError::DeviceNotConnected { device, available } => {
                assert_eq!(device, "ghost");
                assert_eq!(available, ["a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_device_aborts_before_any_install() {
        let runner = scripted_runner("never");
        let adb = Adb::connect(&runner, "adb").await.unwrap();
        let online = adb.online_devices().await.unwrap();

        assert!(select_targets(&online, Some("ghost")).is_err());
        assert!(runner.commands().iter().all(|c| !c.contains("install")));
    }

    #[test]
    fn filters_progress_and_blank_lines() {
        let lines = filter_install_output(
            "Performing Streamed Install\n\nSuccess\r\n",
            "  \nadb: warning: something\n",
        );
        assert_eq!(lines, ["Success", "adb: warning: something"]);
    }

    #[test]
    fn label_format() {
        let label = DeviceLabel {
            index: 2,
            total: 3,
            device: "emulator-5556",
        };
        assert_eq!(label.to_string(), "[2/3] emulator-5556:");
    }

    #[tokio::test]
    async fn partial_failure_does_not_stop_siblings() {
        let runner = scripted_runner("emulator-5556");
        let adb = Adb::connect(&runner, "adb").await.unwrap();
        let online = adb.online_devices().await.unwrap();
        let InstallTargets::All(devices) = select_targets(&online, None).unwrap() else {
            panic!("expected all devices");
        };

        let recorder = Recorder::default();
        let summary =
            install_parallel(&adb, &devices, Path::new("/tmp/app-debug.apk"), &recorder).await;

        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.verdict(), InstallVerdict::Partial);
        assert_eq!(summary.message(), "2 device(s) installed, 1 device(s) failed");

        let devices: Vec<_> = summary.outcomes.iter().map(|o| o.device.as_str()).collect();
        assert_eq!(devices, ["emulator-5554", "emulator-5556", "R58M1234ABC"]);
        assert_eq!(
            summary.outcomes.iter().map(|o| o.index).collect::<Vec<_>>(),
            [1, 2, 3]
        );

        let failed = &summary.outcomes[1];
        assert!(!failed.succeeded());
        assert!(
            failed
                .error
                .as_deref()
                .unwrap()
                .contains("INSTALL_FAILED_INSUFFICIENT_STORAGE")
        );
        assert_eq!(summary.outcomes[0].output, ["Success"]);

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 6);
        assert!(events.contains(&"failed [2/3] emulator-5556:".to_string()));
        assert!(events.contains(&"ok [3/3] R58M1234ABC:".to_string()));
    }

    #[tokio::test]
    async fn every_device_failing_is_all_failed() {
        let runner = scripted_runner("install");
        let adb = Adb::connect(&runner, "adb").await.unwrap();
        let devices = vec!["a".to_string(), "b".to_string()];
        let summary =
            install_parallel(&adb, &devices, Path::new("app.apk"), &Recorder::default()).await;
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.verdict(), InstallVerdict::AllFailed);
        assert_eq!(summary.message(), "installation failed on all 2 device(s)");
    }

    #[tokio::test]
    async fn all_succeeding_is_all_succeeded() {
        let runner = scripted_runner("never");
        let adb = Adb::connect(&runner, "adb").await.unwrap();
        let devices = vec!["a".to_string(), "b".to_string()];
        let summary =
            install_parallel(&adb, &devices, Path::new("app.apk"), &Recorder::default()).await;
        assert_eq!(summary.verdict(), InstallVerdict::AllSucceeded);
        assert_eq!(summary.message(), "Installed on all devices");
        assert_eq!(runner.interactive_commands().len(), 0);
    }

    #[tokio::test]
    async fn single_install_streams_output_and_fails_fatally() {
        let runner = scripted_runner("R58M1234ABC");
        let adb = Adb::connect(&runner, "adb").await.unwrap();

        install_single(&adb, "emulator-5554", Path::new("app.apk"))
            .await
            .unwrap();
        let err = install_single(&adb, "R58M1234ABC", Path::new("app.apk"))
            .await
            .unwrap_err();

        assert!(matches!(err, FltError::InstallFailed { ref device, .. } if device == "R58M1234ABC"));
        assert_eq!(runner.interactive_commands().len(), 2);
    }

    #[tokio::test]
    async fn sequential_install_stops_at_first_failure() {
        let runner = scripted_runner("emulator-5556");
        let adb = Adb::connect(&runner, "adb").await.unwrap();
        let devices = vec![
            "emulator-5554".to_string(),
            "emulator-5556".to_string(),
            "R58M1234ABC".to_string(),
        ];

        let mut labels = Vec::new();
        let err = install_sequential(&adb, &devices, Path::new("app.apk"), |label| {
            labels.push(label.to_string());
        })
        .await
        .unwrap_err();

        assert!(matches!(err, FltError::InstallFailed { .. }));
        assert_eq!(labels, ["[1/3] emulator-5554:", "[2/3] emulator-5556:"]);
        let installs = runner
            .invocations()
            .into_iter()
            .filter(|i| i.arguments().iter().any(|a| a == "install"))
            .count();
        assert_eq!(installs, 2);
    }
}
