//! End-to-end syslog streaming through a fake `ssh` binary

#![cfg(unix)]

use futures::StreamExt;
use fxdev_core::domain::DeviceId;
use fxdev_integration_tests::fixture::{is_alive, FakeFuchsia};
use serial_test::serial;
use std::time::Duration;
use tokio::time::timeout;

fn device() -> DeviceId {
    DeviceId::parse_line("192.168.42.56 paper-pulp-bush-angel").unwrap()
}

#[tokio::test]
#[serial]
async fn test_lines_stream_until_remote_exit() {
    let fake = FakeFuchsia::new().unwrap();
    fake.install_ssh("echo '[00001.000] [klog] boot'\necho '[00002.000] [netstack] up'\nexit 0")
        .unwrap();
    let (toolbox, diagnostics) = fake.toolbox();

    let lines: Vec<String> = timeout(
        Duration::from_secs(10),
        toolbox.syslogs(&device()).map(|l| l.into_string()).collect(),
    )
    .await
    .expect("stream did not end after ssh exited");

    assert_eq!(lines, vec!["[00001.000] [klog] boot", "[00002.000] [netstack] up"]);
    assert_eq!(
        fake.recorded_ssh_args().unwrap(),
        vec![
            "-F".to_string(),
            fake.ssh_config().to_string_lossy().into_owned(),
            "192.168.42.56 paper-pulp-bush-angel".to_string(),
            "log_listener --clock Local".to_string(),
        ]
    );
    assert!(diagnostics.records().is_empty());
}

#[tokio::test]
#[serial]
async fn test_failed_remote_just_ends_stream() {
    let fake = FakeFuchsia::new().unwrap();
    fake.install_ssh("echo 'partial'\nexit 255").unwrap();
    let (toolbox, _) = fake.toolbox();

    let lines: Vec<_> = timeout(Duration::from_secs(10), toolbox.syslogs(&device()).collect())
        .await
        .expect("stream did not end after ssh failed");

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].as_str(), "partial");
}

#[tokio::test]
#[serial]
async fn test_close_kills_remote_session() {
    let fake = FakeFuchsia::new().unwrap();
    fake.install_ssh(&format!(
        "echo $$ > '{}'\necho ready\nexec sleep 30",
        fake.pid_file().display()
    ))
    .unwrap();
    let (toolbox, _) = fake.toolbox();

    let mut stream = toolbox.syslogs(&device());
    let first = timeout(Duration::from_secs(10), stream.next())
        .await
        .expect("no output from ssh");
    assert_eq!(first.map(|l| l.into_string()).as_deref(), Some("ready"));

    let pid = fake.recorded_pid().unwrap();
    assert!(is_alive(pid));

    timeout(Duration::from_secs(10), stream.close())
        .await
        .expect("close hung");

    assert!(!is_alive(pid));
}

#[tokio::test]
#[serial]
async fn test_missing_ssh_config_yields_empty_stream() {
    let fake = FakeFuchsia::new().unwrap();
    fake.install_ssh("echo 'should never run'").unwrap();
    std::fs::remove_file(fake.ssh_config()).unwrap();
    let (toolbox, diagnostics) = fake.toolbox();

    let lines: Vec<_> = toolbox.syslogs(&device()).collect().await;

    assert!(lines.is_empty());
    assert_eq!(diagnostics.errors().len(), 2);
    assert!(!fake.ssh_args_file().exists());
}
