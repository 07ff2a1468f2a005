use anyhow::Result;
use gold_sync::config::{SinkKind, SyncConfig};
use gold_sync::RunOutcome;
use httpmock::prelude::*;
use tempfile::TempDir;

const PAGE: &str = include_str!("fixtures/mi_hong.html");

fn file_config(url: String, path: &std::path::Path) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.sink.kind = SinkKind::File;
    config.source.url = url;
    config.file.path = path.to_str().unwrap().to_string();
    config
}

#[tokio::test]
async fn test_end_to_end_file_sync() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("out/gold_prices.txt");

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/trong-nuoc/mi-hong/");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(PAGE);
    });

    let config = file_config(server.url("/trong-nuoc/mi-hong/"), &output);
    let outcome = gold_sync::app::run(&config).await?;

    page_mock.assert();
    assert_eq!(
        outcome,
        RunOutcome::Synced {
            destination: output.to_str().unwrap().to_string(),
            entries: 11,
        }
    );

    let content = std::fs::read_to_string(&output)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "SJC: 8350 - 8550");
    assert_eq!(lines[1], "999: 8120 - 8270");
    assert_eq!(lines[2], "985: 8050 - 8200");
    assert_eq!(lines[3], "980: 7980 - 8130");
    assert_eq!(lines[4], "950: 7700 - 7900");
    assert_eq!(lines[5], "750: 5900 - 6250");
    assert_eq!(lines[9], "10K: 3200 - 3550");
    assert_eq!(lines[10], "18K: N/A - 6050");
    Ok(())
}

#[tokio::test]
async fn test_structural_change_is_a_no_op() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("gold_prices.txt");

    let server = MockServer::start();
    let changed = PAGE.replace("<th>Bán ra</th>", "<th>Giá bán</th>");
    server.mock(|when, then| {
        when.method(GET).path("/gold");
        then.status(200).body(changed);
    });

    let config = file_config(server.url("/gold"), &output);
    let outcome = gold_sync::app::run(&config).await?;

    assert_eq!(outcome, RunOutcome::NoData);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_source_failure_is_a_no_op() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("gold_prices.txt");

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/gold");
        then.status(500);
    });

    let config = file_config(server.url("/gold"), &output);
    let outcome = gold_sync::app::run(&config).await?;

    page_mock.assert();
    assert_eq!(outcome, RunOutcome::NoData);
    assert!(!output.exists());
    Ok(())
}
