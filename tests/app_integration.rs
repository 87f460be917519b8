use stakehouse::AppCommand;
use stakehouse::core::metrics;
use stakehouse::store::LedgerStore;
use stakehouse::store::disk::DiskStore;
use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(property_id: &str, estimated_value: f64) -> MockServer {
        let mock_server = MockServer::start().await;
        mount_valuation(&mock_server, property_id, estimated_value).await;
        mock_server
    }

    pub async fn mount_valuation(mock_server: &MockServer, property_id: &str, value: f64) {
        let url_path = format!("/v1/properties/{property_id}/valuation");
        let body = format!(r#"{{"property_id": "{property_id}", "estimated_value": {value}}}"#);

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    pub fn write_config(
        dir: &std::path::Path,
        warehouse_url: &str,
    ) -> (std::path::PathBuf, std::path::PathBuf) {
        let config_path = dir.join("config.yaml");
        let data_path = dir.join("data");
        let config_content = format!(
            r#"
providers:
  warehouse:
    base_url: {warehouse_url}
data_path: {}
"#,
            data_path.display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        (config_path, data_path)
    }
}

#[test_log::test(tokio::test)]
async fn test_originate_issue_sync_flow() {
    let property_id = "PROP-8F3A21";
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mock_server = test_utils::create_mock_server(property_id, 500_000.0).await;
    let (config_path, data_path) = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    // Originate the agreement from the warehouse valuation.
    stakehouse::run_command(
        AppCommand::Originate {
            property_id: property_id.to_string(),
            occupant_id: "alice".to_string(),
            address: Some("12 Birchwood Lane".to_string()),
        },
        Some(config_path),
    )
    .await
    .expect("originate failed");

    // Bring in an outside investor from the unallocated pool.
    stakehouse::run_command(
        AppCommand::Issue {
            property_id: property_id.to_string(),
            investor_id: "bob".to_string(),
            amount_percent: 20.0,
        },
        Some(config_path),
    )
    .await
    .expect("issue failed");

    // The market moves; re-sync against the new warehouse estimate.
    mock_server.reset().await;
    test_utils::mount_valuation(&mock_server, property_id, 600_000.0).await;
    stakehouse::run_command(
        AppCommand::Sync {
            property_id: Some(property_id.to_string()),
        },
        Some(config_path),
    )
    .await
    .expect("sync failed");

    // Inspect the persisted snapshot directly.
    let store = DiskStore::open(&data_path.join("ledgers")).expect("Failed to open store");
    let ledger = store
        .load(property_id)
        .unwrap()
        .expect("ledger should be persisted");
    info!(?ledger, "Loaded synced ledger");

    assert_eq!(ledger.occupant_equity_percent(), 51.0);
    assert_eq!(ledger.stake_of("bob"), Some(20.0));
    assert_eq!(ledger.original_purchase_value(), 500_000.0);
    assert_eq!(ledger.original_monthly_obligation(), 2_500.0);
    assert_eq!(ledger.current_market_value(), 600_000.0);
    assert!(ledger.last_sync_timestamp().is_some());

    // Appreciation flows into share value but never into dues.
    let report = metrics::share_value(&ledger, "bob").unwrap();
    assert_eq!(report.original_value, 100_000.0);
    assert_eq!(report.current_value, 120_000.0);
    assert_eq!(report.unrealized_profit, 20_000.0);
    assert_eq!(report.profit_percent, 20.0);

    let dues = metrics::monthly_dues(&ledger);
    assert_eq!(dues["alice"], 1_275.0);
    assert_eq!(dues["bob"], 500.0);
}

#[test_log::test(tokio::test)]
async fn test_originate_unknown_property_fails() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    // Server mounts no valuation route: every lookup is a 404.
    let mock_server = wiremock::MockServer::start().await;
    let (config_path, data_path) = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = stakehouse::run_command(
        AppCommand::Originate {
            property_id: "PROP-MISSING".to_string(),
            occupant_id: "alice".to_string(),
            address: None,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("originate should fail for an unknown property");
    assert!(
        err.to_string().contains("not found"),
        "unexpected error: {err:?}"
    );

    let store = DiskStore::open(&data_path.join("ledgers")).unwrap();
    assert!(store.load("PROP-MISSING").unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_occupant_floor_is_enforced_end_to_end() {
    let property_id = "PROP-8F3A21";
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mock_server = test_utils::create_mock_server(property_id, 500_000.0).await;
    let (config_path, data_path) = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    stakehouse::run_command(
        AppCommand::Originate {
            property_id: property_id.to_string(),
            occupant_id: "alice".to_string(),
            address: None,
        },
        Some(config_path),
    )
    .await
    .expect("originate failed");

    // The occupant sits exactly at 51%; selling 20% must be rejected.
    let result = stakehouse::run_command(
        AppCommand::Transfer {
            property_id: property_id.to_string(),
            buyer_id: "bob".to_string(),
            seller_id: "alice".to_string(),
            amount_percent: 20.0,
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_err(), "floor-breaking transfer must fail");

    let store = DiskStore::open(&data_path.join("ledgers")).unwrap();
    let ledger = store.load(property_id).unwrap().unwrap();
    assert_eq!(ledger.occupant_equity_percent(), 51.0);
    assert_eq!(ledger.investor_count(), 0);
}

#[test_log::test(tokio::test)]
async fn test_display_commands_run_clean() {
    let property_id = "PROP-8F3A21";
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mock_server = test_utils::create_mock_server(property_id, 500_000.0).await;
    let (config_path, _data_path) = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    stakehouse::run_command(
        AppCommand::Originate {
            property_id: property_id.to_string(),
            occupant_id: "alice".to_string(),
            address: None,
        },
        Some(config_path),
    )
    .await
    .expect("originate failed");
    stakehouse::run_command(
        AppCommand::Issue {
            property_id: property_id.to_string(),
            investor_id: "bob".to_string(),
            amount_percent: 15.0,
        },
        Some(config_path),
    )
    .await
    .expect("issue failed");

    for command in [
        AppCommand::Status { property_id: None },
        AppCommand::Status {
            property_id: Some(property_id.to_string()),
        },
        AppCommand::Dues {
            property_id: property_id.to_string(),
        },
        AppCommand::Shares {
            property_id: property_id.to_string(),
            investor_id: None,
        },
        AppCommand::Shares {
            property_id: property_id.to_string(),
            investor_id: Some("bob".to_string()),
        },
    ] {
        let result = stakehouse::run_command(command.clone(), Some(config_path)).await;
        assert!(result.is_ok(), "command {command:?} failed: {result:?}");
    }
}

#[test_log::test(tokio::test)]
async fn test_setup_writes_parseable_config() {
    use stakehouse::core::config::AppConfig;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.yaml");

    stakehouse::cli::setup::setup_at_path(&config_path).expect("setup failed");

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("warehouse"));

    let config = AppConfig::load_from_path(&config_path).expect("generated config must parse");
    assert_eq!(config.obligation_rate, 0.005);
}
