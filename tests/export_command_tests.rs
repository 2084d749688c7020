use cldexport::actions::export::export_assets;
use cldexport::commands::build_cli;
use cldexport::configuration::Configuration;
use cldexport::error::CliError;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn configuration(server: &MockServer) -> Configuration {
    let mut configuration = Configuration::default();
    configuration.set_api_url(Some(Url::parse(&server.uri()).unwrap()));
    configuration
}

async fn run(server: &MockServer, output: &Path, extra: &[&str]) -> Result<(), CliError> {
    let output = output.to_string_lossy().to_string();
    let mut args = vec![
        "cldexport",
        "export",
        "--cloud-name",
        "demo",
        "--api-key",
        "key",
        "--api-secret",
        "secret",
        "--no-input",
        "--quiet",
        "--output",
        output.as_str(),
    ];
    args.extend_from_slice(extra);

    let matches = build_cli().try_get_matches_from(args).unwrap();
    let sub_matches = matches.subcommand_matches("export").unwrap();
    export_assets(sub_matches, &configuration(server)).await
}

#[tokio::test]
async fn test_unusable_output_path_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/demo/metadata_fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"metadata_fields": []})))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();

    let error = run(
        &server,
        &blocker.join("assets.csv"),
        &["--field", "metadata"],
    )
    .await
    .unwrap_err();

    assert!(matches!(error, CliError::FormattingError(_)));
    assert_eq!(error.exit_code().code(), 73);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_export_with_metadata_writes_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/demo/metadata_fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata_fields": [{
                "external_id": "color",
                "label": "Color",
                "type": "enum",
                "datasource": {"values": [{"external_id": "red_id", "value": "Red"}]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/demo/resources/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "resources": [{
                "public_id": "samples/dog",
                "format": "jpg",
                "version": 1,
                "created_at": "2023-10-17T00:26:40Z",
                "bytes": 2048,
                "width": 10,
                "height": 20,
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/samples/dog.jpg",
                "metadata": {"color": "red_id"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("reports").join("assets.csv");

    run(&server, &output, &["--field", "metadata"]).await.unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.iter().last(), Some("color"));
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "samples/dog");
    assert_eq!(rows[0].iter().last(), Some("Red"));
}
