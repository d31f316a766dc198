use super::*;
use axum::{http::StatusCode, routing::get, Router};
use shared::LoadErrorKind;
use tokio::net::TcpListener;

async fn spawn_dataset_server() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route(
            "/data/collection.json",
            get(|| async { r#"[{"CAM_ID":"CAM1","URLd":"https://img/1d"},{"CAM_ID":"CAM2"}]"# }),
        )
        .route("/data/broken.json", get(|| async { "{not json" }))
        .route(
            "/data/object.json",
            get(|| async { r#"{"CAM_ID":"CAM1"}"# }),
        )
        .route(
            "/data/missing.json",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn http_fetcher_decodes_record_array() {
    let server_url = spawn_dataset_server().await.expect("spawn server");
    let fetcher = HttpFetcher::new();

    let records = fetcher
        .fetch(&format!("{server_url}/data/collection.json"))
        .await
        .expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].cam_id().as_deref(), Some("CAM1"));
    assert!(records[0].has_any_photo());
    assert!(!records[1].has_any_photo());
}

#[tokio::test]
async fn http_fetcher_resolves_relative_locations_against_base() {
    let server_url = spawn_dataset_server().await.expect("spawn server");
    let base = Url::parse(&format!("{server_url}/data")).expect("base url");
    let fetcher = HttpFetcher::with_base_url(base);

    let records = fetcher.fetch("collection.json").await.expect("records");
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn http_fetcher_reports_status_and_payload_failures() {
    let server_url = spawn_dataset_server().await.expect("spawn server");
    let fetcher = HttpFetcher::new();

    let missing = fetcher
        .fetch(&format!("{server_url}/data/missing.json"))
        .await
        .expect_err("404");
    assert_eq!(
        missing,
        LoadError::Status {
            location: format!("{server_url}/data/missing.json"),
            status: 404,
        }
    );

    let broken = fetcher
        .fetch(&format!("{server_url}/data/broken.json"))
        .await
        .expect_err("bad json");
    assert_eq!(broken.kind(), LoadErrorKind::Malformed);

    let object = fetcher
        .fetch(&format!("{server_url}/data/object.json"))
        .await
        .expect_err("not an array");
    assert_eq!(object.kind(), LoadErrorKind::Malformed);
}

#[tokio::test]
async fn relative_location_without_base_is_a_transport_error() {
    let err = HttpFetcher::new()
        .fetch("collection.json")
        .await
        .expect_err("no base");
    assert_eq!(err.kind(), LoadErrorKind::Transport);
}

#[tokio::test]
async fn file_fetcher_reads_from_data_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("crispr.json"),
        r#"[{"CAM_ID":"CAM9","Preservation_date":"2022-06-01"}]"#,
    )
    .expect("write dataset");
    let fetcher = FileFetcher::new(dir.path());

    let records = fetcher.fetch("crispr.json").await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].preservation_date().as_deref(), Some("2022-06-01"));

    let missing = fetcher.fetch("absent.json").await.expect_err("missing");
    assert_eq!(missing.kind(), LoadErrorKind::Io);
}

#[tokio::test]
async fn source_fetcher_routes_by_location_scheme() {
    let server_url = spawn_dataset_server().await.expect("spawn server");
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("local.json"), r#"[{"CAM_ID":"LOCAL"}]"#)
        .expect("write dataset");
    let fetcher = SourceFetcher::new(HttpFetcher::new(), Some(FileFetcher::new(dir.path())));

    let local = fetcher.fetch("local.json").await.expect("local");
    assert_eq!(local[0].cam_id().as_deref(), Some("LOCAL"));

    let remote = fetcher
        .fetch(&format!("{server_url}/data/collection.json"))
        .await
        .expect("remote");
    assert_eq!(remote.len(), 2);
}
