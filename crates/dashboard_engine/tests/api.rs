use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dashboard_engine::{ApiClient, ApiErrorKind, ApiSettings, ReqwestApiClient};

fn client_for(server: &MockServer) -> ReqwestApiClient {
    ReqwestApiClient::new(ApiSettings::for_base_url(server.uri())).expect("client builds")
}

#[tokio::test]
async fn get_docs_reads_plain_document_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"job_id": "job-1", "filename": "a.txt", "status": "completed"},
                {"jobId": "job-2", "file_name": "b.txt", "status": "processing"}
            ]
        })))
        .mount(&server)
        .await;

    let docs = client_for(&server).get_docs().await.expect("docs ok");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].job_id, "job-1");
    assert_eq!(docs[1].job_id, "job-2");
    assert_eq!(docs[1].filename, "b.txt");
}

#[tokio::test]
async fn get_docs_unwraps_dynamo_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [
                {
                    "job_id": {"S": "job-9"},
                    "filename": {"S": "notes.txt"},
                    "status": {"S": "failed"},
                    "failure_reason": {"S": "chunker crashed"}
                }
            ]
        })))
        .mount(&server)
        .await;

    let docs = client_for(&server).get_docs().await.expect("docs ok");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].job_id, "job-9");
    assert_eq!(docs[0].filename, "notes.txt");
    assert_eq!(docs[0].status, "failed");
    assert_eq!(docs[0].failure_reason.as_deref(), Some("chunker crashed"));
}

#[tokio::test]
async fn get_docs_rejects_document_without_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"filename": "orphan.txt", "status": "completed"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_docs().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::MalformedPayload);
}

#[tokio::test]
async fn non_success_status_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "warming up"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).get_docs().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::HttpStatus(503));
    assert_eq!(err.message, "warming up");
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn create_upload_requires_job_id_and_presigned_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_json(json!({"filename": "a.txt"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "job-1"})))
        .mount(&server)
        .await;

    let err = client_for(&server).create_upload("a.txt").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::MalformedPayload);
}

#[tokio::test]
async fn create_upload_accepts_camel_case_synonyms() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobId": "job-4",
            "preSignedUrl": "http://storage.local/put/job-4"
        })))
        .mount(&server)
        .await;

    let init = client_for(&server)
        .create_upload("a.txt")
        .await
        .expect("upload init ok");
    assert_eq!(init.job_id, "job-4");
    assert_eq!(init.pre_signed_url, "http://storage.local/put/job-4");
}

#[tokio::test]
async fn get_status_degrades_unreadable_payload_to_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("not an object")))
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .get_status("job-1")
        .await
        .expect("status ok");
    assert_eq!(snapshot.job_id, "job-1");
    assert_eq!(snapshot.status, "unknown");
}

#[tokio::test]
async fn get_status_clamps_progress_and_parses_dynamo_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": {"S": "job-2"},
            "status": {"S": "processing"},
            "progress_percentage": {"N": "140"},
            "total_sentences": {"N": "12"},
            "completed_sentences": {"N": "7"}
        })))
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .get_status("job-2")
        .await
        .expect("status ok");
    assert_eq!(snapshot.status, "processing");
    assert_eq!(snapshot.progress_percentage, Some(100));
    assert_eq!(snapshot.total_sentences, Some(12));
    assert_eq!(snapshot.completed_sentences, Some(7));
}

#[tokio::test]
async fn processing_chain_fills_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/processing-chain/job-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                {"Stage": "Chunking", "Timestamp": "2026-08-01T10:00:00Z"},
                {"stage": "Extraction"}
            ]
        })))
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .get_processing_chain("job-3")
        .await
        .expect("chain ok");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].stage, "Chunking");
    assert_eq!(entries[0].timestamp, "2026-08-01T10:00:00Z");
    assert_eq!(entries[1].stage, "Extraction");
    // Missing timestamps are filled so the list stays sortable.
    assert!(!entries[1].timestamp.is_empty());
}

#[tokio::test]
async fn upload_to_presigned_reports_status_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/put/job-1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = format!("{}/put/job-1", server.uri());
    let err = client_for(&server)
        .upload_to_presigned(&url, b"hello".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::HttpStatus(403));
    assert_eq!(err.message, "File upload failed with status 403");
}

#[tokio::test]
async fn sentence_chain_reads_processing_stages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sentence-chain/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sentence_hash": "abc123",
            "processing_stages": [
                {"stage": "Extraction", "timestamp": "2026-08-01T10:00:00Z", "status": "completed"}
            ]
        })))
        .mount(&server)
        .await;

    let chain = client_for(&server)
        .get_sentence_chain("abc123")
        .await
        .expect("sentence chain ok");
    assert_eq!(chain.sentence_hash, "abc123");
    assert_eq!(chain.stages.len(), 1);
    assert_eq!(chain.stages[0].status.as_deref(), Some("completed"));
}
