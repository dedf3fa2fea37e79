use tokio_util::sync::CancellationToken;

use dashboard_core::DocumentRecord;
use dashboard_logging::{dash_info, dash_warn};

use crate::api::ApiClient;
use crate::cache::DocsCache;
use crate::poller::EventSink;
use crate::types::EngineEvent;

/// Run one upload end to end: initiate, push the bytes to the presigned
/// target, then trigger processing. A trigger failure is not fatal; the
/// document lands as `pending` and can be retriggered from the shell.
pub async fn run_upload(
    client: &dyn ApiClient,
    cache: &DocsCache,
    temp_id: &str,
    filename: &str,
    bytes: Vec<u8>,
    token: &CancellationToken,
    sink: &dyn EventSink,
) {
    let init = match client.create_upload(filename).await {
        Ok(init) => init,
        Err(error) => {
            sink.emit(EngineEvent::UploadFailed {
                temp_id: temp_id.to_string(),
                error,
            });
            return;
        }
    };
    if token.is_cancelled() {
        return;
    }
    sink.emit(EngineEvent::UploadAccepted {
        temp_id: temp_id.to_string(),
        record: DocumentRecord {
            job_id: init.job_id.clone(),
            filename: filename.to_string(),
            status: "uploading".to_string(),
            created_at: None,
            failure_reason: None,
        },
    });

    if let Err(error) = client.upload_to_presigned(&init.pre_signed_url, bytes).await {
        sink.emit(EngineEvent::UploadFailed {
            temp_id: temp_id.to_string(),
            error,
        });
        return;
    }
    if token.is_cancelled() {
        return;
    }

    let trigger_error = match client.trigger_processing(&init.job_id).await {
        Ok(()) => {
            dash_info!("upload of {filename} complete, processing triggered as {}", init.job_id);
            None
        }
        Err(error) => {
            dash_warn!("upload of {filename} stored but trigger failed: {error}");
            Some(error)
        }
    };
    let status = if trigger_error.is_none() {
        "processing"
    } else {
        "pending"
    };
    cache.invalidate();
    sink.emit(EngineEvent::UploadFinished {
        temp_id: temp_id.to_string(),
        record: DocumentRecord {
            job_id: init.job_id,
            filename: filename.to_string(),
            status: status.to_string(),
            created_at: None,
            failure_reason: None,
        },
        trigger_error,
    });
}
