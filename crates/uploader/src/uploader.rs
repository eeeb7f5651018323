//! Resumable upload driver.
//!
//! Opens sessions, streams file chunks against them, and reports progress
//! through an event channel. One upload runs at a time per uploader.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use videohub_protocol::constants::STATUS_RESUME_INCOMPLETE;
use videohub_protocol::{
    ContentRange, UploadEvent, VideoMetadata, VideoResource, progress_percentage,
};
use videohub_transfer::{ChunkReader, SpeedCalculator, UploadSession, format_bytes};

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::http::HttpTransport;
use crate::response::{SessionStatus, interpret_put, session_url_from};
use crate::transport::{InitiateRequest, UploadTransport};

/// Client for the resumable upload protocol.
pub struct ResumableUploader<T: UploadTransport> {
    transport: T,
    config: UploaderConfig,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    cancel: Mutex<CancellationToken>,
    busy: AtomicBool,
}

impl ResumableUploader<HttpTransport> {
    /// Creates an uploader talking HTTP to `config.endpoint`.
    pub fn http(
        config: UploaderConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let transport = HttpTransport::from_config(&config, access_token)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: UploadTransport> ResumableUploader<T> {
    pub fn new(transport: T, config: UploaderConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        Self {
            transport,
            config,
            events_tx,
            events_rx: Some(events_rx),
            cancel: Mutex::new(CancellationToken::new()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are dropped, never queued without bound, when the receiver
    /// lags behind.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Returns the cancellation token for the current (or next) upload.
    ///
    /// A fresh token is installed whenever a cancelled upload ends.
    pub fn cancel_token(&self) -> CancellationToken {
        self.lock_cancel().clone()
    }

    /// Requests cancellation at the next chunk boundary.
    ///
    /// With no upload running, the next upload fails with
    /// [`UploadError::Cancelled`] before touching the network.
    pub fn cancel(&self) {
        info!("upload cancellation requested");
        self.lock_cancel().cancel();
    }

    /// Returns `true` while an upload is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Opens an upload session and returns its URL.
    pub async fn initiate(
        &self,
        metadata: &VideoMetadata,
        content_length: u64,
    ) -> Result<String, UploadError> {
        let request = InitiateRequest {
            metadata: metadata.clone(),
            content_length,
        };
        let response = self.transport.initiate(&request).await.map_err(|e| match e {
            UploadError::SessionInitiation(_) => e,
            other => UploadError::SessionInitiation(other.to_string()),
        })?;
        let session_url = session_url_from(&response)?;
        debug!(content_length, "upload session opened");
        Ok(session_url)
    }

    /// Uploads `path` into an open session, starting from the session's
    /// acknowledged offset.
    pub async fn upload(
        &self,
        session: &UploadSession,
        path: &Path,
    ) -> Result<VideoResource, UploadError> {
        let _guard = self.acquire()?;
        self.run(session, path, false).await
    }

    /// Asks the server how far the session got, then uploads the rest.
    pub async fn resume(
        &self,
        session: &UploadSession,
        path: &Path,
    ) -> Result<VideoResource, UploadError> {
        let _guard = self.acquire()?;
        self.run(session, path, true).await
    }

    /// Opens a session for `path` and uploads it in one go.
    pub async fn upload_file(
        &self,
        metadata: &VideoMetadata,
        path: &Path,
    ) -> Result<VideoResource, UploadError> {
        let _guard = self.acquire()?;

        self.emit(UploadEvent::Progress {
            percentage: 0.0,
            message: "Initializing upload...".into(),
        });
        let opened = async {
            self.check_cancelled()?;
            let content_length = tokio::fs::metadata(path).await?.len();
            let session_url = self.initiate(metadata, content_length).await?;
            Ok::<_, UploadError>(UploadSession::new(session_url, content_length))
        }
        .await;

        let session = match opened {
            Ok(session) => session,
            Err(e) => {
                self.report_failure(None, &e);
                return Err(e);
            }
        };
        self.run(&session, path, false).await
    }

    /// Queries the number of bytes the server holds for a session.
    pub async fn query_status(
        &self,
        session_url: &str,
        total_bytes: u64,
    ) -> Result<SessionStatus, UploadError> {
        self.send(session_url, ContentRange::query(total_bytes), Vec::new(), 0)
            .await
    }

    fn lock_cancel(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> Result<InFlight<'_>, UploadError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| UploadError::AlreadyInProgress)?;
        Ok(InFlight {
            busy: &self.busy,
            cancel: &self.cancel,
        })
    }

    fn check_cancelled(&self) -> Result<(), UploadError> {
        if self.lock_cancel().is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        Ok(())
    }

    /// Runs a transfer and settles the session state.
    async fn run(
        &self,
        session: &UploadSession,
        path: &Path,
        resume: bool,
    ) -> Result<VideoResource, UploadError> {
        if !session.is_active() {
            return Err(UploadError::SessionNotActive(session.id()));
        }

        let cancel = self.cancel_token();
        match self.transfer(session, path, resume, &cancel).await {
            Ok(video) => {
                session.complete();
                self.emit(UploadEvent::Progress {
                    percentage: session.progress().overall_percentage(),
                    message: "Upload complete".into(),
                });
                self.emit(UploadEvent::Completed {
                    video_id: video.id.clone(),
                });
                info!(
                    session = %session.id(),
                    video_id = %video.id,
                    total_bytes = session.total_bytes(),
                    elapsed_ms = session.elapsed().map(|d| d.as_millis() as u64),
                    "upload completed"
                );
                Ok(video)
            }
            Err(UploadError::Cancelled) => {
                session.cancel();
                self.emit(UploadEvent::Cancelled);
                info!(
                    session = %session.id(),
                    offset = session.uploaded_bytes(),
                    "upload cancelled"
                );
                Err(UploadError::Cancelled)
            }
            Err(e) => {
                session.fail(&e.to_string());
                self.report_failure(Some(session), &e);
                Err(e)
            }
        }
    }

    fn report_failure(&self, session: Option<&UploadSession>, err: &UploadError) {
        if matches!(err, UploadError::Cancelled) {
            self.emit(UploadEvent::Cancelled);
            return;
        }
        self.emit(UploadEvent::Failed {
            error: err.to_string(),
        });
        match session {
            Some(session) => error!(
                session = %session.id(),
                offset = session.uploaded_bytes(),
                error = %err,
                "upload failed"
            ),
            None => error!(error = %err, "upload failed"),
        }
    }

    async fn transfer(
        &self,
        session: &UploadSession,
        path: &Path,
        resume: bool,
        cancel: &CancellationToken,
    ) -> Result<VideoResource, UploadError> {
        let total = session.total_bytes();
        let mut reader = open_reader(path.to_path_buf(), self.config.chunk_size()).await?;
        if reader.file_size() != total {
            return Err(UploadError::SizeMismatch {
                expected: total,
                actual: reader.file_size(),
            });
        }

        check_cancelled(cancel)?;
        session.start()?;
        let session_url = session.session_url();

        if resume {
            let offset = session.uploaded_bytes();
            match self.send(&session_url, ContentRange::query(total), Vec::new(), offset).await? {
                SessionStatus::Complete(video) => return Ok(video),
                SessionStatus::Incomplete { acknowledged } => {
                    advance(session, acknowledged)?;
                    info!(session = %session.id(), offset = acknowledged, "resuming upload");
                }
            }
        }

        debug!(
            session = %session.id(),
            total_bytes = total,
            chunks = reader.chunks_from(session.uploaded_bytes()),
            "starting chunk transfer"
        );
        self.emit(UploadEvent::Progress {
            percentage: progress_percentage(session.uploaded_bytes(), total),
            message: "Uploading...".into(),
        });

        let speed = SpeedCalculator::default();
        let mut attempt = 0u32;

        while session.uploaded_bytes() < total {
            check_cancelled(cancel)?;

            let offset = session.uploaded_bytes();
            let (returned, chunk) = tokio::task::spawn_blocking(move || {
                let chunk = reader.read_at(offset);
                (reader, chunk)
            })
            .await
            .map_err(|e| UploadError::Io(std::io::Error::other(format!("read task failed: {e}"))))?;
            reader = returned;
            let chunk = chunk?.ok_or(UploadError::SizeMismatch {
                expected: total,
                actual: offset,
            })?;

            let range = ContentRange::chunk(chunk.offset, chunk.len(), total);
            trace!(session = %session.id(), %range, "sending chunk");

            match self.send(&session_url, range, chunk.data, offset).await {
                Ok(SessionStatus::Complete(video)) => return Ok(video),
                Ok(SessionStatus::Incomplete { acknowledged }) if acknowledged > offset => {
                    attempt = 0;
                    advance(session, acknowledged)?;
                    speed.add_sample(acknowledged - offset);
                    let mut message = format!(
                        "Uploading: {} / {} ({}/s",
                        format_bytes(acknowledged),
                        format_bytes(total),
                        format_bytes(speed.bytes_per_second() as u64)
                    );
                    if let Some(eta) = speed.eta(total - acknowledged) {
                        message.push_str(&format!(", {}s left", eta.as_secs()));
                    }
                    message.push(')');
                    self.emit(UploadEvent::Progress {
                        percentage: progress_percentage(acknowledged, total),
                        message,
                    });
                }
                Ok(SessionStatus::Incomplete { acknowledged }) => {
                    // Nothing of the chunk was stored; resending counts as a retry.
                    advance(session, acknowledged)?;
                    if attempt >= self.config.retry.max_retries {
                        return Err(UploadError::ChunkUpload {
                            status: Some(STATUS_RESUME_INCOMPLETE),
                            offset,
                        });
                    }
                    attempt += 1;
                    self.back_off(session, offset, attempt, "chunk not accepted", cancel)
                        .await?;
                }
                Err(e) if e.is_retryable() && attempt < self.config.retry.max_retries => {
                    attempt += 1;
                    self.back_off(session, offset, attempt, &e.to_string(), cancel)
                        .await?;

                    match self.send(&session_url, ContentRange::query(total), Vec::new(), offset).await {
                        Ok(SessionStatus::Complete(video)) => return Ok(video),
                        Ok(SessionStatus::Incomplete { acknowledged }) => {
                            advance(session, acknowledged)?;
                        }
                        Err(e) if e.is_retryable() => {
                            debug!(session = %session.id(), error = %e, "status query failed");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }

        // Every byte was acknowledged with 308; the server still owes the
        // resource.
        match self.send(&session_url, ContentRange::query(total), Vec::new(), total).await? {
            SessionStatus::Complete(video) => Ok(video),
            SessionStatus::Incomplete { .. } => Err(UploadError::ChunkUpload {
                status: Some(STATUS_RESUME_INCOMPLETE),
                offset: total,
            }),
        }
    }

    /// Waits out the retry delay for `attempt`, returning early on cancellation.
    async fn back_off(
        &self,
        session: &UploadSession,
        offset: u64,
        attempt: u32,
        reason: &str,
        cancel: &CancellationToken,
    ) -> Result<(), UploadError> {
        let delay = self.config.retry.delay_for_attempt(attempt);
        warn!(
            session = %session.id(),
            offset,
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason,
            "chunk failed, retrying"
        );
        tokio::select! {
            _ = cancel.cancelled() => Err(UploadError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Sends one PUT and interprets the answer.
    async fn send(
        &self,
        session_url: &str,
        range: ContentRange,
        body: Vec<u8>,
        offset: u64,
    ) -> Result<SessionStatus, UploadError> {
        let request = self.transport.put(session_url, range, body);
        let result = match self.config.chunk_timeout() {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(offset, timeout_secs = limit.as_secs(), "chunk request timed out");
                    return Err(UploadError::ChunkUpload {
                        status: None,
                        offset,
                    });
                }
            },
            None => request.await,
        };

        let response = result.map_err(|e| {
            warn!(offset, error = %e, "chunk request failed");
            UploadError::ChunkUpload {
                status: None,
                offset,
            }
        })?;
        trace!(offset, status = response.status, "chunk response");
        interpret_put(&response, range, offset)
    }

    fn emit(&self, event: UploadEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            trace!(error = %e, "upload event dropped");
        }
    }
}

/// Marks the uploader idle when an upload exits, by any path.
struct InFlight<'a> {
    busy: &'a AtomicBool,
    cancel: &'a Mutex<CancellationToken>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        self.busy.store(false, Ordering::Release);
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), UploadError> {
    if cancel.is_cancelled() {
        return Err(UploadError::Cancelled);
    }
    Ok(())
}

/// Moves the session offset to a server acknowledgment.
fn advance(session: &UploadSession, acknowledged: u64) -> Result<(), UploadError> {
    session
        .acknowledge(acknowledged)
        .map_err(|e| UploadError::Protocol(e.to_string()))
}

async fn open_reader(path: PathBuf, chunk_size: usize) -> Result<ChunkReader, UploadError> {
    let reader = tokio::task::spawn_blocking(move || ChunkReader::open(&path, chunk_size))
        .await
        .map_err(|e| UploadError::Io(std::io::Error::other(format!("open task failed: {e}"))))??;
    Ok(reader)
}
