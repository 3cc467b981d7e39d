//! IPC protocol handling for the log service.
//!
//! Requests, responses and notifications are JSON-encoded. Tags come from
//! `logbuf-ipc`.

use logbuf_hal::{LogBackend, ModuleLoader};
use logbuf_ipc::log as log_msg;
use logbuf_ipc::response_tag;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::listener::{ListenerGone, UsedSizeListener};
use crate::permissions::CallerContext;
use crate::service::LogService;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Flush response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushResponse {
    /// Flush count including this flush, or the error
    pub result: Result<u64, ServiceError>,
}

/// Total or used size response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeResponse {
    /// Size in bytes, or the error
    pub result: Result<u32, ServiceError>,
}

/// Dump request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRequest {
    /// Dump arguments (empty = full state)
    #[serde(default)]
    pub args: Vec<String>,
}

/// Dump response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpResponse {
    pub output: String,
}

/// `MSG_LOG_USED_SIZE_CHANGED` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedSizeChanged {
    pub used_log_size: u32,
}

// ============================================================================
// Client Notifications
// ============================================================================

/// Outgoing message channel to one client endpoint.
pub trait MessageSink: Send + Sync {
    /// Send a tagged message. Fails once the client endpoint is gone.
    fn send(&self, tag: u32, payload: &[u8]) -> Result<(), ListenerGone>;
}

/// Listener that forwards used-size changes to a client over IPC.
pub struct IpcListener<S: MessageSink> {
    sink: S,
}

impl<S: MessageSink> IpcListener<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: MessageSink> UsedSizeListener for IpcListener<S> {
    fn on_used_log_size_change(&self, used_log_size: u32) -> Result<(), ListenerGone> {
        let payload = match encode(&UsedSizeChanged { used_log_size }) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping used size notification: {}", e);
                return Ok(());
            }
        };
        self.sink.send(log_msg::MSG_LOG_USED_SIZE_CHANGED, &payload)
    }
}

impl<B, M> LogService<B, M>
where
    B: LogBackend,
    B::List: Send + 'static,
    M: ModuleLoader,
{
    /// Handle one IPC request.
    ///
    /// Returns the response tag and JSON payload. Device and permission
    /// failures are reported inside the payload; only unknown tags, malformed
    /// requests and encoding failures are returned as errors.
    pub fn handle_message(
        &self,
        caller: &CallerContext,
        tag: u32,
        payload: &[u8],
    ) -> ServiceResult<(u32, Vec<u8>)> {
        debug!(
            "LogService: Received message tag 0x{:x} from PID {}",
            tag, caller.pid
        );

        let payload = match tag {
            log_msg::MSG_LOG_FLUSH => encode(&FlushResponse {
                result: self.flush_log(caller),
            })?,
            log_msg::MSG_LOG_GET_TOTAL_SIZE => encode(&SizeResponse {
                result: self.total_log_size(),
            })?,
            log_msg::MSG_LOG_GET_USED_SIZE => encode(&SizeResponse {
                result: self.used_log_size(),
            })?,
            log_msg::MSG_LOG_DUMP => {
                let request: DumpRequest = if payload.is_empty() {
                    DumpRequest::default()
                } else {
                    decode(payload)?
                };
                let args: Vec<&str> = request.args.iter().map(String::as_str).collect();
                encode(&DumpResponse {
                    output: self.dump(caller, &args),
                })?
            }
            _ => return Err(ServiceError::UnknownMessage(tag)),
        };
        Ok((response_tag(tag), payload))
    }
}

fn encode<T: Serialize>(value: &T) -> ServiceResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| ServiceError::Serialization(e.to_string()))
}

fn decode<'a, T: Deserialize<'a>>(data: &'a [u8]) -> ServiceResult<T> {
    serde_json::from_slice(data).map_err(|e| ServiceError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::permissions::Permission;
    use crate::service::PollOutcome;
    use logbuf_hal::{LogError, LogId, LogSession, MemoryLogBackend};
    use spin::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<(u32, Vec<u8>)>>>,
        closed: bool,
    }

    impl MessageSink for RecordingSink {
        fn send(&self, tag: u32, payload: &[u8]) -> Result<(), ListenerGone> {
            if self.closed {
                return Err(ListenerGone);
            }
            self.sent.lock().push((tag, payload.to_vec()));
            Ok(())
        }
    }

    fn service() -> LogService<MemoryLogBackend> {
        LogService::new(
            LogSession::new(MemoryLogBackend::new()),
            ServiceConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_size_requests() {
        let service = service();
        service.session().backend().set_capacity(LogId::Main, 65536);
        let caller = CallerContext::application(7, 10_007);

        let (tag, payload) = service
            .handle_message(&caller, log_msg::MSG_LOG_GET_TOTAL_SIZE, &[])
            .unwrap();
        assert_eq!(tag, log_msg::MSG_LOG_GET_TOTAL_SIZE_RESPONSE);
        let response: SizeResponse = serde_json::from_slice(&payload).unwrap();
        assert_eq!(response.result, Ok(65536));

        let (tag, payload) = service
            .handle_message(&caller, log_msg::MSG_LOG_GET_USED_SIZE, &[])
            .unwrap();
        assert_eq!(tag, log_msg::MSG_LOG_GET_USED_SIZE_RESPONSE);
        let response: SizeResponse = serde_json::from_slice(&payload).unwrap();
        assert_eq!(response.result, Ok(0));
    }

    #[test]
    fn test_flush_denied_in_payload() {
        let service = service();
        let caller = CallerContext::application(7, 10_007);

        let (tag, payload) = service
            .handle_message(&caller, log_msg::MSG_LOG_FLUSH, &[])
            .unwrap();
        assert_eq!(tag, log_msg::MSG_LOG_FLUSH_RESPONSE);
        let response: FlushResponse = serde_json::from_slice(&payload).unwrap();
        assert_eq!(
            response.result,
            Err(ServiceError::PermissionDenied {
                permission: Permission::FlushLog
            })
        );
    }

    #[test]
    fn test_not_initialized_in_payload() {
        let service = service();
        service.close().unwrap();

        let (_, payload) = service
            .handle_message(&CallerContext::system(1), log_msg::MSG_LOG_GET_USED_SIZE, &[])
            .unwrap();
        let response: SizeResponse = serde_json::from_slice(&payload).unwrap();
        assert_eq!(
            response.result,
            Err(ServiceError::Device(LogError::NotInitialized))
        );
    }

    #[test]
    fn test_dump_request() {
        let service = service();
        let request = serde_json::to_vec(&DumpRequest {
            args: vec![String::from("listeners")],
        })
        .unwrap();

        let (tag, payload) = service
            .handle_message(&CallerContext::system(1), log_msg::MSG_LOG_DUMP, &request)
            .unwrap();
        assert_eq!(tag, log_msg::MSG_LOG_DUMP_RESPONSE);
        let response: DumpResponse = serde_json::from_slice(&payload).unwrap();
        assert_eq!(response.output, "0\n");
    }

    #[test]
    fn test_malformed_dump_request() {
        let service = service();
        let result = service.handle_message(&CallerContext::system(1), log_msg::MSG_LOG_DUMP, b"{");
        assert!(matches!(result, Err(ServiceError::Serialization(_))));
    }

    #[test]
    fn test_unknown_tag() {
        let service = service();
        assert_eq!(
            service.handle_message(&CallerContext::system(1), 0x1234, &[]),
            Err(ServiceError::UnknownMessage(0x1234))
        );
    }

    #[test]
    fn test_ipc_listener_sends_used_size_changed() {
        let service = service();
        let sink = RecordingSink::default();
        service.register(Arc::new(IpcListener::new(sink.clone())));

        let written = service.session().backend().write(LogId::Main, b"boot").unwrap();
        service.poll();

        let sent = sink.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, log_msg::MSG_LOG_USED_SIZE_CHANGED);
        let notification: UsedSizeChanged = serde_json::from_slice(&sent[0].1).unwrap();
        assert_eq!(notification.used_log_size, written);
    }

    #[test]
    fn test_ipc_listener_with_closed_endpoint_is_dropped() {
        let service = service();
        let sink = RecordingSink {
            closed: true,
            ..RecordingSink::default()
        };
        service.register(Arc::new(IpcListener::new(sink)));

        service.session().backend().write(LogId::Main, b"x").unwrap();
        assert!(matches!(
            service.poll(),
            PollOutcome::Changed {
                notified: 0,
                dropped: 1,
                ..
            }
        ));
        assert_eq!(service.listener_count(), 0);
    }
}
