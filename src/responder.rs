use crate::configuration::{Configuration, NetworkFault};
use crate::response_template::ResponseTemplate;
use crate::store::ConfigurationStore;
use crate::Request;
use http::StatusCode;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The JSON body returned by the mock endpoint when no network fault is configured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// `"success"` for a `2xx` status code, `"error"` otherwise.
    pub status: String,
    pub code: i64,
    pub delay: u64,
    pub network_error: NetworkFault,
    pub message: String,
    pub timestamp: String,
    pub method: String,
    pub path: String,
}

impl ResponseEnvelope {
    pub(crate) fn new(request: &Request, snapshot: &Configuration) -> Self {
        let status = if snapshot.is_success() {
            "success"
        } else {
            "error"
        };
        let message = if snapshot.delay_millis > 0 {
            format!(
                "Response with status {} after {}ms delay",
                snapshot.status_code, snapshot.delay_millis
            )
        } else {
            format!("Response with status {}", snapshot.status_code)
        };
        Self {
            status: status.to_owned(),
            code: snapshot.status_code,
            delay: snapshot.delay_millis,
            network_error: snapshot.network_fault,
            message,
            timestamp: request.timestamp(),
            method: request.method.to_string(),
            path: request.path.clone(),
        }
    }
}

/// What the server has to do with a request to the mock endpoint.
#[derive(Debug)]
pub(crate) enum Plan {
    /// Never answer. The request stays parked until the peer goes away.
    Hang,
    /// Kill the connection with a TCP RST.
    /// `drain_body` tells whether the request body is consumed first.
    Abort { drain_body: bool },
    /// Wait for `delay`, if any, then send `template`.
    Reply {
        delay: Option<Duration>,
        template: ResponseTemplate,
    },
}

/// Maps the current [`Configuration`] to the behaviour of the mock endpoint.
#[derive(Clone, Debug)]
pub(crate) struct MockResponder {
    store: ConfigurationStore,
}

impl MockResponder {
    pub(crate) fn new(store: ConfigurationStore) -> Self {
        Self { store }
    }

    /// Read the configuration snapshot for `request` and decide how to treat it.
    ///
    /// The snapshot is read exactly once: later configuration changes do not affect a
    /// request that is already being handled.
    pub(crate) fn respond(&self, request: &Request) -> Plan {
        let snapshot = self.store.get();
        info!("Incoming API call at {}: {}", request.timestamp(), request);
        info!("Current configuration: {}", snapshot);
        plan(request, &snapshot)
    }
}

fn plan(request: &Request, snapshot: &Configuration) -> Plan {
    match snapshot.network_fault {
        NetworkFault::Timeout => {
            info!("Simulating a timeout: no response will be sent");
            Plan::Hang
        }
        NetworkFault::Reset => {
            info!("Simulating a connection reset");
            Plan::Abort { drain_body: true }
        }
        NetworkFault::Refuse => {
            info!("Simulating a refused connection");
            Plan::Abort { drain_body: false }
        }
        NetworkFault::None => {
            let delay = (snapshot.delay_millis > 0).then(|| snapshot.delay());
            let envelope = ResponseEnvelope::new(request, snapshot);
            let status_code = u16::try_from(snapshot.status_code)
                .ok()
                .and_then(|code| StatusCode::from_u16(code).ok())
                // hyper refuses to send a 1xx as the final response.
                .filter(|code| !code.is_informational())
                .unwrap_or_else(|| {
                    warn!(
                        "Status code {} cannot be sent over HTTP, replying with 500 instead",
                        snapshot.status_code
                    );
                    StatusCode::INTERNAL_SERVER_ERROR
                });
            let template = ResponseTemplate::json(status_code, &envelope);
            info!(
                "Sending a {} response{}",
                template.status_code().as_u16(),
                delay
                    .map(|d| format!(" after {}ms", d.as_millis()))
                    .unwrap_or_default()
            );
            Plan::Reply { delay, template }
        }
    }
}
