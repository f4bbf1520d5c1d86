use crate::configuration::{Configuration, ConfigurationUpdate};
use crate::error::InvalidConfiguration;
use crate::mock_server::connection::AbortSignal;
use crate::responder::{MockResponder, Plan};
use crate::response_template::ResponseTemplate;
use crate::store::ConfigurationStore;
use crate::Request;
use http::{Method, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use log::{debug, info};
use serde::Serialize;
use std::net::SocketAddr;

const MOCK_ENDPOINT: &str = "/api";
const CONFIG_ENDPOINT: &str = "/config";

/// Dispatches incoming requests to the mock endpoint or to the control channel.
#[derive(Clone, Debug)]
pub(super) struct Router {
    store: ConfigurationStore,
    responder: MockResponder,
}

#[derive(Serialize)]
struct ConfigurationUpdated {
    message: &'static str,
    config: Configuration,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    message: &'a str,
}

impl Router {
    pub(super) fn new(store: ConfigurationStore) -> Self {
        Self {
            responder: MockResponder::new(store.clone()),
            store,
        }
    }

    /// Handle one request.
    ///
    /// Never resolves for requests to a hanging mock endpoint or whose connection is aborted.
    pub(super) async fn handle(
        &self,
        request: hyper::Request<Incoming>,
        peer: Option<SocketAddr>,
        abort: &AbortSignal,
    ) -> Response<Full<Bytes>> {
        let (parts, body) = request.into_parts();
        let request = Request::from_parts(&parts, peer);
        let route = request.path.strip_suffix('/').unwrap_or(&request.path);

        match (route, &request.method) {
            (MOCK_ENDPOINT, _) => self.mock_endpoint(&request, body, abort).await,
            (CONFIG_ENDPOINT, &Method::GET) => {
                ResponseTemplate::json(StatusCode::OK, &self.store.get()).generate_response()
            }
            (CONFIG_ENDPOINT, &Method::POST) => self.update_configuration(body).await,
            (CONFIG_ENDPOINT, &Method::OPTIONS) => {
                ResponseTemplate::new(StatusCode::NO_CONTENT).generate_response()
            }
            _ => {
                debug!("No route for {}", request);
                not_found(&request)
            }
        }
    }

    async fn mock_endpoint(
        &self,
        request: &Request,
        body: Incoming,
        abort: &AbortSignal,
    ) -> Response<Full<Bytes>> {
        match self.responder.respond(request) {
            Plan::Hang => futures::future::pending().await,
            Plan::Abort { drain_body } => {
                if drain_body {
                    if let Err(e) = body.collect().await {
                        debug!("Failed to drain the request body before resetting: {}", e);
                    }
                }
                abort.trigger();
                // The connection task drops this future together with the connection.
                futures::future::pending().await
            }
            Plan::Reply { delay, template } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                template.generate_response()
            }
        }
    }

    async fn update_configuration(&self, body: Incoming) -> Response<Full<Bytes>> {
        let update = match body.collect().await {
            Ok(body) => ConfigurationUpdate::from_json(&body.to_bytes()),
            Err(e) => {
                debug!("Failed to read a configuration update: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "BadRequest",
                    None,
                    "failed to read the request body",
                );
            }
        };

        match update {
            Ok(update) => {
                let config = self.store.update(update);
                ResponseTemplate::json(
                    StatusCode::OK,
                    &ConfigurationUpdated {
                        message: "Configuration updated",
                        config,
                    },
                )
                .generate_response()
            }
            Err(e) => {
                info!("Rejected configuration update: {}", e);
                invalid_configuration(&e)
            }
        }
    }
}

fn invalid_configuration(e: &InvalidConfiguration) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::BAD_REQUEST,
        "InvalidConfiguration",
        Some(e.field()),
        &e.to_string(),
    )
}

fn not_found(request: &Request) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::NOT_FOUND,
        "NotFound",
        None,
        &format!("no route for {} {}", request.method, request.path),
    )
}

fn error_response(
    status_code: StatusCode,
    error: &'static str,
    field: Option<&'static str>,
    message: &str,
) -> Response<Full<Bytes>> {
    ResponseTemplate::json(
        status_code,
        &ErrorBody {
            error,
            field,
            message,
        },
    )
    .generate_response()
}
