use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, Request, header};
use hyper_util::rt::TokioIo;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use thiserror::Error;
use tokio::{net::TcpStream, time::timeout};

use crate::protocol::{ComputeRequest, ComputeResponse, GenerateRequest, GenerateResponse};
use crate::{log_debug, log_warn};

/// Path the solver service answers pathfinding requests on.
const COMPUTE_PATH: &str = "/pathfinding";
/// Path the solver service answers maze-generation requests on.
const GENERATE_PATH: &str = "/maze";

/// Failures of one remote invocation. All of these are recoverable: the
/// caller surfaces them and leaves the board exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("request to the solver service timed out")]
    Timeout,
    #[error("solver service unreachable: {0}")]
    Remote(String),
    #[error("solver service returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// HTTP client for the remote solver/generator service.
///
/// Requests carry their JSON payload URL-encoded in a `json` query
/// parameter, the contract the solver service exposes. The whole
/// invocation (connect, send, read) runs under one bounded deadline; the
/// service is interactive, so the default timeout is sub-second.
///
/// The UI allows one logical invocation at a time, but nothing here aborts
/// a superseded call: its eventual result is simply dropped by the caller.
#[derive(Debug, Clone)]
pub struct SolverClient {
    server_addr: String,
    timeout: Duration,
}

impl SolverClient {
    pub fn new(server_addr: impl Into<String>, timeout: Duration) -> Self {
        SolverClient {
            server_addr: server_addr.into(),
            timeout,
        }
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// Runs the pathfinding algorithm named in the request and returns the
    /// validated step/solution sequences.
    pub async fn compute(&self, request: &ComputeRequest) -> Result<ComputeResponse, ClientError> {
        let body = self.invoke(COMPUTE_PATH, request).await?;
        let response: ComputeResponse = serde_json::from_slice(&body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        response
            .validate(request.rows, request.columns)
            .map_err(ClientError::InvalidResponse)?;
        log_debug!(
            "compute returned {} steps, solution: {}",
            response.steps.len(),
            response.solution.is_some()
        );
        Ok(response)
    }

    /// Asks the service for a generated maze of the given dimensions.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ClientError> {
        let body = self.invoke(GENERATE_PATH, request).await?;
        let response: GenerateResponse = serde_json::from_slice(&body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        response
            .validate(request.rows, request.columns)
            .map_err(ClientError::InvalidResponse)?;
        log_debug!("generate returned {} walls", response.walls.len());
        Ok(response)
    }

    async fn invoke<T: Serialize>(&self, path: &str, payload: &T) -> Result<Bytes, ClientError> {
        let json = serde_json::to_string(payload)
            .map_err(|err| ClientError::Remote(format!("could not encode request: {err}")))?;
        let encoded = utf8_percent_encode(&json, NON_ALPHANUMERIC);
        let uri = format!("{path}?json={encoded}");

        match timeout(self.timeout, self.fetch(uri)).await {
            Ok(result) => result,
            Err(_) => {
                log_warn!("request to {} timed out after {:?}", self.server_addr, self.timeout);
                Err(ClientError::Timeout)
            }
        }
    }

    async fn fetch(&self, uri: String) -> Result<Bytes, ClientError> {
        let stream = TcpStream::connect(&self.server_addr)
            .await
            .map_err(|err| ClientError::Remote(err.to_string()))?;
        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|err| ClientError::Remote(err.to_string()))?;

        // The connection task outlives the request future; errors after the
        // response body completed are uninteresting.
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                log_debug!("solver connection closed: {err}");
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::HOST, self.server_addr.clone())
            .body(Empty::<Bytes>::new())
            .map_err(|err| ClientError::Remote(err.to_string()))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|err| ClientError::Remote(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Remote(format!("server answered {status}")));
        }

        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|err| ClientError::Remote(err.to_string()))?;
        Ok(collected.to_bytes())
    }
}
