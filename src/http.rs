// Puts an `OracleServer` behind HTTP so the attack can be run against a
// remote padding oracle.
//
//   GET /padding-mode              -> the declared padding mode, e.g. "PKCS7"
//   GET /oracle?candidate=<hex>    -> 200 valid padding, 500 invalid padding
use crate::{OracleServer, PaddingMode, PaddingOracle, Result};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::{error, info};
use tokio::net::{TcpListener, ToSocketAddrs};

use std::{collections::HashMap, sync::Arc};

/// Serves `oracle` on `address` from a background task and returns the base
/// URL it is reachable at.
pub async fn spawn_server(address: impl ToSocketAddrs, oracle: Arc<OracleServer>) -> Result<String> {
    let app = Router::new()
        .route("/padding-mode", get(padding_mode))
        .route("/oracle", get(check_padding))
        .with_state(oracle);
    let listener = TcpListener::bind(address).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("oracle server stopped: {e}");
        }
    });
    info!("padding oracle listening on {addr}");
    Ok(format!("http://{}", addr))
}

async fn padding_mode(State(oracle): State<Arc<OracleServer>>) -> String {
    oracle.padding_mode().to_string()
}

async fn check_padding(
    State(oracle): State<Arc<OracleServer>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let candidate = match params.get("candidate") {
        Some(c) => match hex::decode(c) {
            Ok(c) => c,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, format!("Illegal candidate: {}", e))
                    .into_response()
            }
        },
        None => return (StatusCode::BAD_REQUEST, "Missing 'candidate' parameter").into_response(),
    };

    // The oracle sleeps to simulate a slow service.
    let valid = tokio::task::spawn_blocking(move || oracle.is_padding_correct(&candidate)).await;
    match valid {
        Ok(true) => (StatusCode::OK, "Padding is valid").into_response(),
        Ok(false) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid padding").into_response(),
        Err(e) => {
            error!("padding check panicked: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid padding").into_response()
        }
    }
}

/// Client side of [`spawn_server`].
///
/// Must not be created or used from within an async runtime; queries are
/// sent with reqwest's blocking client.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::blocking::Client,
    base_url: String,
    padding_mode: PaddingMode,
}

impl HttpOracle {
    pub fn connect(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();
        let padding_mode: PaddingMode = client
            .get(format!("{}/padding-mode", base_url))
            .send()?
            .error_for_status()?
            .text()?
            .trim()
            .parse()?;
        info!("connected to {base_url}, padding mode {padding_mode}");
        Ok(Self {
            client,
            base_url,
            padding_mode,
        })
    }
}

impl PaddingOracle for HttpOracle {
    fn padding_mode(&self) -> PaddingMode {
        self.padding_mode
    }

    fn is_padding_correct(&self, candidate: &[u8]) -> bool {
        let response = self
            .client
            .get(format!("{}/oracle", self.base_url))
            .query(&[("candidate", hex::encode(candidate))])
            .send();
        match response {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                error!("padding query failed: {e}");
                false
            }
        }
    }
}
