// Bridge pairing
//
// The bridge hands out an application key only while its physical link
// button is pressed (a roughly 30 second window). `await_token` polls the
// v1 pairing endpoint until the button press is observed.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::{AppId, AuthToken};
use crate::client::{BridgeClient, preview};
use crate::error::Error;
use crate::models::{LINK_BUTTON_NOT_PRESSED, PairingRequest, PairingResult};

impl BridgeClient {
    /// Ask the bridge for credentials once.
    ///
    /// `POST /api` with `{"devicetype": "...", "generateclientkey": true}`.
    /// Returns [`Error::LinkButtonNotPressed`] if the button has not been
    /// pressed yet.
    pub async fn request_token(&self, app_id: &AppId) -> Result<AuthToken, Error> {
        let url = self.root_url("api")?;
        let device_type = app_id.device_type();
        debug!(device_type = %device_type, "requesting application key at {}", url);

        let resp = self
            .http()
            .post(url)
            .json(&PairingRequest {
                devicetype: &device_type,
                generateclientkey: true,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Bridge {
                message: preview(&body),
                status: status.as_u16(),
            });
        }

        let results: Vec<PairingResult> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        for result in results {
            if let Some(success) = result.success {
                return Ok(AuthToken::new(success.username, success.clientkey));
            }
            if let Some(err) = result.error {
                if err.code == LINK_BUTTON_NOT_PRESSED {
                    return Err(Error::LinkButtonNotPressed);
                }
                return Err(Error::Pairing {
                    code: err.code,
                    description: err.description,
                });
            }
        }

        Err(Error::Deserialization {
            message: "pairing response contained neither success nor error".into(),
            body,
        })
    }

    /// Poll the pairing endpoint until the link button is pressed.
    ///
    /// Retries only on [`Error::LinkButtonNotPressed`]; any other error ends
    /// the wait immediately. Gives up with [`Error::PairingTimeout`] once
    /// `timeout` has elapsed, or [`Error::Cancelled`] when `cancel` fires.
    pub async fn await_token(
        &self,
        app_id: &AppId,
        timeout: Duration,
        poll_interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<AuthToken, Error> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.request_token(app_id).await {
                Ok(token) => {
                    info!("bridge issued application key");
                    return Ok(token);
                }
                Err(Error::LinkButtonNotPressed) => {
                    debug!("link button not pressed yet");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::PairingTimeout {
                    timeout_secs: timeout.as_secs(),
                });
            }
            let wait = poll_interval.min(deadline - now);

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }
    }
}
