// CLIP v2 device endpoints

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{Device, IdentifyAction, IdentifyRequest, ResourceRef};

impl BridgeClient {
    /// List all physical devices known to the bridge (lights, switches,
    /// the bridge itself).
    ///
    /// `GET /clip/v2/resource/device`
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let url = self.resource_url("device")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// Trigger the visual identification sequence (a short blink).
    ///
    /// `PUT /clip/v2/resource/device/{id}` with `{"identify": {"action": "identify"}}`
    pub async fn identify_device(&self, id: &str) -> Result<Vec<ResourceRef>, Error> {
        let url = self.resource_url(&format!("device/{id}"))?;
        debug!(id, "identifying device");
        self.put(
            url,
            &IdentifyRequest {
                identify: IdentifyAction { action: "identify" },
            },
        )
        .await
    }
}
