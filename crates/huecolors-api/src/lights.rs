// CLIP v2 light endpoints

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{Light, LightUpdate, ResourceRef};

impl BridgeClient {
    /// List every light service on the bridge.
    ///
    /// `GET /clip/v2/resource/light`
    pub async fn list_lights(&self) -> Result<Vec<Light>, Error> {
        let url = self.resource_url("light")?;
        debug!("listing lights");
        self.get(url).await
    }

    /// Fetch a single light, or `None` if the bridge returned no data.
    ///
    /// `GET /clip/v2/resource/light/{id}`
    pub async fn get_light(&self, id: &str) -> Result<Option<Light>, Error> {
        let url = self.resource_url(&format!("light/{id}"))?;
        debug!(id, "fetching light");
        let lights: Vec<Light> = self.get(url).await?;
        Ok(lights.into_iter().next())
    }

    /// Change power, brightness, and/or color of a light.
    ///
    /// `PUT /clip/v2/resource/light/{id}`
    pub async fn update_light(
        &self,
        id: &str,
        update: &LightUpdate,
    ) -> Result<Vec<ResourceRef>, Error> {
        let url = self.resource_url(&format!("light/{id}"))?;
        debug!(id, ?update, "updating light");
        self.put(url, update).await
    }
}
