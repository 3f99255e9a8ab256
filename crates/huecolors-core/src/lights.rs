// ── Light operations ──
//
// Every write goes to the bridge first and to the cache second. There is
// no rollback: if the cache write fails the bridge keeps the new state
// and the next load reconciles.

use futures_util::future::join_all;
use huecolors_api::LightUpdate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::LightInfo;
use crate::palette::{Swatch, assign_swatches};
use crate::session::HueSession;

const MIN_BRIGHTNESS: f32 = 1.0;
const MAX_BRIGHTNESS: f32 = 100.0;

/// Result of pushing a palette to the lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteOutcome {
    pub swatches: usize,
    pub applied: usize,
    pub failed: usize,
}

impl HueSession {
    /// Load lights into the `lights` cell.
    ///
    /// An empty cache is filled from the bridge's light list. Otherwise
    /// each cached light is re-read concurrently and its color and power
    /// refreshed.
    pub async fn load_lights(&self) -> Result<Vec<LightInfo>, CoreError> {
        self.inner.lights.refetch();

        match self.sync_lights().await {
            Ok(lights) => {
                self.inner.lights.succeed(lights.clone());
                self.notify("Loaded lights");
                Ok(lights)
            }
            Err(e) => {
                self.inner.lights.fail(e.to_string());
                Err(self.report("load lights", e))
            }
        }
    }

    async fn sync_lights(&self) -> Result<Vec<LightInfo>, CoreError> {
        let client = self.paired_client().await?;
        let cached = self.inner.cache.lights()?;

        if cached.is_empty() {
            let lights = client.list_lights().await?;
            let infos: Vec<LightInfo> = lights.iter().map(LightInfo::from).collect();
            self.inner.cache.insert_or_update_lights(&infos)?;
            info!(count = infos.len(), "lights listed from bridge");
        } else {
            let client = &client;
            let fetches = cached.iter().map(|light| async move {
                match client.get_light(&light.id).await {
                    Ok(fresh) => Ok(light.refreshed(fresh.as_ref())),
                    Err(e) if e.is_not_found() => {
                        debug!(id = %light.id, "light no longer on bridge");
                        Ok(light.refreshed(None))
                    }
                    Err(e) => Err(CoreError::from(e)),
                }
            });
            let refreshed = join_all(fetches)
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;
            self.inner.cache.insert_or_update_lights(&refreshed)?;
            info!(count = refreshed.len(), "cached lights refreshed");
        }

        self.inner.cache.lights()
    }

    /// Turn a light on or off.
    pub async fn toggle_light(
        &self,
        id: &str,
        power: bool,
    ) -> Result<Option<LightInfo>, CoreError> {
        let result = async {
            let client = self.paired_client().await?;
            client
                .update_light(id, &LightUpdate::new().power(power))
                .await?;

            let Some(light) = self.inner.cache.light(id)? else {
                return Ok(None);
            };
            let updated = LightInfo { power, ..light };
            self.inner.cache.insert_or_update_light(&updated)?;
            Ok::<_, CoreError>(Some(updated))
        }
        .await;

        match result {
            Ok(light) => {
                debug!(id, power, "light toggled");
                self.republish_lights();
                Ok(light)
            }
            Err(e) => Err(self.report("toggle light", e)),
        }
    }

    /// Set brightness (percent, clamped to 1–100). The bridge is only
    /// told while the light is on; the cache always records the value.
    pub async fn set_brightness(&self, id: &str, brightness: f32) -> Result<LightInfo, CoreError> {
        let brightness = brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);

        let result = async {
            let light = self
                .inner
                .cache
                .light(id)?
                .ok_or_else(|| CoreError::LightNotFound {
                    identifier: id.to_owned(),
                })?;

            if light.power {
                let client = self.paired_client().await?;
                client
                    .update_light(id, &LightUpdate::new().brightness(brightness))
                    .await?;
            } else {
                debug!(id, "light is off, brightness cached only");
            }

            let updated = LightInfo { brightness, ..light };
            self.inner.cache.insert_or_update_light(&updated)?;
            Ok::<_, CoreError>(updated)
        }
        .await;

        match result {
            Ok(light) => {
                self.republish_lights();
                Ok(light)
            }
            Err(e) => Err(self.report("set brightness", e)),
        }
    }

    /// Blink the device behind a light. `key` is a cached light id or
    /// v1 id; a key with no cached light is matched against device v1 ids.
    pub async fn identify_light(&self, key: &str) -> Result<(), CoreError> {
        let result = async {
            let client = self.paired_client().await?;
            let light = self.find_light(key)?;
            let devices = client.list_devices().await?;

            let device = devices
                .iter()
                .find(|d| match &light {
                    Some(light) => {
                        d.id == light.owner || d.id_v1.as_deref() == Some(light.v1_id.as_str())
                    }
                    None => d.id_v1.as_deref() == Some(key),
                })
                .ok_or_else(|| CoreError::DeviceNotFound {
                    identifier: key.to_owned(),
                })?;

            client.identify_device(&device.id).await?;
            info!(device = %device.id, name = %device.metadata.name, "identify sent");
            Ok::<_, CoreError>(())
        }
        .await;

        result.map_err(|e| self.report("identify light", e))
    }

    fn find_light(&self, key: &str) -> Result<Option<LightInfo>, CoreError> {
        if let Some(light) = self.inner.cache.light(key)? {
            return Ok(Some(light));
        }
        Ok(self
            .inner
            .cache
            .lights()?
            .into_iter()
            .find(|l| l.v1_id == key))
    }

    /// Color every cached color-capable light from `swatches`, round-robin.
    ///
    /// Lights are updated one at a time. A light the bridge rejects is
    /// logged and skipped; the outcome counts it as failed.
    pub async fn apply_palette(&self, swatches: &[Swatch]) -> Result<PaletteOutcome, CoreError> {
        let result = async {
            let client = self.paired_client().await?;
            let lights = self.inner.cache.hue_lights()?;
            let mut outcome = PaletteOutcome {
                swatches: swatches.len(),
                applied: 0,
                failed: 0,
            };

            for (light, color) in assign_swatches(&lights, swatches) {
                let update = LightUpdate::new().xy(color.to_xy()).power(true);
                if let Err(e) = client.update_light(&light.id, &update).await {
                    warn!(id = %light.id, error = %e, "failed to apply swatch");
                    outcome.failed += 1;
                    continue;
                }

                let updated = LightInfo {
                    color: Some(color),
                    power: true,
                    ..light.clone()
                };
                self.inner.cache.insert_or_update_light(&updated)?;
                debug!(light = %light.v1_id, %color, "swatch applied");
                outcome.applied += 1;
            }
            Ok::<_, CoreError>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => {
                self.republish_lights();
                self.notify(format!("Applied {} swatches", outcome.swatches));
                Ok(outcome)
            }
            Err(e) => Err(self.report("apply palette", e)),
        }
    }

    /// Forget every cached light. The next load lists them from the bridge.
    pub fn clear_lights(&self) -> Result<usize, CoreError> {
        let removed = self
            .inner
            .cache
            .clear_lights()
            .map_err(|e| self.report("clear lights", e))?;
        self.inner.lights.clear();
        info!(removed, "light cache cleared");
        Ok(removed)
    }

    /// Push the cache contents to the `lights` cell after a write.
    fn republish_lights(&self) {
        match self.inner.cache.lights() {
            Ok(lights) => self.inner.lights.succeed(lights),
            Err(e) => warn!(error = %e, "failed to re-read lights"),
        }
    }
}
