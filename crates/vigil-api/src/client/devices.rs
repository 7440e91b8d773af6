// Guard service device endpoints
//
// Device listing, PIN validation, disarm, and PIN rotation.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::GuardClient;
use crate::error::Error;
use crate::models::{
    AddDeviceRequest, DeviceRecord, DisarmRequest, PasswordChangeRequest, PinChangeRequest,
    PinCheckRequest, PinCheckResponse, StatusResponse,
};

impl GuardClient {
    /// List devices registered to the authenticated account.
    ///
    /// `GET /devices/`
    pub async fn list_devices(&self, token: &SecretString) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.api_url("devices/")?;
        debug!("listing devices");
        self.get(url, Some(token)).await
    }

    /// Claim a provisioned device for the authenticated account.
    ///
    /// `POST /devices/` — 400 when no device with this key has been
    /// provisioned; claiming an already-owned device is idempotent.
    pub async fn add_device(
        &self,
        token: &SecretString,
        unique_key: &str,
    ) -> Result<DeviceRecord, Error> {
        let url = self.api_url("devices/")?;
        debug!(unique_key, "claiming device");
        self.post(url, &AddDeviceRequest { unique_key }, Some(token)).await
    }

    /// Validate a PIN for a device.
    ///
    /// `POST /devices/check_pin` — no bearer token: the keypad on the
    /// device itself submits this. `pin_valid` is `false` when the PIN
    /// is wrong.
    pub async fn check_pin(
        &self,
        pin_code: &SecretString,
        unique_key: &str,
    ) -> Result<PinCheckResponse, Error> {
        let url = self.api_url("devices/check_pin")?;
        debug!(unique_key, "validating PIN");
        self.post(
            url,
            &PinCheckRequest {
                pin_code: pin_code.expose_secret(),
                unique_key,
            },
            None,
        )
        .await
    }

    /// Disarm a device on behalf of the authenticated account.
    ///
    /// `POST /devices/disarm` — the service records a successful
    /// pin-check event and returns `{"pin_valid": true}`.
    pub async fn disarm(
        &self,
        token: &SecretString,
        unique_key: &str,
    ) -> Result<PinCheckResponse, Error> {
        let url = self.api_url("devices/disarm")?;
        debug!(unique_key, "disarming device");
        self.post(url, &DisarmRequest { unique_key }, Some(token)).await
    }

    /// Rotate a device PIN.
    ///
    /// `POST /devices/change_pin` — 400 when the old PIN doesn't match.
    pub async fn change_pin(
        &self,
        token: &SecretString,
        unique_key: &str,
        old_pin: &SecretString,
        new_pin: &SecretString,
    ) -> Result<StatusResponse, Error> {
        let url = self.api_url("devices/change_pin")?;
        debug!(unique_key, "changing device PIN");
        self.post(
            url,
            &PinChangeRequest {
                unique_key,
                old_pin: old_pin.expose_secret(),
                new_pin: new_pin.expose_secret(),
            },
            Some(token),
        )
        .await
    }

    /// Rotate a device password.
    ///
    /// `POST /devices/change_password` — 400 when the old password
    /// doesn't match.
    pub async fn change_device_password(
        &self,
        token: &SecretString,
        unique_key: &str,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<StatusResponse, Error> {
        let url = self.api_url("devices/change_password")?;
        debug!(unique_key, "changing device password");
        self.post(
            url,
            &PasswordChangeRequest {
                unique_key,
                old_password: old_password.expose_secret(),
                new_password: new_password.expose_secret(),
            },
            Some(token),
        )
        .await
    }
}
