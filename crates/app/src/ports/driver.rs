//! Device driver port: brand/model specific access to physical devices.
//!
//! The core never speaks any device protocol itself. A driver dispatcher
//! knows, per `(brand, model)`, how to read and write a device's status and
//! reports changes that originate on the device side.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;

use minionhub_domain::device_kind::DeviceKind;
use minionhub_domain::error::DriverError;
use minionhub_domain::minion::Minion;
use minionhub_domain::status::MinionStatus;

/// A status change pushed by a physical device.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub mac: String,
    pub status: MinionStatus,
}

/// Dispatcher reading and writing physical device status.
pub trait DeviceDriver {
    /// Static capability table of every supported `(brand, model)`.
    fn device_kinds(&self) -> &[DeviceKind];

    /// Read the live status of the device backing `minion`.
    fn get_status(
        &self,
        minion: &Minion,
    ) -> impl Future<Output = Result<MinionStatus, DriverError>> + Send;

    /// Apply `status` to the device backing `minion`.
    fn set_status(
        &self,
        minion: &Minion,
        status: MinionStatus,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Subscribe to device-originated status changes.
    fn subscribe_status_changes(&self) -> broadcast::Receiver<StatusChange>;
}

impl<T: DeviceDriver + Send + Sync> DeviceDriver for Arc<T> {
    fn device_kinds(&self) -> &[DeviceKind] {
        (**self).device_kinds()
    }

    fn get_status(
        &self,
        minion: &Minion,
    ) -> impl Future<Output = Result<MinionStatus, DriverError>> + Send {
        (**self).get_status(minion)
    }

    fn set_status(
        &self,
        minion: &Minion,
        status: MinionStatus,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        (**self).set_status(minion, status)
    }

    fn subscribe_status_changes(&self) -> broadcast::Receiver<StatusChange> {
        (**self).subscribe_status_changes()
    }
}
