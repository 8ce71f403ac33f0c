// Scoped hold on the shared sensors: both channels are acquired when the lease is
// taken and released exactly once when it is dropped, whichever way the search ends.

use std::sync::Arc;

use log::debug;

use super::{SensorChannel, SensorHub};

/// RAII hold on the distance and color channels of a shared sensor hub.
pub struct SensorLease<S: SensorHub + ?Sized> {
    hub: Arc<S>,
}

impl<S: SensorHub + ?Sized> SensorLease<S> {
    /// Takes both channels; they are given back on drop.
    pub fn acquire(hub: Arc<S>) -> Self {
        hub.acquire(SensorChannel::Color);
        hub.acquire(SensorChannel::Distance);
        debug!("Sensor lease acquired");

        SensorLease { hub }
    }
}

impl<S: SensorHub + ?Sized> Drop for SensorLease<S> {
    fn drop(&mut self) {
        self.hub.release(SensorChannel::Color);
        self.hub.release(SensorChannel::Distance);
        debug!("Sensor lease released");
    }
}
