//! Capability interface a byte transport offers to the receiver.
//!
//! A transport owns physical reception and a periodic timer. It calls
//! [`ReceiverHandle::deliver`] with every chunk of received bytes and
//! [`ReceiverHandle::tick`] once per timer period. Both calls must be
//! serialized with respect to each other.

use super::driver::ReceiverHandle;
use crate::error::TransportError;

/// Callback registration offered by a transport
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Register `receiver` for the periodic supervisor tick
    fn register_tick(&mut self, receiver: ReceiverHandle) -> Result<(), TransportError>;

    /// Remove the tick registration made by `register_tick`
    fn unregister_tick(&mut self);

    /// Route received bytes to `receiver`
    fn bind_rx(&mut self, receiver: ReceiverHandle) -> Result<(), TransportError>;
}
