/// Change-notification capability produced to by the connection handler.
///
/// `on_change` carries no payload: it fires on every successful telemetry
/// decode and on every liveness-loss signal, and the subscriber reads back
/// whatever state it cares about (`current_telemetry`, `is_connected`).
/// A reader may observe a frame newer than the one its notification
/// announced; there is no snapshot consistency between the two.
///
/// Notifications are invoked synchronously from the receive loop, so
/// implementations must not block for long — hand off to your own thread or
/// channel if the reaction is expensive.
pub trait Listener: Send {
    fn on_change(&self);
}

impl<F> Listener for F
where
    F: Fn() + Send,
{
    fn on_change(&self) {
        self()
    }
}
