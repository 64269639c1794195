//! Clock port - cooperative delays
//!
//! Used for ADC settling, input polling backoff and the startup wait.

/// Port for suspending the calibration loop
pub trait Clock {
    /// Wait for `ms` milliseconds
    ///
    /// On an async executor this yields to other tasks; on a host it may
    /// simply sleep the thread.
    fn delay_ms(&mut self, ms: u32) -> impl core::future::Future<Output = ()>;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn delay_ms(&mut self, ms: u32) -> impl core::future::Future<Output = ()> {
        (**self).delay_ms(ms)
    }
}
