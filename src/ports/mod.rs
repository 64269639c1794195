//! Ports (interfaces) defining the boundaries of the calibrator
//!
//! Ports are traits that define how the calibration core reaches the outside
//! world. They keep the core independent of any board or transport:
//!
//! - **AnalogSource**: raw ADC conversions (on-chip ADC, simulation)
//! - **TextInput** / **TextOutput**: the operator console (UART, USB CDC, stdio)
//! - **Clock**: cooperative delays (async timer, thread sleep, test clock)

pub mod analog;
pub mod clock;
pub mod text;

pub use analog::AnalogSource;
pub use clock::Clock;
pub use text::{TextInput, TextOutput, MAX_LINE};
