//! Packet source implementations

pub mod simulated;
pub mod udp;

pub use simulated::SimulatedSource;
pub use udp::UdpSource;
