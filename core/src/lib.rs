pub mod vdp;

pub use vdp::{StepResult, Vdp, VdpBus};
