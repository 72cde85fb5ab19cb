pub mod backpressure;
pub mod gate;

pub use backpressure::WorkTokens;
pub use gate::{Admission, AdmissionGate};
