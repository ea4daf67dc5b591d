pub mod engine;
pub mod gate;

pub use engine::{EngineError, EngineState, Mode, TailEngine};
pub use gate::RenderGate;
