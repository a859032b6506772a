pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use policy::Strategy;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
