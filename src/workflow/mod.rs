pub mod proof_flow;

pub use proof_flow::ProofFlow;
