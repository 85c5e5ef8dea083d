//! Assignment strategies (§4.8): three ways of turning scheduling-kernel
//! results into committed schedules, all sharing the pair/solver machinery.

pub mod gi;
pub mod osp;
pub mod sba;
pub mod scoring;
pub mod solver;

pub use gi::run_gi;
pub use osp::run_osp;
pub use sba::run_sba;
pub use solver::{AssignmentSolver, GreedySolver, Pair};

#[cfg(feature = "ilp")]
pub use solver::IlpSolver;
