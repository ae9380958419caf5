mod evaluator;
mod session_state;

pub use evaluator::{HeuristicEvaluator, ORPHAN_FLAG_THRESHOLD};
pub use session_state::SessionState;
