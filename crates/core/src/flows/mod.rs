pub mod cards;
pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, GuidedFlow, BUDGET_OPTIMIZATION_STEP};
pub use states::{ActionOutcome, FlowContext, GuidedAction};
