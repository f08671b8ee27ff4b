pub mod evaluator;

pub use evaluator::AlertEvaluator;
