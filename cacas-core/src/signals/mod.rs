//! Signal-level analysis: multi-timeframe convergence.

pub mod convergence;

pub use convergence::{
    classify, classify_latest, ConvergenceRecord, ConvergenceStatus, ConvergenceType,
};
