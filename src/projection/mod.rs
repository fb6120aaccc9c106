//! Loan amortization and cash-flow projection

mod amortization;
mod cashflows;
mod projector;

pub use amortization::{Amortization, AmortizationYear};
pub use cashflows::{cash_flow_amounts, CashFlowEntry};
pub use projector::{CashFlowProjection, CashFlowProjector, ProjectionInputs};
