//! Return metrics over a yearly cash-flow series: IRR, NPV and payback

mod irr;
mod npv;
mod payback;

pub use irr::{solve_irr, IrrConfig, IrrMethod, IrrSolution};
pub use npv::{npv, reference_npv, REFERENCE_DISCOUNT_RATE};
pub use payback::{payback_period, PaybackPeriod};
