//! uqlca: probabilistic life cycle assessment of road designs
//!
//! Propagates emission factor uncertainty through the A1-A5 stages of road
//! pavement layers by Monte Carlo simulation, and summarizes the resulting
//! GWP distributions per design option.

pub mod cli;
pub mod core;
pub mod entities;
