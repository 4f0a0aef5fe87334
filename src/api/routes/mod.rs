//! API Routes
//!
//! Route handlers organized by functionality.

pub mod correlations;
pub mod health;
pub mod members;
pub mod overview;
