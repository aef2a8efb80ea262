//! Quoting and sheet nesting for sheet-metal planter boxes.
//!
//! A solve derives the panels a box needs, packs them onto stock sheets
//! bought from a limited inventory and prices the result:
//!
//! - [`dimensions`]: outer and liner envelopes
//! - [`blueprint`]: panels to cut
//! - [`candidates`]: single and bundled cuts in placement order
//! - [`inventory`]: stock-sheet ordering
//! - [`solver`]: placement search and the [`Solver`] entry point
//! - [`cost`]: material, labor and surcharge totals

pub mod blueprint;
pub mod candidates;
pub mod cost;
pub mod dimensions;
pub mod error;
pub mod inventory;
pub mod render;
pub mod sheet;
pub mod solver;
pub mod types;

pub use error::{SolveError, SolveResult};
pub use solver::{SolveOptions, Solver};
