//! Weekly school timetable generation.
//!
//! A solve request is normalised into indexed lookups, turned into a binary
//! ILP over (class, subject, teacher, room, day, period) assignments, solved
//! with HiGHS under a time budget, and the accepted schedule is kept in a
//! process-scoped [`store::SolutionStore`] for later queries.

pub mod config;
pub mod data;
pub mod error;
pub mod normalize;
pub mod server;
pub mod service;
pub mod solver;
pub mod store;
pub mod verify;
