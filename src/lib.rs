//! Course catalog and timetable optimization service.
//!
//! Compiles a lecture pool plus user preferences into a QUBO, samples it
//! with simulated annealing, and serves ranked timetables over an HTTP API.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod solver;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod web;
