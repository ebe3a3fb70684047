//! Bike-share station overseer.
//!
//! Tracks the live state of the V'Lille network and answers: "where is
//! the nearest station with a bike, a free slot, or a ticket terminal?"

pub mod config;
pub mod domain;
pub mod geo;
pub mod refresh;
pub mod stations;
pub mod web;
