//! Public transit route planner.
//!
//! Loads a city's stops, lines and timetables, precomputes ride and walking
//! connections between stops, and answers earliest-arrival route queries
//! over HTTP.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod favorites;
pub mod geometry;
pub mod itinerary;
pub mod logging;
pub mod network;
pub mod planner;
pub mod store;
pub mod timetable;
pub mod web;
