#![doc = "cloudsquid-core: core logic library for the cloudsquid client."]

//! This crate contains the client contract, wire data models and the
//! extraction workflow for the cloudsquid document-processing API.
//! Transport, configuration and CLI concerns live in the `cloudsquid`
//! binary crate.
//!
//! # Usage
//! Implement [`contract::DocumentApi`] (or use the generated mock) and hand
//! it to [`extract::extract`] together with an [`extract::ExtractionJob`].

pub mod contract;
pub mod error;
pub mod extract;
