//! Backend service integrating an e-commerce checkout flow with the HNB
//! Internet Payment Gateway.
//!
//! The bank exchange is redirect-based: a signed form POST carries the
//! purchase to the hosted payment page, and an authenticated callback
//! reports the outcome. See the `gateway` module for the protocol core.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod gateway;
