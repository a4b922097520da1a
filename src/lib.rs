//! Riskchat - grounded LLM assistant orchestrator for procurement risk dashboards
//!
//! This library turns a client-held chat history plus a snapshot of top-risk
//! procurement lots into a single grounded generation request, submits it
//! against a prioritized list of provider model endpoints with fallback on
//! endpoint unavailability, and maps the outcome to one caller-facing reply.

pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod provider;
pub mod telemetry;
