//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP and push adapters decoupled from storage details.

pub mod attendance_service;
