// SPDX-License-Identifier: MIT

//! Structured logging for the engine, following the teacher crate's pattern:
//! one message struct per loggable event, `Display` for the human-readable
//! line, and a [`messages::StructuredLog`] trait for field-rich `log()` and
//! `span()` emission. Organized by subsystem so call sites import only what
//! they need.

pub mod messages;
