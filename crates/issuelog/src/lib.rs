//! Issuelog - project-scoped issue records.
//!
//! This crate holds the request-handling core of the issue tracker: the
//! domain types, the [`storage::IssueStore`] collaborator with its
//! in-memory and JSONL-backed implementations, and the
//! [`resource::IssueResource`] that implements create, list, update and
//! delete for `/api/issues/{project}`.
//!
//! The HTTP binding lives in the `issuelog-server` crate.

#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod id_generation;
pub mod resource;
pub mod storage;
