//! Test utilities for semcache integration tests
//!
//! - mocks: call-counting store, query engine, dependency-links validator and
//!   cache backend
//! - fixture: logging setup and commonly used subjects

#![allow(dead_code)]

pub mod fixture;
pub mod mocks;
