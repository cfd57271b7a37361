//! Types shared between the movie tracking client crates: domain records,
//! wire payloads for the catalog and list services, and API errors.

pub mod domain;
pub mod error;
pub mod protocol;
