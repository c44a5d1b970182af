//! # acme-dns01
//!
//! Verifies ACME DNS-01 challenges: checks that the TXT record at
//! `_acme-challenge.<domain>` carries the expected key authorization digest.
//!
//! Run it before asking a CA to validate a challenge to catch missing or
//! stale records early.
//!
//! ```rust,ignore
//! use acme_dns01::Dns01Verifier;
//!
//! let verifier = Dns01Verifier::default();
//! verifier
//!     .verify_challenge("example.com", "LoqXcYV8q5ONbJQxbmR7SCTNo3tiAXDfowyjxAjEuX0")
//!     .await?;
//! ```
//!
//! The lookup itself goes through a [`TxtResolver`]. The default is a
//! process-wide [`HickoryTxtResolver`]; tests and embedders can inject their
//! own implementation.

#![doc(html_root_url = "https://docs.rs/acme-dns01/0.1.0")]

pub mod error;
pub mod hickory;
pub mod resolver;
pub mod verifier;

pub use error::{Result, VerifyError};
pub use hickory::{default_resolver, HickoryTxtResolver, ResolverSettings};
pub use resolver::{ResolverError, TxtRecord, TxtResolver};
pub use verifier::{challenge_record_name, Dns01Verifier, VerificationRequest, CHALLENGE_LABEL};
