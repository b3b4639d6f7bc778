//! adapter-pdf - client for the remote offer PDF generator
//!
//! The generator is a single HTTP function: it receives the serialized offer,
//! persists the offer record, renders the PDF and answers with its location.

pub mod client;

pub use client::{FALLBACK_ERROR, PdfGeneratorClient};
