//! adapter-supabase - Supabase adapter
//!
//! Talks to the hosted Supabase project over HTTP:
//! - GoTrue password sign-in, session lookup and sign-out
//! - PostgREST access to the `leads` and `offers` tables
//! - Automatic error mapping to AppError, keeping remote messages verbatim

pub mod auth;
pub mod client;
pub mod error;
pub mod leads;
pub mod offers;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use leads::SupabaseLeadRepository;
pub use offers::SupabaseOfferRepository;
