//! Core Module - Congestion rules & route orchestration
//!
//! Otak aplikasi: estimasi kemacetan, normalisasi rute, dan rute alternatif.

pub mod congestion;
pub mod navigator;
pub mod requester;

pub use navigator::Navigator;
pub use requester::RouteRequester;
