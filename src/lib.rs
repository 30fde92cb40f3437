//! # closet-kit
//!
//! The client-side pieces of a wardrobe app that carry real invariants:
//! shrinking photos before upload and translating weather ratings between the
//! backend's scale and the app's.
//!
//! # Architecture
//!
//! ```text
//! photo bytes ─▶ upload::prepare_image_data ─▶ imaging::ImageCompressor ─▶ base64
//!                                                       │
//!                                          ImageBackend (RustBackend)
//!
//! backend JSON ─▶ payload (AI scale) ⇄ rating ⇄ ClothingForm (UI scale)
//! ```
//!
//! Both leaves are independent: [`imaging`] knows nothing about ratings and
//! [`rating`] is plain arithmetic. [`upload`] and [`payload`] sit on top and
//! model the boundary with the backend, which is not part of this crate.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Async decode → fit → re-encode → base64 pipeline, size helpers |
//! | [`rating`] | AI (-2..2) ⇄ UI (1..5) conversion with clamping |
//! | [`payload`] | Request/response shapes, categories, data URLs |
//! | [`upload`] | Threshold check, compression, fallback to the original |
//! | [`config`] | `closet.toml` loading, merging, and validation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## One Rating Formula
//!
//! Ratings convert with `clamp(ai + 3, 1, 5)` and `clamp(ui - 3, -2, 2)`.
//! A rescaling variant `round((ai + 2) / 4 * 4) + 1` agrees on integers but
//! diverges on fractional input; it is deliberately not offered. Fractional
//! scores from the backend are rounded once, at deserialization.
//!
//! ## Errors Are Terminal, Fallback Is the Caller's
//!
//! [`imaging::ImageCompressor::compress`] never retries. It reports
//! [`imaging::CompressError::Decode`] or [`imaging::CompressError::Encode`]
//! and leaves the choice to the caller; [`upload::prepare_image_data`] is the
//! caller that falls back to the original bytes.
//!
//! ## EXIF Orientation
//!
//! Orientation tags are neither applied nor copied. Re-encoding drops all
//! metadata, so a sideways phone photo stays sideways.

pub mod config;
pub mod imaging;
pub mod output;
pub mod payload;
pub mod rating;
pub mod upload;
