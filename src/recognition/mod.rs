//! Track recognition via an external audio-recognition service.
//!
//! # Architecture
//!
//! - **Domain** (`domain.rs`) - the raw recognition result and the error
//!   taxonomy the retry policy keys off
//! - **Traits** (`traits.rs`) - the [`RecognitionClient`] seam used by the
//!   pipeline, plus test doubles
//! - **Client** (`client.rs`) - HTTP implementation that uploads a track and
//!   returns the service's JSON answer
//!
//! The recognition algorithm itself lives on the service side; this module
//! only moves bytes and classifies failures.

mod client;
pub mod domain;
pub mod traits;

pub use client::HttpRecognitionClient;
pub use domain::{RecognitionError, RecognitionResult};
pub use traits::RecognitionClient;
