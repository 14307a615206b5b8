//! Typed schemas for transcripts and the four signal extraction layers.
//!
//! Mirrors the contract between the extraction orchestrator and the
//! evaluation engine: every structure here is schema-validated before the
//! engine sees it, so the engine trusts types and numeric ranges but not
//! semantic correctness.

pub mod behavioral;
pub mod extraction;
pub mod multimodal;
pub mod psychographic;
pub mod surface;
pub mod transcript;

pub use behavioral::BehavioralSignals;
pub use extraction::ExtractionResult;
pub use multimodal::MultimodalSignals;
pub use psychographic::PsychographicSignals;
pub use surface::SurfaceSignals;
pub use transcript::{CallMetadata, Transcript, Utterance};
