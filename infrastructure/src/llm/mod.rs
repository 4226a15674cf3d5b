//! LLM-backed disambiguation
//!
//! Optional adapter for the resolver's semantic tier. The engine works
//! without it; resolution falls back to surfacing the ambiguity.

pub mod advisor;
