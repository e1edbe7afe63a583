// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// This is the heart of the application — pure Rust structs
// and traits that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or video decoding
//   - Only plain structs, enums, and traits (ndarray is the
//     tensor data model, not a framework)
//
// Why keep this layer pure?
//   - Easy to unit test (no GPU, no codecs needed)
//   - Easy to swap implementations (just implement the trait)
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.

// The sampled spatio-temporal tensor for one video clip
pub mod clip;

// Class labels and the capped, order-stable class manifest
pub mod label;

// Core abstractions (traits) that other layers implement
pub mod traits;
