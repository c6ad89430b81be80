//! Structured logging schema and field name constants for canonry.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Run aborted, requires operator attention |
//! | WARN  | Recoverable issue or slow operation |
//! | INFO  | Lifecycle events, stage completions, run summary |
//! | DEBUG | Decision points, intermediate counts, config choices |
//! | TRACE | Per-item iteration (candidates, variants) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "inference", "match", "pipeline", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "ollama", "openai", "index", "augmenter"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "embed_texts", "search_batch", "run"
pub const OPERATION: &str = "op";

/// Pipeline stage currently executing.
/// Values: "loaded", "normalized", "deduplicated", "augmented",
/// "embedded", "matched", "evaluated", "joined"
pub const STAGE: &str = "stage";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of input texts sent to an embedding backend.
pub const INPUT_COUNT: &str = "input_count";

/// Number of results returned by a search or lookup.
pub const RESULT_COUNT: &str = "result_count";

/// Number of reference entities in the similarity corpus.
pub const CORPUS_SIZE: &str = "corpus_size";

/// Number of queries in a search batch.
pub const QUERY_COUNT: &str = "query_count";

/// Number of synthetic variants generated.
pub const VARIANT_COUNT: &str = "variant_count";

/// Top-K candidates requested per query.
pub const TOP_K: &str = "top_k";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for embedding.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
