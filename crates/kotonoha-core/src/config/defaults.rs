//! Centralized default values
//!
//! Every value here can be overridden through the environment.

/// Defaults for outbound provider calls
pub mod provider {
    /// Per-call bound for a conversion (30 seconds)
    pub const CALL_SECS: f64 = 30.0;

    /// HTTP connect timeout (10 seconds)
    pub const CONNECTION_SECS: u64 = 10;

    /// Completion token ceiling for both providers
    pub const MAX_TOKENS: u32 = 1024;

    /// Sampling temperature for first conversions
    pub const CONVERT_TEMPERATURE: f32 = 0.7;

    /// Sampling temperature for regenerations
    pub const REGENERATE_TEMPERATURE: f32 = 0.9;
}

/// Defaults for admission control
pub mod admission {
    /// Requests admitted per client per window
    pub const MAX_REQUESTS: u32 = 1;

    /// Trailing window length in seconds
    pub const WINDOW_SECS: u64 = 10;
}

/// Defaults for the audit queue
pub mod audit {
    /// Bounded queue capacity between the response path and the writer
    pub const QUEUE_CAPACITY: usize = 256;

    /// Write attempts per record
    pub const WRITE_ATTEMPTS: u8 = 1;

    /// Upper bound on write attempts (one retry)
    pub const MAX_WRITE_ATTEMPTS: u8 = 2;

    /// How long an enqueue may wait for room when the queue is full
    pub const ENQUEUE_WAIT_MS: u64 = 250;
}
