pub mod config;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    InitOutcome, TraceSource, init_config, load_history, load_trace_input, retrieve_into_session,
    trace_input_from_text,
};
