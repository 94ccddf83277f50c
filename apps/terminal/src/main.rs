//! # Somtam Terminal Entry Point
//!
//! ```text
//! presentation ──stdin──► somtam-terminal ──stdout──► presentation
//!                                │
//!                              stderr (logs)
//! ```
//!
//! The actual setup is in lib.rs for better testability.

#[tokio::main]
async fn main() {
    if let Err(e) = somtam_terminal::run().await {
        tracing::error!("Terminal failed: {}", e);
        eprintln!("somtam-terminal: {}", e);
        std::process::exit(1);
    }
}
