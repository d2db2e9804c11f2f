//! Pipeline stages for batch HTML-to-Markdown conversion.
//!
//! Each submodule implements exactly one step, so each is testable alone
//! and the conversion engine can be swapped without touching file I/O.
//!
//! ## Data Flow
//!
//! ```text
//! list ──▶ read ──▶ html ──▶ postprocess ──▶ write
//! (dir)    (UTF-8)  (engine)  (cleanup)      (atomic rename)
//! ```
//!
//! 1. [`list`]: enumerate `<stem>.html` files in the source directory
//! 2. [`read`]: load one file into memory
//! 3. [`html`]: run the conversion engine on its own thread with a timeout
//! 4. [`postprocess`]: deterministic Markdown cleanup
//! 5. [`write`]: temp file + rename into the destination directory

pub mod html;
pub mod list;
pub mod postprocess;
pub mod read;
pub mod write;
