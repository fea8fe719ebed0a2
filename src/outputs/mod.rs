//! Output generation for rendered pages and article snapshots.
//!
//! # Submodules
//!
//! - [`html`]: Writes the rendered page to a file or stdout
//! - [`json`]: Writes a JSON snapshot of the rendered articles
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── morning.json
//!     ├── afternoon.json
//!     └── evening.json
//! ```

pub mod html;
pub mod json;
