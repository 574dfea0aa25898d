//! Configuration section definitions.
//!
//! | Module  | TOML Section | Purpose                                |
//! |---------|--------------|----------------------------------------|
//! | `build` | `[build]`    | Input/output paths, failure policy     |
//! | `watch` | `[watch]`    | Debounce window for watch mode         |

mod build;
mod watch;

pub use build::BuildSectionConfig;
pub use watch::WatchSectionConfig;
