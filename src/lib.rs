//! bibcite tracks which bibliography entries a program actually uses.
//!
//! Functions are wrapped with the citation keys they rely on. Calling a wrapped
//! function records its keys under the function's name, and the registry can
//! then produce a bibtex file holding only the entries that were cited.
//!
//! ```
//! use bibcite::{CitationRegistry, CiteKeys};
//!
//! let registry = CitationRegistry::new(
//!     "@article{key1,\n  title = {Used},\n  year = {2021}\n}\n\
//!      @article{key2,\n  title = {Unused},\n  year = {1997}\n}",
//! )?;
//!
//! let scale = registry
//!     .register_cites(CiteKeys::computed(|x: &f64| {
//!         if *x > 0.0 { vec!["key1"] } else { vec![] }
//!     }))
//!     .wrap_named("scale", |x: f64| x * 2.0)?;
//!
//! scale(1.5);
//! assert_eq!(
//!     registry.active_bibliography(),
//!     "@article{key1,\n title = {Used},\n year = {2021}\n}\n\n"
//! );
//! # Ok::<(), bibcite::CiteError>(())
//! ```

pub mod bibliography;
pub mod citetrack;
pub mod config;
pub mod error;
mod fs;
pub mod logging;
pub mod registry;
mod render;

pub use bibliography::BibEntry;
pub use citetrack::Citations;
pub use config::{RegistryConfig, RenderConfig, UnknownKeyPolicy};
pub use error::CiteError;
pub use logging::{init_logger, LogConfig};
pub use registry::{CitationRegistry, CiteKeys, Citer, Select};
