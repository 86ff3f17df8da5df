//! Asset packing: source files in, C++ headers out.
//!
//! # Module Structure
//!
//! ```text
//! pack/
//! ├── spec       # AssetSpec, Method, Filter
//! ├── context    # RenderContext (version, repository URL)
//! ├── text       # byte-preserving text codec
//! ├── inline     # document inliner (styles, scripts, images)
//! ├── markup     # well-formedness check + line wrapping
//! ├── minify     # lightningcss / oxc / minify-html wrappers
//! ├── filter     # filter name dispatch
//! ├── gzip       # deterministic gzip
//! ├── chunk      # one asset -> one literal
//! ├── writer     # Packer: document + chunk batches
//! └── error      # PackError
//! ```

pub mod chunk;
pub mod context;
pub mod error;
pub mod filter;
pub mod gzip;
pub mod inline;
pub mod markup;
pub mod minify;
pub mod spec;
pub mod text;
pub mod writer;

pub use context::{RenderContext, normalize_repository_url};
pub use filter::FilterOptions;
pub use spec::AssetSpec;
pub use writer::{BatchReport, Packer};
