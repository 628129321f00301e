//! # Codescope Parsers
//!
//! Everything that turns raw bytes of a target project into structured
//! facts for the extraction engines:
//!
//! - per-ecosystem manifest parsers (npm, pip, Go modules, Cargo) and a
//!   concurrent aggregate over all of them,
//! - a block-based ORM-schema parser (Prisma-style),
//! - tree-sitter passes over a shared [`SourceFile`] model: typed
//!   declarations, import/export statements, and named handlers with
//!   intra-file call edges.
//!
//! Failure policy: a file that cannot be read or parsed is counted and
//! skipped; no pass ever aborts an engine.

mod calls_pass;
mod error;
mod imports_pass;
mod manifest;
mod schema;
mod session;
mod source_file;
mod types_pass;

pub use calls_pass::{extract_handlers, CallEdge, HandlerDecl, HandlerScan};
pub use error::{ParserError, Result};
pub use imports_pass::{
    extract_imports, ExportRecord, ImportBinding, ImportKind, ImportRecord, ImportScan,
    DEFAULT_ALIAS_PREFIXES,
};
pub use manifest::{parse_all_manifests, parse_cargo, parse_go, parse_npm, parse_pip, ManifestSummary};
pub use schema::{parse_schema, SchemaScan};
pub use session::ParseSession;
pub use source_file::{Language, SourceFile};
pub use types_pass::{extract_types, TypeScan};
