//! Downloads translations of a content tree from Transifex and writes the
//! translated tree back next to the source language.

pub mod error;
pub mod logging;
pub mod model;
pub mod parsers;
pub mod services;

pub use error::{
    CacheError, ComponentError, ConfigError, EnumerateError, FormatError, ParseError,
    PersistError, RemoteError,
};
pub use logging::{default_log_level, init_logging};
pub use model::component::{Component, ComponentKind, NodePath, Resource};
pub use model::config::{RawDumpMode, SyncConfig};
pub use model::translation::{Record, TranslationSet};
pub use model::tree::{ContentTree, TreeNode};
pub use parsers::resource::ResourceParser;
pub use services::cache::TranslationCache;
pub use services::cancel::CancelToken;
pub use services::enumerator::{ComponentSource, FsEnumerator};
pub use services::job::{run_job, JobCompletion};
pub use services::materialize::{materialize, FsNodeStore, MaterializeReport, NodeStore};
pub use services::pipeline::{run, Outcome, RunContext, RunReport};
pub use services::transifex::{TransifexClient, TranslationSource};
