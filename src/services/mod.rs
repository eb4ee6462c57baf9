pub mod cache;
pub mod cancel;
pub mod encoding;
pub mod enumerator;
pub mod job;
pub mod materialize;
pub mod pipeline;
pub mod rate_limit;
pub mod render;
pub mod transifex;
