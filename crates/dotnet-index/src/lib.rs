//! Release Index Cache (C1): fetches, persists, and ages the remote release
//! index document, serving cached copies under a stale-while-revalidate
//! policy (spec.md §4.1).

pub mod cache;
pub mod channel;
pub mod storage;
pub mod transport;

pub use cache::{IndexCacheConfig, ReleaseIndexCache};
pub use channel::{ChannelReleasesCache, ChannelReleasesCacheConfig};
pub use transport::{ReqwestTransport, Transport};
