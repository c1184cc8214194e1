//! Shared data model and error taxonomy for the .NET SDK/runtime acquisition core.
//!
//! This crate has no behavior of its own — it is the vocabulary every other
//! crate in the workspace (C1–C7) builds on, mirroring how the teacher repo
//! keeps wire-level types (`vx_version::VersionInfo`, `vx_cache::CacheMode`)
//! in small, dependency-light crates the rest of the workspace shares.

pub mod arch;
pub mod error;
pub mod installed;
pub mod mode;
pub mod release;
pub mod request;
pub mod tracking;
pub mod version;

pub use arch::Architecture;
pub use error::{AcquireError, Result};
pub use installed::InstalledRecord;
pub use mode::{InstallType, Mode};
pub use release::{
    ChannelRelease, ChannelReleasesDocument, ReleaseIndexDocument, ReleaseIndexEntry, ReleaseType,
    SdkVersionEntry, SupportPhase,
};
pub use request::{AcquireRequest, AcquireResult, ErrorConfiguration, Requirement};
pub use tracking::{InstallId, InstallState};
pub use version::{
    FullVersion, PreviewPolicy, RawVersionSpecRequirement, VersionSpec, VersionSpecRequirement,
};
