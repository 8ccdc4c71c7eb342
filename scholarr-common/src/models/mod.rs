//! Data models shared across Scholarr crates

pub mod author;
pub mod profile;
pub mod quality;
pub mod release;
pub mod work;

pub use author::{Author, AuthorKind};
pub use profile::{DelayProfile, ProfileItem, QualityIndex, QualityProfile};
pub use quality::{Quality, QualityModel, Revision};
pub use release::{DownloadProtocol, ReleaseInfo, ReleaseSource};
pub use work::{Link, Work, WorkFile};
