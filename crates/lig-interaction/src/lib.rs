//! Network side of the sync: the REST client for the LiG AR cloud.

mod dto;
pub mod remote_client;

pub use dto::UploadAsset;
pub use remote_client::RemoteClient;
