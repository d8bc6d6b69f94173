//! Cloud collaborators: bearer credentials, evidence object storage, and the
//! remote classification endpoint.

pub mod credentials;
pub mod inference;
pub mod storage;

pub use credentials::{CredentialProvider, CredentialSource};
pub use inference::{Classifier, InferenceClient, InferenceConfig, VideoOptions};
pub use storage::{ObjectStore, StorageConfig, StoredObject, Uploader};
