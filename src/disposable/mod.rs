//! Disposable-provider classification.
//!
//! [`DisposableClassifier`] consults, in order, the in-memory [`DisposableCache`],
//! the [`DomainStore`], the [`StaticDenylist`], the [`RemoteClassifier`] and the
//! [`DisposableIpSet`]. Errors never leave the classifier.

mod cache;
mod classifier;
mod denylist;
mod error;
mod options;
mod remote;
mod store;
mod types;

pub use cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_DISPOSABLE_IP, DisposableCache, DisposableIpSet};
pub use classifier::DisposableClassifier;
pub use denylist::StaticDenylist;
pub use error::{DenylistError, RemoteError, StoreError};
pub use options::{ClassifierOptions, FailurePolicy};
pub use remote::{DEFAULT_ENDPOINT, DebounceClient, RemoteClassifier};
pub use store::{DomainStore, JsonFileStore, MemoryStore};
pub use types::{ClassificationSource, DisposableRecord, InsertOutcome};
