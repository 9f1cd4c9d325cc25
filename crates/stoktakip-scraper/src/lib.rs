pub mod client;
pub mod composite;
pub mod credentials;
mod dom;
pub mod error;
pub mod pipeline;
pub mod price;
pub mod refresh;
pub mod resolver;
pub mod retry;
pub mod stock;
pub mod types;
pub mod urls;

pub use client::{FetchClient, FetchOutcome};
pub use credentials::{CredentialSet, CredentialStore, RawCookie};
pub use error::ScrapeError;
pub use pipeline::{Engine, EngineConfig};
pub use refresh::{spawn_refresher, CredentialProvider};
pub use resolver::{ProductResolver, ProductShape};
pub use retry::RetryPolicy;
pub use types::{ProductRecord, Stage, StockAmount};
