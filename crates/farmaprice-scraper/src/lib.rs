pub mod adapter;
pub mod aggregate;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod transport;

pub use adapter::StoreAdapter;
pub use aggregate::{Aggregator, SearchOptions};
pub use error::{ScrapeError, TransportError};
pub use extract::CardFields;
pub use normalize::{clean_price_text, normalize_price};
#[cfg(feature = "browser")]
pub use transport::BrowserTransport;
pub use transport::{HttpTransport, Transport};
