//! Data retrieval, parsing and alignment

pub mod align;
pub mod provider;
pub mod relay;
pub mod transport;
pub mod yahoo;

pub use align::combine;
pub use provider::{AttemptOutcome, FetchError, FetchedSeries, RetrievalAttempt, SeriesRole};
pub use relay::{RelayChain, RelayDescriptor, RelayEncoding};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
pub use yahoo::{chart_url, looks_structured, parse_chart};
