#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod result;
pub mod row_stream;

pub use client::{Client, ResponseDecoder, Transport};
pub use config::ClientConfig;
pub use error::ClientError;
pub use response::{Response, ResponseMeta};
pub use result::{QueryOutput, QueryResult};
pub use row_stream::RowStream;
