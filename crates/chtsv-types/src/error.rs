/// Errors raised while interpreting format and type metadata.
///
/// Type tags themselves never fail to parse (unknown tags become
/// [`TypeTag::Unsupported`](crate::TypeTag::Unsupported) and fail later,
/// at value decode time), so the only error here concerns the response
/// format selector handed over by the transport.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The format name is not one of the supported TabSeparated variants
    /// or `JSON`.
    #[error("unsupported format: {name}")]
    UnknownFormat { name: String },
}
