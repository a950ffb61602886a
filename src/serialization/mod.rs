//! Text serialization of node graphs.
//!
//! [`TextGraphSerializer`] drives the pipeline: per-type [`NodeSerializer`]s
//! produce fragment bodies, a [`ConnectionOrdering`] lays the fragments out and
//! frames them with headers, and a [`FragmentWriter`] / [`FragmentParser`] pair
//! handles the document markers.

pub mod fragment;
pub mod node_serializer;
pub mod ordering;
pub mod parser;
pub mod properties;
pub mod text_graph;
pub mod writer;

pub use fragment::{FragmentHeader, FragmentLink, ParsedNodeFragment};
pub use node_serializer::{NodeDeserializeResult, NodeSerializer, NullNodeSerializer};
pub use ordering::{ChainOrdering, ConnectionOrdering};
pub use parser::{FragmentParser, MarkerFragmentParser};
pub use properties::{decode_properties, encode_properties};
pub use text_graph::TextGraphSerializer;
pub use writer::{FragmentWriter, MarkerFragmentWriter};
