//! Connection types for GraphQL listings
//!
//! Usage: Use the `define_connection!` macro to create type-specific connections
//! from a [`Connection`](crate::pagination::Connection) of records.

pub use crate::pagination::PageInfo;

/// Macro to define a GraphQL connection type for a specific entity
///
/// The node type must implement `From<Record>` for the listing's record type.
///
/// Usage:
/// ```ignore
/// define_connection!(MeshiConnection, MeshiEdge, Meshi, MeshiRecord);
/// ```
#[macro_export]
macro_rules! define_connection {
    ($conn_name:ident, $edge_name:ident, $node_type:ty, $record_type:ty) => {
        /// Edge containing a node and cursor
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $edge_name {
            /// The item at the end of the edge
            pub node: $node_type,
            /// Opaque cursor positioned just after this node
            pub cursor: String,
        }

        /// Connection containing edges, page info and the total count
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $conn_name {
            /// The edges in this connection
            pub edges: Vec<$edge_name>,
            /// Pagination information
            pub page_info: $crate::graphql::pagination::PageInfo,
            /// Number of matching items, ignoring the page window
            pub total_count: i64,
        }

        impl From<$crate::pagination::Connection<$record_type>> for $conn_name {
            fn from(conn: $crate::pagination::Connection<$record_type>) -> Self {
                Self {
                    edges: conn
                        .edges
                        .into_iter()
                        .map(|e| $edge_name {
                            node: <$node_type>::from(e.node),
                            cursor: e.cursor,
                        })
                        .collect(),
                    page_info: conn.page_info,
                    total_count: conn.total_count,
                }
            }
        }
    };
}
