//! Page objects returned to pagination callers.

use crate::Cursor;
use serde::{Deserialize, Serialize};

/// One entry of a page: the node and the cursor pointing at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub cursor: Cursor,
    pub node: T,
}

/// Navigation metadata for a page.
///
/// A start cursor is present exactly when an earlier page exists, and an end
/// cursor exactly when a later one does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
}

/// An ordered page of edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// A page with no edges and no neighbours.
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate the nodes in page order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }

    /// Convert every node, keeping cursors and page info.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    cursor: e.cursor,
                    node: f(e.node),
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor;

    #[test]
    fn empty_page() {
        let page: Page<i64> = Page::empty();
        assert!(page.is_empty());
        assert!(!page.page_info.has_next_page);
        assert!(page.page_info.start_cursor.is_none());
    }

    #[test]
    fn map_keeps_cursors() {
        let page = Page {
            edges: vec![Edge {
                cursor: cursor::encode(1),
                node: 1i64,
            }],
            page_info: PageInfo {
                has_next_page: true,
                end_cursor: Some(cursor::encode(1)),
                ..Default::default()
            },
        };

        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.edges[0].node, "1");
        assert_eq!(mapped.edges[0].cursor, cursor::encode(1));
        assert!(mapped.page_info.has_next_page);
    }

    #[test]
    fn serialization_format() {
        let page: Page<i64> = Page::empty();
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"pageInfo\""));
        assert!(json.contains("\"hasPreviousPage\":false"));
        assert!(json.contains("\"endCursor\":null"));
    }
}
