//! Pagination scope: from caller arguments to a store query, and from the
//! fetched batch back to a page.
//!
//! # Algorithm
//!
//! 1. Validate the arguments (`first`/`last` and `after`/`before` are
//!    mutually exclusive) and decode the boundary cursor
//! 2. Resolve the window: `first = n` or `last = n` fetches `n + 1` rows so a
//!    following (or preceding) page is detected without a second query;
//!    neither fetches [`DEFAULT_LIMIT`] `+ 1`; `all` disables the limit
//! 3. Backward windows flip the query direction so the store reads from the
//!    far end of the ordering
//! 4. After the fetch, backward batches are reversed into caller order, the
//!    extra row is dropped and the page info is set from its presence
//!
//! Boundaries are exclusive: a page fetched `after` a cursor never contains
//! the row the cursor points at, so consecutive pages neither overlap nor
//! skip rows.

use crate::cursor::Cursored;
use crate::page::{Edge, Page, PageInfo};
use crate::{error::Result, Cursor, Error, Location, LocationFilter, LocationId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Page size used when the caller gives neither `first` nor `last`.
pub const DEFAULT_LIMIT: usize = 50;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// Field a listing may be ordered by.
///
/// Both fields grow with the internal identifier, which is what makes
/// identifier cursors valid boundaries for either ordering. Ties are broken
/// by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Id,
    #[serde(alias = "created_at")]
    CreatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

/// Raw paging arguments as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionArgs {
    /// Page size reading forward
    pub first: Option<usize>,
    /// Page size reading backward
    pub last: Option<usize>,
    /// Return rows after this cursor
    pub after: Option<Cursor>,
    /// Return rows before this cursor
    pub before: Option<Cursor>,
    pub order: Option<SortDirection>,
    pub order_by: Option<SortField>,
    /// Disable the page limit entirely
    pub all: bool,
    pub filter: LocationFilter,
}

/// How many rows a page may hold and from which end they are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// At most `n` rows from the start of the ordering
    Forward(usize),
    /// At most `n` rows from the end of the ordering
    Backward(usize),
    /// Every matching row, no page info
    Unbounded,
}

impl Window {
    /// Rows requested from the store: one more than the page holds.
    pub fn fetch_limit(self) -> Option<usize> {
        match self {
            Window::Forward(n) | Window::Backward(n) => Some(n.saturating_add(1)),
            Window::Unbounded => None,
        }
    }

    /// Maximum number of edges in the resulting page.
    pub fn page_size(self) -> Option<usize> {
        match self {
            Window::Forward(n) | Window::Backward(n) => Some(n),
            Window::Unbounded => None,
        }
    }
}

/// Exclusive identifier boundary applied by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdBound {
    /// Only rows with `id > n`
    Above(LocationId),
    /// Only rows with `id < n`
    Below(LocationId),
}

impl IdBound {
    pub fn admits(self, id: LocationId) -> bool {
        match self {
            IdBound::Above(n) => id > n,
            IdBound::Below(n) => id < n,
        }
    }
}

/// The directive a store executes for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub filter: LocationFilter,
    pub order_by: SortField,
    /// Direction the store reads in; flipped for backward windows
    pub direction: SortDirection,
    pub bound: Option<IdBound>,
    /// `None` means no limit
    pub limit: Option<usize>,
}

impl LocationQuery {
    /// Whether a location satisfies the filter and boundary.
    pub fn admits(&self, location: &Location) -> bool {
        self.bound.map_or(true, |b| b.admits(location.id)) && self.filter.matches(&location.details)
    }
}

/// A validated, normalized pagination directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub window: Window,
    pub order_by: SortField,
    /// Direction the caller expects the page in
    pub order: SortDirection,
    pub after: Option<LocationId>,
    pub before: Option<LocationId>,
    pub filter: LocationFilter,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            window: Window::Forward(DEFAULT_LIMIT),
            order_by: SortField::default(),
            order: SortDirection::default(),
            after: None,
            before: None,
            filter: LocationFilter::default(),
        }
    }
}

impl Scope {
    /// Validate caller arguments into a scope.
    pub fn normalize(args: ConnectionArgs) -> Result<Self> {
        if args.after.is_some() && args.before.is_some() {
            return Err(Error::ConflictingCursors);
        }

        let window = match (args.first, args.last, args.all) {
            (Some(_), Some(_), _) => return Err(Error::ConflictingBounds),
            (Some(_), None, true) | (None, Some(_), true) => return Err(Error::ConflictingBounds),
            (Some(n), None, false) => Window::Forward(n),
            (None, Some(n), false) => Window::Backward(n),
            (None, None, true) => Window::Unbounded,
            (None, None, false) => Window::Forward(DEFAULT_LIMIT),
        };

        let after = args.after.as_ref().map(Cursor::decode).transpose()?;
        let before = args.before.as_ref().map(Cursor::decode).transpose()?;

        Ok(Self {
            window,
            order_by: args.order_by.unwrap_or_default(),
            order: args.order.unwrap_or_default(),
            after,
            before,
            filter: args.filter,
        })
    }

    /// The identifier boundary implied by the cursors, in caller order.
    pub fn bound(&self) -> Option<IdBound> {
        match (self.after, self.before, self.order) {
            (Some(after), _, SortDirection::Asc) => Some(IdBound::Above(after)),
            (Some(after), _, SortDirection::Desc) => Some(IdBound::Below(after)),
            (None, Some(before), SortDirection::Asc) => Some(IdBound::Below(before)),
            (None, Some(before), SortDirection::Desc) => Some(IdBound::Above(before)),
            (None, None, _) => None,
        }
    }

    /// The store directive for this scope.
    pub fn query(&self) -> LocationQuery {
        LocationQuery {
            filter: self.filter.clone(),
            order_by: self.order_by,
            direction: query_direction(self.order, self.window),
            bound: self.bound(),
            limit: self.window.fetch_limit(),
        }
    }
}

/// Direction the store must read in to serve `window` in `order`.
pub fn query_direction(order: SortDirection, window: Window) -> SortDirection {
    match window {
        Window::Backward(_) => order.flip(),
        Window::Forward(_) | Window::Unbounded => order,
    }
}

/// A fetched batch after trimming.
#[derive(Debug, Clone, PartialEq)]
pub struct Windowed<T> {
    /// Rows in caller order
    pub items: Vec<T>,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Trim a batch fetched for `window` and detect neighbouring pages.
///
/// Backward batches arrive in flipped order and are reversed first; the
/// extra row then sits at the front and is the one dropped.
pub fn apply_window<T>(mut batch: Vec<T>, window: Window) -> Windowed<T> {
    match window {
        Window::Unbounded => Windowed {
            items: batch,
            has_previous: false,
            has_next: false,
        },
        Window::Forward(n) => {
            let has_next = batch.len() > n;
            batch.truncate(n);
            Windowed {
                items: batch,
                has_previous: false,
                has_next,
            }
        }
        Window::Backward(n) => {
            batch.reverse();
            let has_previous = batch.len() > n;
            if has_previous {
                let excess = batch.len() - n;
                batch.drain(..excess);
            }
            Windowed {
                items: batch,
                has_previous,
                has_next: false,
            }
        }
    }
}

/// Turn a fetched batch into a page for `scope`.
pub fn paginate<T: Cursored>(batch: Vec<T>, scope: &Scope) -> Page<T> {
    let windowed = apply_window(batch, scope.window);

    let edges: Vec<Edge<T>> = windowed
        .items
        .into_iter()
        .map(|node| Edge {
            cursor: node.cursor(),
            node,
        })
        .collect();

    let start_cursor = if windowed.has_previous {
        edges.first().map(|e| e.cursor.clone())
    } else {
        None
    };
    let end_cursor = if windowed.has_next {
        edges.last().map(|e| e.cursor.clone())
    } else {
        None
    };

    Page {
        page_info: PageInfo {
            has_previous_page: windowed.has_previous,
            has_next_page: windowed.has_next,
            start_cursor,
            end_cursor,
        },
        edges,
    }
}

impl Cursored for Location {
    fn cursor_id(&self) -> LocationId {
        self.id
    }
}
