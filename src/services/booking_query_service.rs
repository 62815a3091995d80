//! Paginated Booking Query Engine
//!
//! Serves booking records to operator-facing views in one of two modes:
//!
//! - **Page mode** (default): cursor-based forward pagination, newest first,
//!   fixed page size, equality filters on status/type/user.
//! - **Search mode**: entered whenever a non-empty free-text term is set.
//!   Cursor pagination is abandoned; up to `SEARCH_SCAN_LIMIT` of the most
//!   recent filter-matched records are fetched in one shot and filtered
//!   client-side by substring match. Free text has no native index, so
//!   matches beyond the ceiling are a documented limitation, not an error.
//!
//! An optional live subscription mirrors the first page of page-mode
//! results; any active search term suspends it. A generation counter makes
//! filter changes last-filter-wins: a fetch started under old filters can
//! never overwrite state owned by newer ones.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{Client, Collection};
use serde::Serialize;

use crate::db::mongo::{db_name, BOOKINGS_COLLECTION};
use crate::models::booking::{Booking, BookingStatus, BookingType};

pub const PAGE_SIZE: i64 = 20;
/// Hard ceiling on records scanned per search; results beyond it are
/// silently omitted.
pub const SEARCH_SCAN_LIMIT: i64 = 1000;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Equality filters applied server-side in both modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub booking_type: Option<BookingType>,
    pub user_id: Option<ObjectId>,
}

impl BookingFilters {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(booking_type) = self.booking_type {
            filter.insert("booking_type", booking_type.as_str());
        }
        if let Some(user_id) = self.user_id {
            filter.insert("user_id", user_id);
        }
        filter
    }
}

/// Position after the last record of a page. Compound on
/// `(created_at, _id)` so ordering stays stable across equal timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: DateTime,
    pub id: ObjectId,
}

impl PageCursor {
    pub fn of(booking: &Booking) -> Option<Self> {
        booking.id.map(|id| Self {
            created_at: booking.created_at,
            id,
        })
    }

    /// Opaque wire form: `<epoch-millis>:<objectid-hex>`.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.created_at.timestamp_millis(), self.id.to_hex())
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let (millis, hex) = raw
            .split_once(':')
            .ok_or_else(|| format!("invalid cursor: {}", raw))?;
        let millis: i64 = millis
            .parse()
            .map_err(|_| format!("invalid cursor timestamp: {}", raw))?;
        let id = ObjectId::parse_str(hex).map_err(|_| format!("invalid cursor id: {}", raw))?;
        Ok(Self {
            created_at: DateTime::from_millis(millis),
            id,
        })
    }
}

/// Case-insensitive substring match against the fields an operator actually
/// types: customer name, email, or the booking id.
pub fn matches_search(booking: &Booking, term: &str) -> bool {
    let needle = term.to_lowercase();
    booking.user_name.to_lowercase().contains(&needle)
        || booking.user_email.to_lowercase().contains(&needle)
        || booking
            .id
            .map(|id| id.to_hex().contains(&needle))
            .unwrap_or(false)
}

/// Persistence seam for the feed. Both fetches return records ordered by
/// `created_at` descending (ties broken by id descending).
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn fetch_page(
        &self,
        filters: &BookingFilters,
        after: Option<&PageCursor>,
        limit: i64,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn fetch_recent(
        &self,
        filters: &BookingFilters,
        limit: i64,
    ) -> Result<Vec<Booking>, StoreError>;
}

pub struct MongoBookingStore {
    client: Arc<Client>,
}

impl MongoBookingStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<Booking> {
        self.client
            .database(&db_name())
            .collection(BOOKINGS_COLLECTION)
    }
}

#[async_trait]
impl BookingStore for MongoBookingStore {
    async fn fetch_page(
        &self,
        filters: &BookingFilters,
        after: Option<&PageCursor>,
        limit: i64,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut filter = filters.to_document();
        if let Some(cursor) = after {
            filter.insert(
                "$or",
                vec![
                    doc! { "created_at": { "$lt": cursor.created_at } },
                    doc! { "created_at": cursor.created_at, "_id": { "$lt": cursor.id } },
                ],
            );
        }

        let cursor = self
            .collection()
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn fetch_recent(
        &self,
        filters: &BookingFilters,
        limit: i64,
    ) -> Result<Vec<Booking>, StoreError> {
        let cursor = self
            .collection()
            .find(filters.to_document())
            .sort(doc! { "created_at": -1, "_id": -1 })
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }
}

/// Snapshot of the feed handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct BookingPage {
    pub bookings: Vec<Booking>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Stateful query session over a [`BookingStore`].
///
/// Driven from a single-threaded request or UI-event context; cancelling an
/// in-flight fetch means dropping its future. Results are applied only if
/// the generation they started under is still current, so a stale fetch can
/// never clobber newer filter state even when futures are raced externally.
pub struct BookingFeed<S: BookingStore> {
    store: S,
    filters: BookingFilters,
    search_term: Option<String>,
    records: Vec<Booking>,
    cursor: Option<PageCursor>,
    has_more: bool,
    loading: bool,
    live_requested: bool,
    error: Option<String>,
    generation: u64,
}

impl<S: BookingStore> BookingFeed<S> {
    pub fn new(store: S, filters: BookingFilters) -> Self {
        Self {
            store,
            filters,
            search_term: None,
            records: Vec::new(),
            cursor: None,
            has_more: false,
            loading: false,
            live_requested: false,
            error: None,
            generation: 0,
        }
    }

    /// Resume a page-mode session at a known cursor; the next `load_more`
    /// fetches the page following it.
    pub fn resume(store: S, filters: BookingFilters, cursor: PageCursor) -> Self {
        let mut feed = Self::new(store, filters);
        feed.cursor = Some(cursor);
        feed.has_more = true;
        feed
    }

    pub fn records(&self) -> &[Booking] {
        &self.records
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.search_term.is_some()
    }

    /// The live subscription mirrors page 1 only while no search term is
    /// active; a search snapshot and a live push must never race.
    pub fn live_active(&self) -> bool {
        self.live_requested && self.search_term.is_none()
    }

    pub fn set_live(&mut self, requested: bool) {
        self.live_requested = requested;
    }

    pub fn page(&self) -> BookingPage {
        BookingPage {
            bookings: self.records.clone(),
            has_more: self.has_more,
            next_cursor: if self.has_more {
                self.cursor.map(|c| c.encode())
            } else {
                None
            },
        }
    }

    /// Reset the cursor and reload page 1 (or rerun the search). Clears a
    /// latched error and restarts automatic loading.
    pub async fn refresh(&mut self) {
        self.generation += 1;
        self.error = None;
        self.cursor = None;
        self.reload().await;
    }

    /// Fetch the next page and append it. No-op in search mode, while a
    /// fetch is in flight, after an error, or when no further page exists.
    pub async fn load_more(&mut self) {
        if self.search_term.is_some()
            || self.loading
            || !self.has_more
            || self.error.is_some()
        {
            return;
        }

        let generation = self.begin_fetch();
        let result = self
            .store
            .fetch_page(&self.filters, self.cursor.as_ref(), PAGE_SIZE + 1)
            .await;
        self.apply_next_page(generation, result);
    }

    /// Replace the equality filters: cursor resets and page 1 reloads (or
    /// the search reruns under the new filters).
    pub async fn set_filters(&mut self, filters: BookingFilters) {
        if filters == self.filters {
            return;
        }
        self.generation += 1;
        self.filters = filters;
        self.error = None;
        self.cursor = None;
        self.reload().await;
    }

    /// Change the search term. A non-empty term enters search mode and
    /// suspends live refresh; clearing it returns to page mode and resumes
    /// live refresh if it was requested. Independent of the other filters.
    pub async fn set_search_term(&mut self, term: Option<&str>) {
        let normalized = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if normalized == self.search_term {
            return;
        }
        self.generation += 1;
        self.search_term = normalized;
        self.error = None;
        self.cursor = None;
        self.reload().await;
    }

    /// Mirror the first page from a live push. Only acts while live refresh
    /// is active and no error is latched; pages loaded beyond the first are
    /// replaced by the fresh page 1.
    pub async fn live_tick(&mut self) {
        if !self.live_active() || self.loading || self.error.is_some() {
            return;
        }
        self.cursor = None;
        self.load_first_page().await;
    }

    async fn reload(&mut self) {
        if self.search_term.is_some() {
            self.run_search().await;
        } else {
            self.load_first_page().await;
        }
    }

    async fn load_first_page(&mut self) {
        let generation = self.begin_fetch();
        let result = self.store.fetch_page(&self.filters, None, PAGE_SIZE + 1).await;
        self.apply_first_page(generation, result);
    }

    async fn run_search(&mut self) {
        let generation = self.begin_fetch();
        let result = self.store.fetch_recent(&self.filters, SEARCH_SCAN_LIMIT).await;
        self.apply_search(generation, result);
    }

    fn begin_fetch(&mut self) -> u64 {
        self.loading = true;
        self.generation
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }

    fn apply_first_page(&mut self, generation: u64, result: Result<Vec<Booking>, StoreError>) {
        if self.is_stale(generation) {
            return;
        }
        self.loading = false;
        match result {
            Ok(mut batch) => {
                self.has_more = batch.len() as i64 > PAGE_SIZE;
                batch.truncate(PAGE_SIZE as usize);
                self.cursor = batch.last().and_then(PageCursor::of);
                self.records = batch;
                self.error = None;
            }
            Err(e) => self.latch_error(e),
        }
    }

    fn apply_next_page(&mut self, generation: u64, result: Result<Vec<Booking>, StoreError>) {
        if self.is_stale(generation) {
            return;
        }
        self.loading = false;
        match result {
            Ok(mut batch) => {
                self.has_more = batch.len() as i64 > PAGE_SIZE;
                batch.truncate(PAGE_SIZE as usize);
                if let Some(last) = batch.last() {
                    self.cursor = PageCursor::of(last);
                }
                self.records.extend(batch);
            }
            Err(e) => self.latch_error(e),
        }
    }

    fn apply_search(&mut self, generation: u64, result: Result<Vec<Booking>, StoreError>) {
        if self.is_stale(generation) {
            return;
        }
        self.loading = false;
        let term = match &self.search_term {
            Some(term) => term.clone(),
            None => return,
        };
        match result {
            Ok(batch) => {
                self.records = batch.into_iter().filter(|b| matches_search(b, &term)).collect();
                // Everything up to the scan ceiling is already here.
                self.has_more = false;
                self.cursor = None;
                self.error = None;
            }
            Err(e) => self.latch_error(e),
        }
    }

    fn latch_error(&mut self, e: StoreError) {
        log::error!("booking query failed: {}", e);
        self.error = Some(e.to_string());
        self.has_more = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyStore;

    #[async_trait]
    impl BookingStore for EmptyStore {
        async fn fetch_page(
            &self,
            _filters: &BookingFilters,
            _after: Option<&PageCursor>,
            _limit: i64,
        ) -> Result<Vec<Booking>, StoreError> {
            Ok(Vec::new())
        }

        async fn fetch_recent(
            &self,
            _filters: &BookingFilters,
            _limit: i64,
        ) -> Result<Vec<Booking>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn booking(name: &str, minute: i64) -> Booking {
        Booking {
            id: Some(ObjectId::new()),
            resource_id: ObjectId::new(),
            booking_type: BookingType::Tour,
            status: BookingStatus::Pending,
            start_date: DateTime::from_millis(0),
            end_date: DateTime::from_millis(0),
            total_price: 2000,
            user_id: ObjectId::new(),
            user_name: name.to_string(),
            user_email: format!("{}@example.com", name.to_lowercase()),
            itinerary_details: None,
            created_at: DateTime::from_millis(minute * 60_000),
        }
    }

    #[test]
    fn test_cursor_round_trip() {
        let record = booking("Ravi", 42);
        let cursor = PageCursor::of(&record).unwrap();
        let parsed = PageCursor::parse(&cursor.encode()).unwrap();
        assert_eq!(parsed, cursor);
    }

    #[test]
    fn test_cursor_parse_rejects_garbage() {
        assert!(PageCursor::parse("not-a-cursor").is_err());
        assert!(PageCursor::parse("123").is_err());
        assert!(PageCursor::parse("abc:665f00000000000000000000").is_err());
        assert!(PageCursor::parse("123:zzzz").is_err());
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let record = booking("Priya Sharma", 1);
        assert!(matches_search(&record, "priya"));
        assert!(matches_search(&record, "SHARMA"));
        assert!(matches_search(&record, "sharma@example"));
        assert!(!matches_search(&record, "nobody"));
    }

    #[test]
    fn test_matches_search_on_booking_id() {
        let record = booking("Priya", 1);
        let hex = record.id.unwrap().to_hex();
        assert!(matches_search(&record, &hex[..8]));
        assert!(matches_search(&record, &hex[..8].to_uppercase()));
    }

    #[test]
    fn test_filter_document_contains_only_set_fields() {
        let filters = BookingFilters {
            status: Some(BookingStatus::Confirmed),
            booking_type: None,
            user_id: None,
        };
        let doc = filters.to_document();
        assert_eq!(doc.get_str("status").unwrap(), "confirmed");
        assert!(!doc.contains_key("booking_type"));
        assert!(!doc.contains_key("user_id"));

        assert!(BookingFilters::default().to_document().is_empty());
    }

    #[actix_rt::test]
    async fn test_stale_fetch_result_is_discarded() {
        let mut feed = BookingFeed::new(EmptyStore, BookingFilters::default());
        feed.refresh().await;

        // A fetch begun now is invalidated by any later filter change.
        let stale_generation = feed.begin_fetch();
        feed.set_filters(BookingFilters {
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        })
        .await;

        let stale_batch: Vec<Booking> = (0..5).map(|i| booking("Stale", i)).collect();
        feed.apply_first_page(stale_generation, Ok(stale_batch));

        // Last filter wins: the stale page never lands.
        assert!(feed.records().is_empty());
    }

    #[actix_rt::test]
    async fn test_current_fetch_result_is_applied() {
        let mut feed = BookingFeed::new(EmptyStore, BookingFilters::default());
        let generation = feed.begin_fetch();
        feed.apply_first_page(generation, Ok(vec![booking("Fresh", 1)]));
        assert_eq!(feed.records().len(), 1);
    }
}
