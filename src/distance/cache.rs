//! Content-addressed distance matrix cache.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use log::debug;

use super::DistanceMatrix;
use crate::models::Location;

#[derive(Debug, Clone)]
struct CacheEntry {
    locations: Vec<Location>,
    matrix: Arc<DistanceMatrix>,
}

/// Caches distance matrices by a content hash of the ordered location list.
///
/// A hit requires the exact same locations in the same order; the stored
/// sequence is compared on lookup so a hash collision never returns a wrong
/// matrix.
///
/// The cache is owned by one optimizer and mutated through `&mut self`, so
/// population for a key is never concurrent. It holds at most
/// [`MatrixCache::capacity`] matrices; inserting beyond that evicts the
/// oldest entry.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
/// use u_dispatch::distance::MatrixCache;
///
/// let mut cache = MatrixCache::new();
/// let locs = vec![Location::new(0.0, 0.0), Location::new(0.0, 1.0)];
/// let a = cache.get_or_compute(&locs);
/// let b = cache.get_or_compute(&locs);
/// assert_eq!(a, b);
/// assert_eq!(cache.hits(), 1);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixCache {
    entries: HashMap<u64, CacheEntry>,
    insertion_order: VecDeque<u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for MatrixCache {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl MatrixCache {
    /// Matrices kept by [`MatrixCache::new`].
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Creates an empty cache holding up to [`Self::DEFAULT_CAPACITY`]
    /// matrices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding up to `capacity` matrices (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the matrix for `locations`, computing and storing it on a miss.
    pub fn get_or_compute(&mut self, locations: &[Location]) -> Arc<DistanceMatrix> {
        let key = fingerprint(locations);
        if let Some(entry) = self.entries.get(&key) {
            if same_sequence(&entry.locations, locations) {
                self.hits += 1;
                debug!("distance matrix cache hit ({} locations)", locations.len());
                return Arc::clone(&entry.matrix);
            }
        }

        self.misses += 1;
        debug!("distance matrix cache miss ({} locations)", locations.len());
        let matrix = Arc::new(DistanceMatrix::from_locations(locations));
        let entry = CacheEntry {
            locations: locations.to_vec(),
            matrix: Arc::clone(&matrix),
        };
        if self.entries.insert(key, entry).is_none() {
            self.insertion_order.push_back(key);
            self.evict_overflow();
        }
        matrix
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    debug!("evicted distance matrix from cache");
                }
                None => break,
            }
        }
    }

    /// Maximum number of cached matrices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached matrices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute a matrix.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drops all cached matrices and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Order-sensitive content hash of a location sequence.
fn fingerprint(locations: &[Location]) -> u64 {
    let mut hasher = DefaultHasher::new();
    locations.len().hash(&mut hasher);
    for l in locations {
        l.key().hash(&mut hasher);
    }
    hasher.finish()
}

fn same_sequence(a: &[Location], b: &[Location]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.key() == y.key())
}
