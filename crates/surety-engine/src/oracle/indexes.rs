//! Oracle index allocation and request index selection.
//!
//! Each oracle answers for a small set of indexes out of `0..range`. Sets are handed
//! out least-covered-first so every index keeps roughly the same number of holders;
//! ties are broken by a ChaCha stream seeded from the engine seed and the oracle key.
//! After any number of allocations the coverage of any two indexes differs by at most
//! one.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

use surety_core::{AccountId, FlightKey, RequestIndexSelection};

/// Hands out oracle index sets and picks the index for each new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAllocator {
    range: u8,
    set_size: usize,
    /// Holders per index
    coverage: Vec<u32>,
    seed: u64,
    selection: RequestIndexSelection,
    cursor: u8,
    requests_opened: u64,
}

impl IndexAllocator {
    /// Allocator over `0..range` issuing sets of `set_size` distinct indexes.
    pub fn new(range: u8, set_size: usize, seed: u64, selection: RequestIndexSelection) -> Self {
        Self {
            range,
            set_size,
            coverage: vec![0; usize::from(range)],
            seed,
            selection,
            cursor: 0,
            requests_opened: 0,
        }
    }

    fn stream(&self, domain: &[u8], subject: &[u8], counter: u64) -> ChaCha8Rng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"SURETY_INDEX_STREAM");
        hasher.update(domain);
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(subject);
        hasher.update(&counter.to_le_bytes());
        ChaCha8Rng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Assign `set_size` distinct indexes to `oracle`.
    pub fn allocate(&mut self, oracle: &AccountId) -> BTreeSet<u8> {
        let mut rng = self.stream(b"allocate", oracle.as_bytes(), 0);
        let mut order: Vec<(u32, u64, u8)> = (0..self.range)
            .map(|i| (self.coverage[usize::from(i)], rng.next_u64(), i))
            .collect();
        order.sort_unstable();

        let chosen: BTreeSet<u8> = order
            .iter()
            .take(self.set_size)
            .map(|&(_, _, index)| index)
            .collect();
        for &index in &chosen {
            let slot = &mut self.coverage[usize::from(index)];
            *slot = slot.saturating_add(1);
        }
        chosen
    }

    /// Pick the index for a new status request on `flight`.
    pub fn select_request_index(&mut self, flight: &FlightKey) -> u8 {
        let index = match self.selection {
            RequestIndexSelection::RoundRobin => {
                let index = self.cursor;
                self.cursor = (self.cursor + 1) % self.range;
                index
            }
            RequestIndexSelection::Random => {
                let mut subject = flight.airline.as_bytes().to_vec();
                subject.extend_from_slice(flight.designator.as_bytes());
                subject.extend_from_slice(&flight.timestamp.to_le_bytes());
                let mut rng = self.stream(b"request", &subject, self.requests_opened);
                (rng.next_u64() % u64::from(self.range)) as u8
            }
        };
        self.requests_opened += 1;
        index
    }

    /// Holders per index.
    pub fn coverage(&self) -> &[u32] {
        &self.coverage
    }
}
