//! Timing endpoints of a subtitle track and the capacity they provide.

use std::fmt::{Display, Formatter};

use crate::structs::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Start,
    End,
}

impl Role {
    /// Endpoints alternate START/END, so the role follows from the index.
    pub const fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Role::Start } else { Role::End }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingEndpoint {
    pub index: usize,
    pub time: Timestamp,
    pub role: Role,
}

impl TimingEndpoint {
    pub const fn new(index: usize, time: Timestamp) -> Self {
        Self {
            index,
            time,
            role: Role::from_index(index),
        }
    }

    pub const fn parity(&self) -> u8 {
        self.time.parity()
    }
}

/// All timing endpoints of one subtitle file, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timing {
    endpoints: Vec<TimingEndpoint>,
}

impl Timing {
    /// Builds a sequence from `(start, end)` pairs, one per timing line.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Timestamp, Timestamp)>) -> Self {
        Self::from_times(pairs.into_iter().flat_map(|(start, end)| [start, end]))
    }

    /// Builds a sequence from flat endpoint times; roles follow the index.
    pub fn from_times(times: impl IntoIterator<Item = Timestamp>) -> Self {
        let endpoints = times
            .into_iter()
            .enumerate()
            .map(|(index, time)| TimingEndpoint::new(index, time))
            .collect();

        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[TimingEndpoint] {
        &self.endpoints
    }

    pub fn times(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.endpoints.iter().map(|endpoint| endpoint.time)
    }

    /// Parity pointers, indexed like the endpoints.
    pub fn pointers(&self) -> Vec<u8> {
        self.endpoints.iter().map(TimingEndpoint::parity).collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        Capacity::for_pointers(self.len())
    }
}

/// Message capacity of a pointer pool.
///
/// Write and read both derive their bit count from here, so the two paths
/// always agree for the same pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub pointers: usize,
    pub chars: usize,
    pub bits: usize,
}

impl Capacity {
    pub const fn for_pointers(pointers: usize) -> Self {
        let chars = pointers / 8;
        Self {
            pointers,
            chars,
            bits: chars * 8,
        }
    }
}

impl Display for Capacity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} chars ({} bits of {} timestamp pointers)",
            self.chars, self.bits, self.pointers
        )
    }
}

#[test]
fn capacity_consistency() {
    for pointers in 0..200 {
        let capacity = Capacity::for_pointers(pointers);
        assert_eq!(capacity.bits, capacity.chars * 8);
        assert!(capacity.bits <= pointers);
        assert_eq!(capacity.chars, pointers / 8);
    }
    assert_eq!(Capacity::for_pointers(16).chars, 2);
    assert_eq!(Capacity::for_pointers(4).chars, 0);
}

#[test]
fn endpoints_alternate_roles() {
    let timing = Timing::from_pairs([
        (Timestamp::from_millis(1_000), Timestamp::from_millis(2_001)),
        (Timestamp::from_millis(3_002), Timestamp::from_millis(4_003)),
    ]);

    let roles: Vec<_> = timing.endpoints().iter().map(|e| e.role).collect();
    assert_eq!(roles, [Role::Start, Role::End, Role::Start, Role::End]);
    assert_eq!(timing.pointers(), [0, 1, 0, 1]);
    assert_eq!(timing.endpoints()[3].index, 3);
}
