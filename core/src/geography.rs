//! The two geography services the economy consumes, plus simple
//! in-memory implementations used by the runner and tests.
//!
//! The economy never looks at terrain directly. It asks a `LandUseService`
//! what sits on a tile and a `PathService` how far apart two tiles are.

use crate::types::{CompanyId, HouseholdId, TileCoord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LandUse {
    #[default]
    Empty,
    Residential,
    Retail,
    Agriculture,
    Road,
}

/// Who occupies a developed tile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    Household(HouseholdId),
    Company(CompanyId),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileInfo {
    pub land_use: LandUse,
    pub developed: bool,
    pub occupant: Option<Occupant>,
}

pub trait LandUseService: Send + Sync {
    /// Land use, development state and occupant of a tile. Tiles off the
    /// map read as empty.
    fn tile(&self, at: TileCoord) -> TileInfo;

    /// Total road length in tiles, used for maintenance costs.
    fn road_length(&self) -> u64;
}

pub trait PathService: Send + Sync {
    /// Traversable distance between two points, or `None` if unreachable.
    fn distance(&self, from: TileCoord, to: TileCoord) -> Option<u32>;
}

// ── In-memory land use ─────────────────────────────────────────────

/// A rectangular grid of tiles anchored at (0, 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<TileInfo>,
}

impl TileMap {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![TileInfo::default(); (width * height) as usize],
        }
    }

    fn index(&self, at: TileCoord) -> Option<usize> {
        if at.x < 0 || at.y < 0 || at.x >= self.width || at.y >= self.height {
            return None;
        }
        Some((at.y * self.width + at.x) as usize)
    }

    /// Overwrite a tile. Returns false if `at` is off the map.
    pub fn set(&mut self, at: TileCoord, info: TileInfo) -> bool {
        match self.index(at) {
            Some(i) => {
                self.tiles[i] = info;
                true
            }
            None => false,
        }
    }

    pub fn zone(&mut self, at: TileCoord, land_use: LandUse, occupant: Option<Occupant>) -> bool {
        self.set(
            at,
            TileInfo {
                land_use,
                developed: land_use != LandUse::Empty,
                occupant,
            },
        )
    }
}

impl LandUseService for TileMap {
    fn tile(&self, at: TileCoord) -> TileInfo {
        self.index(at).map(|i| self.tiles[i]).unwrap_or_default()
    }

    fn road_length(&self) -> u64 {
        self.tiles
            .iter()
            .filter(|t| t.land_use == LandUse::Road)
            .count() as u64
    }
}

// ── Path services ──────────────────────────────────────────────────

/// Every pair is reachable at grid (taxicab) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanPaths;

impl PathService for ManhattanPaths {
    fn distance(&self, from: TileCoord, to: TileCoord) -> Option<u32> {
        Some(from.x.abs_diff(to.x) + from.y.abs_diff(to.y))
    }
}

/// Explicit symmetric distances. Pairs not listed are unreachable.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    distances: BTreeMap<(TileCoord, TileCoord), u32>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, a: TileCoord, b: TileCoord, distance: u32) {
        self.distances.insert(Self::key(a, b), distance);
    }

    fn key(a: TileCoord, b: TileCoord) -> (TileCoord, TileCoord) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl PathService for DistanceTable {
    fn distance(&self, from: TileCoord, to: TileCoord) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        self.distances.get(&Self::key(from, to)).copied()
    }
}
