//! Tower AOI: a bucket grid over the index bounds.

use hashbrown::{HashMap, HashSet};

use crate::index::{AoiBounds, AoiEvent, AoiEvents, AoiHandle, AoiIndex};

/// Grid coordinates of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerId {
    pub x: i32,
    pub y: i32,
}

impl TowerId {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A square bucket of the grid holding the handles positioned inside it.
#[derive(Debug)]
pub struct Tower {
    /// Tower identifier.
    pub id: TowerId,
    members: HashSet<AoiHandle>,
}

impl Tower {
    /// Create an empty tower.
    #[must_use]
    pub fn new(id: TowerId) -> Self {
        Self {
            id,
            members: HashSet::new(),
        }
    }

    /// Handles currently inside this tower.
    pub fn members(&self) -> impl Iterator<Item = AoiHandle> + '_ {
        self.members.iter().copied()
    }

    /// Number of handles inside this tower.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the tower is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Per-handle tracking state.
#[derive(Debug)]
struct Tracked {
    x: f32,
    y: f32,
    tower: TowerId,
    neighbors: HashSet<AoiHandle>,
}

/// Grid-bucketed [`AoiIndex`].
///
/// Towers are `radius` wide, so every handle within the neighbor radius of a
/// point lives in the 3x3 block of towers around it. Positions outside the
/// bounds are clamped onto the border.
///
/// Towers exist only while occupied; memory follows the tracked population,
/// not the area of the bounds.
///
/// Two handles are neighbors when both `|dx| <= radius` and `|dy| <= radius`.
#[derive(Debug)]
pub struct TowerAoi {
    bounds: AoiBounds,
    radius: f32,
    /// Grid width in towers.
    width: i32,
    /// Grid height in towers.
    height: i32,
    towers: HashMap<TowerId, Tower>,
    tracked: HashMap<AoiHandle, Tracked>,
}

impl TowerAoi {
    /// Create an index over `bounds` with the given neighbor radius.
    ///
    /// A radius that is not finite and positive is treated as `1.0`.
    #[must_use]
    pub fn new(bounds: AoiBounds, radius: f32) -> Self {
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            1.0
        };

        Self {
            bounds,
            radius,
            width: Self::span(bounds.width(), radius),
            height: Self::span(bounds.height(), radius),
            towers: HashMap::new(),
            tracked: HashMap::new(),
        }
    }

    /// Towers needed to cover `extent`. Float-to-int casts saturate.
    fn span(extent: f32, radius: f32) -> i32 {
        ((extent / radius).ceil() as i32).max(1)
    }

    /// The neighbor radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// The index bounds.
    #[must_use]
    pub const fn bounds(&self) -> AoiBounds {
        self.bounds
    }

    /// Grid size in towers, occupied or not.
    #[must_use]
    pub const fn grid_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Get an occupied tower by ID.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(&id)
    }

    /// Number of occupied towers.
    #[must_use]
    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    /// Tracked position of a handle.
    #[must_use]
    pub fn position(&self, handle: AoiHandle) -> Option<(f32, f32)> {
        self.tracked.get(&handle).map(|t| (t.x, t.y))
    }

    /// The tower holding an already clamped point.
    fn tower_at(&self, x: f32, y: f32) -> TowerId {
        let gx = ((x - self.bounds.min_x) / self.radius).floor() as i32;
        let gy = ((y - self.bounds.min_y) / self.radius).floor() as i32;
        TowerId::new(gx.clamp(0, self.width - 1), gy.clamp(0, self.height - 1))
    }

    fn is_neighbor(&self, ax: f32, ay: f32, bx: f32, by: f32) -> bool {
        (ax - bx).abs() <= self.radius && (ay - by).abs() <= self.radius
    }

    /// Every tracked handle other than `handle` within radius of `(x, y)`.
    fn find_neighbors(&self, handle: AoiHandle, x: f32, y: f32) -> HashSet<AoiHandle> {
        let center = self.tower_at(x, y);
        let mut found = HashSet::new();

        for ny in center.y.saturating_sub(1)..=center.y.saturating_add(1) {
            for nx in center.x.saturating_sub(1)..=center.x.saturating_add(1) {
                let Some(tower) = self.towers.get(&TowerId::new(nx, ny)) else {
                    continue;
                };
                for other in tower.members() {
                    if other == handle {
                        continue;
                    }
                    let Some(t) = self.tracked.get(&other) else {
                        continue;
                    };
                    if self.is_neighbor(x, y, t.x, t.y) {
                        found.insert(other);
                    }
                }
            }
        }

        found
    }

    fn place(&mut self, tower: TowerId, handle: AoiHandle) {
        self.towers
            .entry(tower)
            .or_insert_with(|| Tower::new(tower))
            .members
            .insert(handle);
    }

    fn displace(&mut self, tower: TowerId, handle: AoiHandle) {
        let emptied = self.towers.get_mut(&tower).is_some_and(|t| {
            t.members.remove(&handle);
            t.is_empty()
        });
        if emptied {
            self.towers.remove(&tower);
        }
    }

    fn link(&mut self, a: AoiHandle, b: AoiHandle, events: &mut AoiEvents) {
        if let Some(t) = self.tracked.get_mut(&a) {
            t.neighbors.insert(b);
        }
        if let Some(t) = self.tracked.get_mut(&b) {
            t.neighbors.insert(a);
        }
        events.push(AoiEvent::Enter {
            watcher: a,
            target: b,
        });
        events.push(AoiEvent::Enter {
            watcher: b,
            target: a,
        });
    }

    fn unlink(&mut self, a: AoiHandle, b: AoiHandle, events: &mut AoiEvents) {
        if let Some(t) = self.tracked.get_mut(&a) {
            t.neighbors.remove(&b);
        }
        if let Some(t) = self.tracked.get_mut(&b) {
            t.neighbors.remove(&a);
        }
        events.push(AoiEvent::Leave {
            watcher: a,
            target: b,
        });
        events.push(AoiEvent::Leave {
            watcher: b,
            target: a,
        });
    }
}

impl AoiIndex for TowerAoi {
    fn enter(&mut self, handle: AoiHandle, x: f32, y: f32) -> AoiEvents {
        if self.tracked.contains_key(&handle) {
            return self.moved(handle, x, y);
        }

        let (x, y) = self.bounds.clamp(x, y);
        let tower = self.tower_at(x, y);
        let found = self.find_neighbors(handle, x, y);

        self.place(tower, handle);
        self.tracked.insert(
            handle,
            Tracked {
                x,
                y,
                tower,
                neighbors: HashSet::with_capacity(found.len()),
            },
        );

        let mut events = AoiEvents::new();
        for other in found {
            self.link(handle, other, &mut events);
        }
        events
    }

    fn leave(&mut self, handle: AoiHandle) -> AoiEvents {
        let mut events = AoiEvents::new();
        let Some(tracked) = self.tracked.remove(&handle) else {
            return events;
        };

        self.displace(tracked.tower, handle);
        for other in tracked.neighbors {
            self.unlink(handle, other, &mut events);
        }
        events
    }

    fn moved(&mut self, handle: AoiHandle, x: f32, y: f32) -> AoiEvents {
        if !self.tracked.contains_key(&handle) {
            return self.enter(handle, x, y);
        }

        let (x, y) = self.bounds.clamp(x, y);
        let new_tower = self.tower_at(x, y);
        let found = self.find_neighbors(handle, x, y);

        let Some(tracked) = self.tracked.get_mut(&handle) else {
            return AoiEvents::new();
        };
        let old_tower = tracked.tower;
        tracked.x = x;
        tracked.y = y;
        tracked.tower = new_tower;
        let lost: Vec<AoiHandle> = tracked.neighbors.difference(&found).copied().collect();
        let gained: Vec<AoiHandle> = found.difference(&tracked.neighbors).copied().collect();

        if old_tower != new_tower {
            self.displace(old_tower, handle);
            self.place(new_tower, handle);
        }

        let mut events = AoiEvents::new();
        for other in lost {
            self.unlink(handle, other, &mut events);
        }
        for other in gained {
            self.link(handle, other, &mut events);
        }
        events
    }

    fn neighbors(&self, handle: AoiHandle) -> Vec<AoiHandle> {
        self.tracked
            .get(&handle)
            .map(|t| t.neighbors.iter().copied().collect())
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.tracked.len()
    }
}
