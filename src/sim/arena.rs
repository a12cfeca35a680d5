//! Arena layouts
//!
//! Each variant is a fixed piece of geometry: horizontal bounds, an optional
//! floor, one-way platforms, lethal hazards and containment walls. Every
//! variant either has a floor or a hazard underneath, never neither.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::*;

/// Named arena layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArenaVariant {
    /// Flat floor with three podium platforms
    #[default]
    Colosseum,
    /// Colosseum floor with spike strips against both walls
    SpikePit,
    /// A narrow floating floor over the void
    SkyIsle,
    /// Platforms only, lava below
    LavaLake,
    /// Platforms only, bottomless void below
    Abyss,
}

impl ArenaVariant {
    pub const ALL: [ArenaVariant; 5] = [
        ArenaVariant::Colosseum,
        ArenaVariant::SpikePit,
        ArenaVariant::SkyIsle,
        ArenaVariant::LavaLake,
        ArenaVariant::Abyss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArenaVariant::Colosseum => "colosseum",
            ArenaVariant::SpikePit => "spike_pit",
            ArenaVariant::SkyIsle => "sky_isle",
            ArenaVariant::LavaLake => "lava_lake",
            ArenaVariant::Abyss => "abyss",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "colosseum" | "default" => Some(ArenaVariant::Colosseum),
            "spike_pit" | "spikes" => Some(ArenaVariant::SpikePit),
            "sky_isle" | "ground_only" => Some(ArenaVariant::SkyIsle),
            "lava_lake" | "lava" => Some(ArenaVariant::LavaLake),
            "abyss" | "empty" => Some(ArenaVariant::Abyss),
            _ => None,
        }
    }

    /// Look up a variant by name, falling back to the default layout
    pub fn resolve(s: &str) -> Self {
        Self::from_name(s).unwrap_or_else(|| {
            log::warn!("Unknown arena variant '{}', using {}", s, ArenaVariant::default().as_str());
            ArenaVariant::default()
        })
    }
}

/// What stops a fighter from falling forever
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ground {
    /// Floor across the whole arena; anything below it is clamped back up
    Solid { y: f32 },
    /// Floor only between `left` and `right`; outside it fighters fall through
    Span { y: f32, left: f32, right: f32 },
    /// No floor at all
    None,
}

impl Ground {
    pub fn level(&self) -> Option<f32> {
        match *self {
            Ground::Solid { y } | Ground::Span { y, .. } => Some(y),
            Ground::None => None,
        }
    }
}

/// Hazard types (all are instantly lethal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Lava,
    Spikes,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub rect: Rect,
}

/// A horizontal band where a field weapon may appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnSite {
    pub x_min: f32,
    pub x_max: f32,
    pub y: f32,
}

/// Static geometry of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaGeometry {
    pub variant: ArenaVariant,
    pub left: f32,
    pub right: f32,
    pub ground: Ground,
    /// Checked in order; the first platform that resolves a collision wins
    pub platforms: Vec<Rect>,
    pub hazards: Vec<Hazard>,
    pub walls: Vec<Rect>,
    /// Top-left body positions for fighter A and B
    pub spawn_points: [Vec2; 2],
}

/// Weapons float this far above the surface they spawn on
const SPAWN_HOVER: f32 = 20.0;

impl ArenaGeometry {
    /// Build the layout for a variant
    pub fn for_variant(variant: ArenaVariant) -> Self {
        let left = SCREEN_WIDTH * 0.1;
        let right = SCREEN_WIDTH * 0.9;
        let ground_y = SCREEN_HEIGHT * 0.75;
        let width = right - left;

        // Podium layout: two low side platforms and a higher, smaller middle one
        let side_w = width * 0.3;
        let side_gap = width * 0.05;
        let middle_w = width * 0.25;
        let podium = vec![
            Rect::new(left + side_gap, ground_y - 120.0, side_w, PLATFORM_THICKNESS),
            Rect::new(right - side_gap - side_w, ground_y - 120.0, side_w, PLATFORM_THICKNESS),
            Rect::new(
                SCREEN_WIDTH / 2.0 - middle_w / 2.0,
                ground_y - 200.0,
                middle_w,
                PLATFORM_THICKNESS,
            ),
        ];
        let floor_spawns = [
            Vec2::new(200.0 - FIGHTER_WIDTH / 2.0, ground_y - FIGHTER_HEIGHT),
            Vec2::new(SCREEN_WIDTH - 200.0 - FIGHTER_WIDTH / 2.0, ground_y - FIGHTER_HEIGHT),
        ];

        match variant {
            ArenaVariant::Colosseum => Self {
                variant,
                left,
                right,
                ground: Ground::Solid { y: ground_y },
                platforms: podium,
                hazards: Vec::new(),
                walls: Vec::new(),
                spawn_points: floor_spawns,
            },
            ArenaVariant::SpikePit => {
                let strip = 40.0;
                Self {
                    variant,
                    left,
                    right,
                    ground: Ground::Solid { y: ground_y },
                    platforms: podium,
                    hazards: vec![
                        Hazard {
                            kind: HazardKind::Spikes,
                            rect: Rect::new(left, ground_y - 20.0, strip, 20.0),
                        },
                        Hazard {
                            kind: HazardKind::Spikes,
                            rect: Rect::new(right - strip, ground_y - 20.0, strip, 20.0),
                        },
                    ],
                    walls: Vec::new(),
                    spawn_points: floor_spawns,
                }
            }
            ArenaVariant::SkyIsle => {
                let span_left = left + 160.0;
                let span_right = right - 160.0;
                Self {
                    variant,
                    left,
                    right,
                    ground: Ground::Span {
                        y: ground_y,
                        left: span_left,
                        right: span_right,
                    },
                    platforms: podium,
                    hazards: vec![Hazard {
                        kind: HazardKind::Void,
                        rect: Rect::new(0.0, ground_y + 80.0, SCREEN_WIDTH, 300.0),
                    }],
                    walls: Vec::new(),
                    spawn_points: [
                        Vec2::new(span_left + 40.0, ground_y - FIGHTER_HEIGHT),
                        Vec2::new(span_right - 40.0 - FIGHTER_WIDTH, ground_y - FIGHTER_HEIGHT),
                    ],
                }
            }
            ArenaVariant::LavaLake | ArenaVariant::Abyss => {
                let (kind, platforms) = if variant == ArenaVariant::LavaLake {
                    (
                        HazardKind::Lava,
                        vec![
                            Rect::new(178.0, 480.0, 260.0, PLATFORM_THICKNESS),
                            Rect::new(842.0, 480.0, 260.0, PLATFORM_THICKNESS),
                            Rect::new(512.0, 380.0, 256.0, PLATFORM_THICKNESS),
                        ],
                    )
                } else {
                    (
                        HazardKind::Void,
                        vec![
                            Rect::new(160.0, 470.0, 220.0, PLATFORM_THICKNESS),
                            Rect::new(900.0, 470.0, 220.0, PLATFORM_THICKNESS),
                            Rect::new(530.0, 400.0, 220.0, PLATFORM_THICKNESS),
                        ],
                    )
                };
                let spawn_points = [
                    Vec2::new(
                        platforms[0].center().x - FIGHTER_WIDTH / 2.0,
                        platforms[0].top() - FIGHTER_HEIGHT,
                    ),
                    Vec2::new(
                        platforms[1].center().x - FIGHTER_WIDTH / 2.0,
                        platforms[1].top() - FIGHTER_HEIGHT,
                    ),
                ];
                Self {
                    variant,
                    left: 64.0,
                    right: SCREEN_WIDTH - 64.0,
                    ground: Ground::None,
                    platforms,
                    hazards: vec![Hazard {
                        kind,
                        rect: Rect::new(0.0, 600.0, SCREEN_WIDTH, 300.0),
                    }],
                    walls: vec![
                        Rect::new(64.0, 0.0, 40.0, 560.0),
                        Rect::new(SCREEN_WIDTH - 104.0, 0.0, 40.0, 560.0),
                    ],
                    spawn_points,
                }
            }
        }
    }

    /// Floor level, if this arena has one
    pub fn ground_level(&self) -> Option<f32> {
        self.ground.level()
    }

    /// Whether `body` is standing on (or within `tolerance` above) the true floor
    pub fn on_floor(&self, body: &Rect, tolerance: f32) -> bool {
        match self.ground {
            Ground::Solid { y } => body.bottom() >= y - tolerance,
            Ground::Span { y, left, right } => {
                body.bottom() >= y - tolerance
                    && body.bottom() <= y + tolerance
                    && body.right() > left
                    && body.left() < right
            }
            Ground::None => false,
        }
    }

    /// Places where a field weapon may appear
    pub fn weapon_spawn_sites(&self) -> Vec<SpawnSite> {
        let mut sites = Vec::with_capacity(self.platforms.len() + 1);
        match self.ground {
            Ground::Solid { y } => {
                // Keep clear of the side hazards
                let margin = 80.0;
                sites.push(SpawnSite {
                    x_min: self.left + margin,
                    x_max: self.right - margin,
                    y: y - SPAWN_HOVER,
                });
            }
            Ground::Span { y, left, right } => sites.push(SpawnSite {
                x_min: left + 20.0,
                x_max: right - 20.0,
                y: y - SPAWN_HOVER,
            }),
            Ground::None => {}
        }
        for p in &self.platforms {
            sites.push(SpawnSite {
                x_min: p.left() + 20.0,
                x_max: p.right() - 20.0,
                y: p.top() - SPAWN_HOVER,
            });
        }
        sites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_falls_back() {
        assert_eq!(ArenaVariant::resolve("moon_base"), ArenaVariant::Colosseum);
        assert_eq!(ArenaVariant::resolve("LAVA"), ArenaVariant::LavaLake);
        for v in ArenaVariant::ALL {
            assert_eq!(ArenaVariant::from_name(v.as_str()), Some(v));
        }
    }

    #[test]
    fn test_every_variant_has_floor_or_hazard_below() {
        for v in ArenaVariant::ALL {
            let arena = ArenaGeometry::for_variant(v);
            let ground_y = arena.ground_level().unwrap_or(0.0);
            let hazard_below = arena.hazards.iter().any(|h| {
                h.rect.left() <= arena.left
                    && h.rect.right() >= arena.right
                    && h.rect.top() >= ground_y
            });
            // Partial or missing floor needs a full-width hazard underneath
            if !matches!(arena.ground, Ground::Solid { .. }) {
                assert!(hazard_below, "{:?} has nothing below", v);
            }
        }
    }

    #[test]
    fn test_spawn_points_are_safe() {
        for v in ArenaVariant::ALL {
            let arena = ArenaGeometry::for_variant(v);
            for spawn in arena.spawn_points {
                let body = Rect::new(spawn.x, spawn.y, FIGHTER_WIDTH, FIGHTER_HEIGHT);
                assert!(
                    arena.hazards.iter().all(|h| !h.rect.overlaps(&body)),
                    "{:?} spawns inside a hazard",
                    v
                );
                assert!(arena.walls.iter().all(|w| !w.overlaps(&body)));
                assert!(body.left() >= arena.left && body.right() <= arena.right);
                // Standing on the floor or on a platform top
                let supported = arena.on_floor(&body, 1.0)
                    || arena
                        .platforms
                        .iter()
                        .any(|p| p.overlaps_x(&body) && (body.bottom() - p.top()).abs() < 1.0);
                assert!(supported, "{:?} spawns in mid-air", v);
            }
        }
    }

    #[test]
    fn test_span_floor_only_under_span() {
        let arena = ArenaGeometry::for_variant(ArenaVariant::SkyIsle);
        let Ground::Span { y, left, .. } = arena.ground else {
            panic!("sky isle should have a span floor");
        };
        let on = Rect::new(left + 10.0, y - FIGHTER_HEIGHT, FIGHTER_WIDTH, FIGHTER_HEIGHT);
        let off = Rect::new(left - 100.0, y - FIGHTER_HEIGHT, FIGHTER_WIDTH, FIGHTER_HEIGHT);
        assert!(arena.on_floor(&on, 10.0));
        assert!(!arena.on_floor(&off, 10.0));
    }

    #[test]
    fn test_spawn_sites_follow_ground() {
        let colosseum = ArenaGeometry::for_variant(ArenaVariant::Colosseum);
        assert_eq!(colosseum.weapon_spawn_sites().len(), 4);
        let abyss = ArenaGeometry::for_variant(ArenaVariant::Abyss);
        assert_eq!(abyss.weapon_spawn_sites().len(), abyss.platforms.len());
    }
}
