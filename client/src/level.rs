//! The demo level layout.
//!
//! Everything here is plain data; `world` turns it into entities and the scene query
//! world, `player` and `dolly` read the rest.

use bevy::prelude::*;
use shared::{ColliderShapeDef, SurfaceTag, WorldStaticDef};

pub struct StaticPiece {
    pub def: WorldStaticDef,
    pub color: Color,
}

pub fn statics() -> Vec<StaticPiece> {
    let piece = |def: WorldStaticDef, color: Color| StaticPiece { def, color };
    vec![
        piece(
            WorldStaticDef::ground_plane(1, 0.0),
            Color::linear_rgb(0.12, 0.16, 0.14),
        ),
        // Covered walkway: everything beneath it is out of the moonlight.
        piece(
            WorldStaticDef::cuboid(2, [12.0, 4.0, 0.0], [3.0, 0.2, 12.0]),
            Color::srgb_u8(70, 64, 80),
        ),
        piece(
            WorldStaticDef::cuboid(3, [9.2, 2.0, 0.0], [0.2, 2.0, 12.0]),
            Color::srgb_u8(70, 64, 80),
        ),
        // Climbable cliff face.
        piece(
            WorldStaticDef::cuboid(4, [0.0, 4.0, 14.0], [6.0, 4.0, 1.0])
                .with_tag(SurfaceTag::Climbable),
            Color::srgb_u8(96, 110, 92),
        ),
        // Ledge on top of the cliff.
        piece(
            WorldStaticDef::cuboid(5, [0.0, 7.9, 17.0], [6.0, 0.1, 2.0]),
            Color::srgb_u8(96, 110, 92),
        ),
        // Glass wall across the path to the east.
        piece(
            WorldStaticDef::cuboid(6, [-10.0, 1.5, 0.0], [0.1, 1.5, 4.0])
                .with_tag(SurfaceTag::Glass),
            Color::srgba(0.7, 0.85, 1.0, 0.5),
        ),
        piece(
            WorldStaticDef {
                id: 7,
                translation: [-4.0, 1.0, -8.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
                shape: ColliderShapeDef::CylinderY {
                    radius: 0.6,
                    half_height: 1.0,
                },
                tag: SurfaceTag::Untagged,
            },
            Color::srgb_u8(124, 144, 255),
        ),
        piece(
            WorldStaticDef {
                id: 8,
                translation: [4.0, 0.8, -6.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
                shape: ColliderShapeDef::Sphere { radius: 0.8 },
                tag: SurfaceTag::Untagged,
            },
            Color::srgb_u8(124, 144, 255),
        ),
    ]
}

pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, -2.0);
pub const PLAYER_COLOR: [u8; 3] = [214, 208, 196];

/// Moonlight sources sit high above the level.
pub const MOONLIGHTS: [Vec3; 1] = [Vec3::new(-20.0, 40.0, -30.0)];

/// Lamps hang under the covered walkway.
pub const LAMPS: [Vec3; 2] = [Vec3::new(12.0, 3.2, -6.0), Vec3::new(12.0, 3.2, 6.0)];

/// Toon-shaded props.
pub const TOON_PROPS: [Vec3; 2] = [Vec3::new(-3.0, 0.75, 4.0), Vec3::new(13.5, 0.75, 2.0)];

pub const THRESHOLD_CENTER: Vec3 = Vec3::new(0.0, 1.5, 8.0);
pub const THRESHOLD_HALF_EXTENTS: [f32; 3] = [6.0, 1.5, 4.0];

pub const DOLLY_TRACK: [Vec3; 3] = [
    Vec3::new(-12.0, 6.0, -10.0),
    Vec3::new(0.0, 7.0, -14.0),
    Vec3::new(12.0, 6.0, -10.0),
];
