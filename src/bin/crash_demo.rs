//! Crash Demo - Headless Arena Simulation
//!
//! Runs a walled arena full of drifting blocks plus a four-block ship
//! composite for a few hundred frames and reports what hit what. No
//! window, no renderer; this exercises the whole physics loop the way
//! the game does, with the frame-rate compensated timestep.
//!
//! Run with: `cargo run --bin crash_demo`
//!
//! Set `RUST_LOG=spaceblocks_physics=debug` to watch collision steps.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use glam::Vec3;
use spaceblocks_physics::physics::body::{BLOCK_SIZE, FIXED_BLOCK_SIZE};
use spaceblocks_physics::physics::{
    BodyDescriptor, BodyKind, FrameRate, PhysicsWorld, DEFAULT_STEP_SCALE,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Arena half-extent: wall inner faces sit at +/-10 on every axis.
const ARENA_HALF: f32 = 10.0;
const WALL_SIZE: f32 = 2.0 * ARENA_HALF;

const FRAMES: u32 = 300;
const TARGET_FPS: f32 = 30.0;
const FLOATING_BLOCKS: u32 = 20;

/// The ship composite occupies the first four registry slots; slot 0
/// leads the group.
const SHIP_LEADER: usize = 0;
const SHIP_BLOCKS: usize = 4;

/// Deterministic LCG so every run builds the same arena.
struct Lcg(u32);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 8) as f32 / 16_777_216.0
    }

    /// Uniform in [lo, hi).
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

fn build_arena(world: &mut PhysicsWorld) -> Result<()> {
    // Ship first, so the group id (the leader's slot) is stable.
    for i in 0..SHIP_BLOCKS {
        world.init_body_at(
            SHIP_LEADER + i,
            &BodyDescriptor::new(1.0, BodyKind::ShipBlock).with_group(SHIP_LEADER),
        )?;
    }
    world.set_velocity(SHIP_LEADER, Vec3::new(0.4, 0.0, 0.3))?;
    world.set_angular_velocity(SHIP_LEADER, Vec3::new(0.0, 0.25, 0.0))?;

    // Six walls boxing the arena in.
    let offset = ARENA_HALF + WALL_SIZE / 2.0;
    for center in [
        Vec3::new(offset, 0.0, 0.0),
        Vec3::new(-offset, 0.0, 0.0),
        Vec3::new(0.0, offset, 0.0),
        Vec3::new(0.0, -offset, 0.0),
        Vec3::new(0.0, 0.0, offset),
        Vec3::new(0.0, 0.0, -offset),
    ] {
        let wall = world.init_body(&BodyDescriptor::new(WALL_SIZE, BodyKind::Wall))?;
        world.set_position(wall, center)?;
    }

    // A few anchored obstacles.
    let mut rng = Lcg(0x5eed_b10c);
    for _ in 0..3 {
        let fixed = world.init_body(&BodyDescriptor::new(FIXED_BLOCK_SIZE, BodyKind::FixedBlock))?;
        world.set_position(
            fixed,
            Vec3::new(rng.range(-6.0, 6.0), rng.range(-6.0, 6.0), rng.range(-6.0, 6.0)),
        )?;
    }

    // Drifting blocks.
    for _ in 0..FLOATING_BLOCKS {
        let block = world.init_body(&BodyDescriptor::new(BLOCK_SIZE, BodyKind::Block))?;
        world.set_position(
            block,
            Vec3::new(rng.range(-8.0, 8.0), rng.range(-8.0, 8.0), rng.range(-8.0, 8.0)),
        )?;
        world.set_velocity(
            block,
            Vec3::new(
                rng.range(-0.5, 0.5),
                rng.range(-0.5, 0.5),
                rng.range(-0.5, 0.5),
            ),
        )?;
    }

    Ok(())
}

/// Group propagation leaves every member at the leader's position; the
/// game re-seats the hull blocks along the ship's heading each frame.
fn layout_ship(world: &mut PhysicsWorld) -> Result<()> {
    let heading = world.body_x_axis(SHIP_LEADER)?;
    let anchor = world.position(SHIP_LEADER)?;
    for i in 1..SHIP_BLOCKS {
        world.set_position(SHIP_LEADER + i, anchor - heading * i as f32)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut world = PhysicsWorld::new();
    build_arena(&mut world)?;
    info!(bodies = world.body_count(), "arena built");

    let mut frame_rate = FrameRate::new(TARGET_FPS);
    let mut total_resolved = 0usize;
    let mut ship_hits = 0u32;

    for frame in 0..FRAMES {
        frame_rate.tick();
        let dt = frame_rate.step_scale() * DEFAULT_STEP_SCALE;

        let resolved = world.step_simulation(dt);
        total_resolved += resolved;

        if world.collided(SHIP_LEADER) {
            ship_hits += 1;
            if let Some(other) = world.collided_with(SHIP_LEADER) {
                info!(frame, other, "ship struck body");
            }
        }
        layout_ship(&mut world)?;

        thread::sleep(Duration::from_secs_f32(1.0 / TARGET_FPS));
    }

    let ship_position = world.position(SHIP_LEADER)?;
    println!("frames simulated:   {FRAMES}");
    println!("contacts resolved:  {total_resolved}");
    println!("ship collisions:    {ship_hits}");
    println!(
        "ship final position: ({:.2}, {:.2}, {:.2})",
        ship_position.x, ship_position.y, ship_position.z
    );
    println!("measured fps:       {:.1}", frame_rate.fps);
    Ok(())
}
