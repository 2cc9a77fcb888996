use std::time::Duration;

use anyhow::Result;
use glam::Vec3;
use log::info;

mod core;
mod engine;
mod game;

use engine::game_loop::GameLoop;
use engine::physics::{CollisionLayer, LayerMask};
use game::characters::{HumanState, MovementRequest};
use game::debug::DebugDrawList;
use game::{GameSettings, GameWorld};

/// Length of one simulated frame
const FRAME_TIME: Duration = Duration::from_millis(16);

/// Scripted player input: (simulation second, action)
enum Action {
    MoveTo(Vec3),
    Command(&'static str),
}

const SCRIPT: [(f32, Action); 6] = [
    (0.5, Action::MoveTo(Vec3::new(4.0, 0.0, 3.0))),
    (4.0, Action::Command("Whistle")),
    (7.0, Action::Command("Throw")),
    (9.0, Action::Command("Dead")),
    (12.0, Action::Command("IdleStand")),
    (13.0, Action::Command("MoveRun")),
];

const DEMO_LENGTH: f32 = 15.0;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting companion characters demo...");

    let mut world = GameWorld::new(GameSettings::default());
    world.add_ground();
    let human = world.spawn_human("Alice", Vec3::ZERO);
    let dog = world.spawn_dog("Rex", Vec3::new(1.5, 0.0, 0.0));
    world.assign_dog(human, dog)?;

    let visible_layers = LayerMask::only(CollisionLayer::Ground).with(CollisionLayer::Scenery);
    let mut game_loop = GameLoop::new();
    let mut script = SCRIPT.iter().peekable();

    while world.time() < DEMO_LENGTH {
        for _ in 0..game_loop.advance(FRAME_TIME) {
            world.tick(game_loop.fixed_timestep());
        }

        while let Some((_, action)) = script.next_if(|(at, _)| *at <= world.time()) {
            match action {
                Action::MoveTo(target) => {
                    let request = MovementRequest::Pick {
                        origin: *target + Vec3::new(0.0, 10.0, 0.0),
                        direction: Vec3::NEG_Y,
                    };
                    let accepted = world.request_movement(human, request, visible_layers)?;
                    info!("Move to {target:?}: accepted = {accepted}");
                }
                Action::Command(state) => {
                    info!("Command {state}");
                    world.command_state(human, state)?;
                }
            }
        }

        for sound in world.sounds_mut().drain() {
            info!("Sound: {}", sound.asset_name());
        }
    }

    if let (Some(alice), Some(rex)) = (world.human(human), world.dog(dog)) {
        info!(
            "{}: state {:?}, move state {:?}, at {:?}",
            alice.name,
            alice.current_state().unwrap_or(HumanState::IdleStand),
            alice.current_move_state(),
            alice.position()
        );
        info!(
            "{}: wants to play {}, stick thrown {}, human dead {}, at {:?}",
            rex.name,
            rex.human_wants_to_play(),
            rex.stick_thrown(),
            rex.human_is_dead(),
            rex.position()
        );
    }

    let mut draw_list = DebugDrawList::new();
    world.debug_draw(&mut draw_list);
    info!(
        "Debug armature: {} bones, {} boxes, {} vertex bytes",
        draw_list.line_count(),
        draw_list.box_count(),
        draw_list.vertex_bytes().len()
    );
    info!("Dog button: {:?}", world.hud().dog_button(human));
    info!(
        "Ran {} ticks ({:.2}s simulated)",
        game_loop.tick_count(),
        game_loop.simulated_secs()
    );

    Ok(())
}
