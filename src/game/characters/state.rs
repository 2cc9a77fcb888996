// Human behavior states
//
// Each state owns its enter/update/exit hooks. Idle and movement states come
// in pairs: a movement state falls back to its idle state when steering stops,
// an idle state resumes the remembered movement state when steering starts.

use std::fmt;
use std::str::FromStr;

use log::error;

use crate::engine::audio::Sound;
use crate::game::context::TickContext;
use crate::game::messages::{
    GameTelegram, Message, Recipient, DOG_REACTION_LATENCY, RESURRECTION_LATENCY,
    STICK_THROWN_LATENCY,
};

use super::animation::LOOP_FOREVER;
use super::fsm::{self, State};
use super::human::HumanCharacter;
use super::CharacterError;

/// Multiplier of idle states: advance animations with plain time
pub const IDLE_ANIMATION_MULTIPLIER: f32 = -1.0;

/// Represents the current state of a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumanState {
    IdleStand,
    IdleCrouch,
    IdleCrawl,
    MoveRun,
    MoveWalk,
    MoveCrouch,
    /// Reserved, nothing transitions here
    MoveCrawl,
    Throw,
    Whistle,
    Dead,
}

/// Classification of a state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateKind {
    Idle,
    Movement {
        idle_state: HumanState,
        animation_multiplier: f32,
    },
    Other,
}

impl HumanState {
    pub const ALL: [HumanState; 10] = [
        Self::IdleStand,
        Self::IdleCrouch,
        Self::IdleCrawl,
        Self::MoveRun,
        Self::MoveWalk,
        Self::MoveCrouch,
        Self::MoveCrawl,
        Self::Throw,
        Self::Whistle,
        Self::Dead,
    ];

    pub fn kind(self) -> StateKind {
        match self {
            Self::IdleStand | Self::IdleCrouch | Self::IdleCrawl => StateKind::Idle,
            Self::MoveRun => StateKind::Movement {
                idle_state: Self::IdleStand,
                animation_multiplier: 0.2,
            },
            Self::MoveWalk => StateKind::Movement {
                idle_state: Self::IdleStand,
                animation_multiplier: 0.4,
            },
            Self::MoveCrouch => StateKind::Movement {
                idle_state: Self::IdleCrouch,
                animation_multiplier: 0.5,
            },
            Self::MoveCrawl | Self::Throw | Self::Whistle | Self::Dead => StateKind::Other,
        }
    }

    /// Idle counterpart, `Some` exactly for movement states
    pub fn idle_state(self) -> Option<HumanState> {
        match self.kind() {
            StateKind::Movement { idle_state, .. } => Some(idle_state),
            _ => None,
        }
    }

    pub fn animation_multiplier(self) -> f32 {
        match self.kind() {
            StateKind::Idle => IDLE_ANIMATION_MULTIPLIER,
            StateKind::Movement {
                animation_multiplier,
                ..
            } => animation_multiplier,
            StateKind::Other => 0.0,
        }
    }

    pub fn is_movement_state(self) -> bool {
        matches!(self.kind(), StateKind::Movement { .. })
    }

    pub fn is_idle_state(self) -> bool {
        self.kind() == StateKind::Idle
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::IdleStand => "IdleStand",
            Self::IdleCrouch => "IdleCrouch",
            Self::IdleCrawl => "IdleCrawl",
            Self::MoveRun => "MoveRun",
            Self::MoveWalk => "MoveWalk",
            Self::MoveCrouch => "MoveCrouch",
            Self::MoveCrawl => "MoveCrawl",
            Self::Throw => "Throw",
            Self::Whistle => "Whistle",
            Self::Dead => "Dead",
        }
    }

    /// Looping clip played by idle and movement states, with its blend time
    fn locomotion_clip(self) -> Option<(&'static str, f32)> {
        match self {
            Self::IdleStand => Some(("armature|idle_stand", 0.2)),
            Self::IdleCrouch | Self::IdleCrawl => Some(("armature|idle_crouch", 0.2)),
            Self::MoveRun => Some(("armature|move_run", 0.1)),
            Self::MoveWalk => Some(("armature|move_walk", 0.1)),
            Self::MoveCrouch => Some(("armature|move_crouch", 0.15)),
            _ => None,
        }
    }

    /// Steering limit scale applied when entering a movement state
    fn steering_multiplier(self, ctx: &TickContext<'_>) -> f32 {
        match self {
            Self::MoveRun => ctx.steer_settings.run_multiplier,
            Self::MoveCrouch => ctx.steer_settings.crouch_multiplier,
            _ => 1.0,
        }
    }

    /// Advance the animation scaled by speed and the effective multiplier
    fn update_animation(self, entity: &mut HumanCharacter, ctx: &mut TickContext<'_>) {
        let multiplier = entity
            .animation_speed_multiplier()
            .filter(|m| *m > 0.0)
            .unwrap_or_else(|| self.animation_multiplier());

        let mut delta = ctx.delta_time;
        if multiplier > 0.0 {
            delta *= entity.linear_velocity(ctx.physics).length() * multiplier;
        }
        entity.animations.update(delta * ctx.settings.game_speed);
    }

    /// Shared update: follow steering intent, otherwise keep animating
    fn default_update(self, entity: &mut HumanCharacter, ctx: &mut TickContext<'_>) {
        if entity.is_steering() {
            if !self.is_movement_state() {
                let move_state = entity.current_move_state();
                fsm::change_state(entity, move_state, ctx);
                return;
            }
        } else if let Some(idle_state) = self.idle_state() {
            fsm::change_state(entity, idle_state, ctx);
            return;
        }

        self.update_animation(entity, ctx);
    }

    fn prepare_to_move(self, entity: &mut HumanCharacter, ctx: &mut TickContext<'_>) {
        entity.set_move_state(self);
        entity.apply_steering_multiplier(ctx.steer_settings, self.steering_multiplier(ctx));

        if let Some(dog) = entity.dog() {
            let me = Recipient::Human(entity.id);
            ctx.send(DOG_REACTION_LATENCY, Some(me), Recipient::Dog(dog), Message::DogLetsStopPlaying);
            ctx.send_now(Some(me), Recipient::Gui, Message::SetDogButtonToWhistle(entity.id));
        }
    }
}

/// Where to go once a one-shot action is over
fn resume_state(previous: Option<HumanState>) -> HumanState {
    match previous {
        Some(state) => match state.kind() {
            StateKind::Movement { idle_state, .. } => idle_state,
            StateKind::Idle => state,
            StateKind::Other => HumanState::IdleStand,
        },
        None => HumanState::IdleStand,
    }
}

impl fmt::Display for HumanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HumanState {
    type Err = CharacterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CharacterError::UnknownState(s.to_string()))
    }
}

impl<'a> State<HumanCharacter, TickContext<'a>> for HumanState {
    type Message = GameTelegram;

    fn enter(self, entity: &mut HumanCharacter, ctx: &mut TickContext<'a>) {
        match self {
            Self::IdleStand | Self::IdleCrouch | Self::IdleCrawl => {
                if let Some((clip, blend)) = self.locomotion_clip() {
                    let listener = entity.reset_animation_listener(self);
                    entity.animate(clip, LOOP_FOREVER, listener, blend);
                }
            }
            Self::MoveRun | Self::MoveWalk | Self::MoveCrouch => {
                if let Some((clip, blend)) = self.locomotion_clip() {
                    let listener = entity.reset_animation_listener(self);
                    entity.animate(clip, LOOP_FOREVER, listener, blend);
                }
                self.prepare_to_move(entity, ctx);
            }
            Self::MoveCrawl => {}
            Self::Throw => {
                let listener = entity.reset_animation_listener(self);
                entity.animate("armature|action_throw", 1, listener, 0.1);

                if let Some(dog) = entity.dog() {
                    ctx.send(
                        STICK_THROWN_LATENCY,
                        Some(Recipient::Human(entity.id)),
                        Recipient::Dog(dog),
                        Message::DogStickThrown,
                    );
                }
            }
            Self::Whistle => {
                entity.stop_steering(ctx.physics, false);

                if let Some(previous) = entity.previous_state().filter(|s| s.is_movement_state()) {
                    entity.set_animation_speed_multiplier(Some(previous.animation_multiplier()));
                }
                ctx.send_now(
                    Some(Recipient::Human(entity.id)),
                    Recipient::Gui,
                    Message::ClearDogButton(entity.id),
                );
            }
            Self::Dead => {
                if let Err(err) = entity.animations.set_animation("armature|idle_stand", LOOP_FOREVER) {
                    error!("{}: {err}", entity.name);
                }
                entity.animations.paused = true;

                entity.stop_steering(ctx.physics, false);
                entity.set_ragdoll_control(ctx.physics, true);

                if let Some(dog) = entity.dog() {
                    let me = Recipient::Human(entity.id);
                    ctx.send(DOG_REACTION_LATENCY, Some(me), Recipient::Dog(dog), Message::DogHumanIsDead);
                    ctx.send_now(Some(me), Recipient::Gui, Message::ClearDogButton(entity.id));
                }
            }
        }
    }

    fn update(self, entity: &mut HumanCharacter, ctx: &mut TickContext<'a>) {
        match self {
            Self::Throw => {
                self.update_animation(entity, ctx);

                if entity.animations.is_current_completed() {
                    let next = resume_state(entity.previous_state());
                    fsm::change_state(entity, next, ctx);
                }
            }
            Self::Whistle => {
                if entity.is_moving(ctx.physics, ctx.steer_settings) {
                    self.update_animation(entity, ctx);
                    return;
                }

                ctx.sounds.play(Sound::Whistle);
                if let Some(dog) = entity.dog() {
                    ctx.send(
                        DOG_REACTION_LATENCY,
                        Some(Recipient::Human(entity.id)),
                        Recipient::Dog(dog),
                        Message::DogLetsPlay,
                    );
                }
                let next = resume_state(entity.previous_state());
                fsm::change_state(entity, next, ctx);
            }
            // The ragdoll owns the body until resurrection
            Self::Dead => {}
            _ => self.default_update(entity, ctx),
        }
    }

    fn exit(self, entity: &mut HumanCharacter, ctx: &mut TickContext<'a>) {
        match self {
            Self::Whistle => entity.set_animation_speed_multiplier(None),
            Self::Dead => {
                entity.animations.paused = false;
                entity.set_ragdoll_control(ctx.physics, false);

                if let Some(dog) = entity.dog() {
                    let me = Recipient::Human(entity.id);
                    ctx.send(RESURRECTION_LATENCY, Some(me), Recipient::Dog(dog), Message::DogHumanIsResurrected);
                    ctx.send_now(Some(me), Recipient::Gui, Message::SetDogButtonToWhistle(entity.id));
                }
            }
            _ => {}
        }
    }
}
