// Game world: owns every character and routes their telegrams
//
// One tick runs, in order: advance the clock, update humans (steering, then
// state), update dogs, step physics, sync model transforms, deliver the
// telegrams that came due.

use glam::Vec3;
use log::{debug, error, info};

use crate::engine::audio::SoundBoard;
use crate::engine::physics::{presets, LayerMask, PhysicsWorld};

use super::characters::{
    fsm, CharacterError, CharacterId, DogCharacter, HumanCharacter, HumanState, HumanSteerSettings,
    MovementRequest,
};
use super::context::Services;
use super::debug::{ArmatureDebugDrawer, DebugDrawList};
use super::hud::Hud;
use super::messages::{GameTelegram, Message, Recipient};
use super::settings::GameSettings;

/// Telegrams answered during delivery are delivered in further rounds, up to this many
const MAX_DELIVERY_ROUNDS: usize = 4;

/// Half size of the ground slab added by `add_ground`
pub const GROUND_HALF_EXTENT: f32 = 50.0;
const GROUND_THICKNESS: f32 = 1.0;

/// Root node of every character rig
pub const ARMATURE_ROOT: &str = "armature";

/// Container of characters and the services they share
pub struct GameWorld {
    services: Services,
    hud: Hud,
    humans: Vec<HumanCharacter>,
    dogs: Vec<DogCharacter>,
    next_id: CharacterId,
    /// Simulation time in seconds
    time: f32,
}

impl GameWorld {
    /// Create an empty world with normal gravity
    pub fn new(settings: GameSettings) -> Self {
        Self::with_physics(settings, PhysicsWorld::new())
    }

    /// Create an empty world around a prepared physics world
    pub fn with_physics(settings: GameSettings, physics: PhysicsWorld) -> Self {
        info!("Creating game world (seed {:#x})", settings.seed);
        Self {
            services: Services::new(settings, physics),
            hud: Hud::new(),
            humans: Vec::new(),
            dogs: Vec::new(),
            next_id: 1,
            time: 0.0,
        }
    }

    /// Add a flat ground whose top face is at y = 0
    pub fn add_ground(&mut self) {
        let physics = &mut self.services.physics;
        let body = physics.add_rigid_body(presets::ground_body(0.0, GROUND_THICKNESS));
        physics.add_collider(presets::ground_collider(GROUND_HALF_EXTENT, GROUND_THICKNESS), body);
    }

    fn next_id(&mut self) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a human standing at `position`
    pub fn spawn_human(&mut self, name: &str, position: Vec3) -> CharacterId {
        let id = self.next_id();
        let mut ctx = self.services.context(self.time, 0.0);
        let human = HumanCharacter::new(id, name, position, &mut ctx);
        self.humans.push(human);
        id
    }

    /// Spawn a dog standing at `position`
    pub fn spawn_dog(&mut self, name: &str, position: Vec3) -> CharacterId {
        let id = self.next_id();
        let dog = DogCharacter::new(id, name, position, &mut self.services.physics);
        self.dogs.push(dog);
        id
    }

    /// Give a dog to a human. The human's previous dog, if any, is released.
    pub fn assign_dog(&mut self, human_id: CharacterId, dog_id: CharacterId) -> Result<(), CharacterError> {
        let dog = self.dog(dog_id).ok_or(CharacterError::UnknownDog(dog_id))?;
        if let Some(owner) = dog.human().filter(|owner| *owner != human_id) {
            return Err(CharacterError::DogAlreadyOwned { dog: dog_id, human: owner });
        }
        let previous = self
            .human(human_id)
            .ok_or(CharacterError::UnknownHuman(human_id))?
            .dog();

        if let Some(previous) = previous.filter(|previous| *previous != dog_id) {
            if let Some(old_dog) = self.dog_mut(previous) {
                old_dog.set_human(None);
            }
        }
        if let Some(human) = self.human_mut(human_id) {
            human.set_dog(Some(dog_id));
        }
        if let Some(dog) = self.dog_mut(dog_id) {
            dog.set_human(Some(human_id));
        }

        info!("Dog {dog_id} now belongs to human {human_id}");
        let mut ctx = self.services.context(self.time, 0.0);
        ctx.send_now(None, Recipient::Gui, Message::SetDogButtonToWhistle(human_id));
        Ok(())
    }

    /// Remove a dog from the world. Telegrams still on their way to it are dropped.
    pub fn despawn_dog(&mut self, dog_id: CharacterId) -> Result<(), CharacterError> {
        let index = self
            .dogs
            .iter()
            .position(|dog| dog.id == dog_id)
            .ok_or(CharacterError::UnknownDog(dog_id))?;
        let dog = self.dogs.remove(index);
        self.services.physics.remove_rigid_body(dog.body_handle());

        if let Some(human_id) = dog.human() {
            if let Some(human) = self.human_mut(human_id) {
                human.set_dog(None);
            }
            let mut ctx = self.services.context(self.time, 0.0);
            ctx.send_now(None, Recipient::Gui, Message::ClearDogButton(human_id));
        }
        info!("Despawned dog {} ({dog_id})", dog.name);
        Ok(())
    }

    pub fn human(&self, id: CharacterId) -> Option<&HumanCharacter> {
        self.humans.iter().find(|human| human.id == id)
    }

    pub fn human_mut(&mut self, id: CharacterId) -> Option<&mut HumanCharacter> {
        self.humans.iter_mut().find(|human| human.id == id)
    }

    pub fn dog(&self, id: CharacterId) -> Option<&DogCharacter> {
        self.dogs.iter().find(|dog| dog.id == id)
    }

    pub fn dog_mut(&mut self, id: CharacterId) -> Option<&mut DogCharacter> {
        self.dogs.iter_mut().find(|dog| dog.id == id)
    }

    pub fn humans(&self) -> &[HumanCharacter] {
        &self.humans
    }

    pub fn dogs(&self) -> &[DogCharacter] {
        &self.dogs
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Sound cues requested by the characters. The owner drains them once per
    /// frame; an undrained board keeps only the newest `MAX_QUEUED_SOUNDS`.
    pub fn sounds_mut(&mut self) -> &mut SoundBoard {
        &mut self.services.sounds
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.services.physics
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Telegrams not delivered yet
    pub fn pending_messages(&self) -> usize {
        self.services.messages.len()
    }

    /// Ask a human to move. Ignored (returns `Ok(false)`) while the human is busy.
    pub fn request_movement(
        &mut self,
        id: CharacterId,
        request: MovementRequest,
        visible_layers: LayerMask,
    ) -> Result<bool, CharacterError> {
        let human = self
            .humans
            .iter_mut()
            .find(|human| human.id == id)
            .ok_or(CharacterError::UnknownHuman(id))?;
        Ok(human.handle_movement_request(request, visible_layers, &self.services.physics))
    }

    /// Force a human into a state
    pub fn request_state_change(&mut self, id: CharacterId, state: HumanState) -> Result<(), CharacterError> {
        let human = self
            .humans
            .iter_mut()
            .find(|human| human.id == id)
            .ok_or(CharacterError::UnknownHuman(id))?;
        let mut ctx = self.services.context(self.time, 0.0);
        human.handle_state_command(state, &mut ctx);
        Ok(())
    }

    /// Force a human into a state given by name.
    ///
    /// Names come from trusted tables; an unknown one is a bug. Debug builds
    /// panic on it, release builds log it and do nothing.
    pub fn command_state(&mut self, id: CharacterId, state: &str) -> Result<(), CharacterError> {
        match state.parse::<HumanState>() {
            Ok(state) => self.request_state_change(id, state),
            Err(err) => {
                error!("Ignoring state command for human {id}: {err}");
                debug_assert!(false, "{err}");
                Ok(())
            }
        }
    }

    /// Replace the shared human steering profile
    pub fn configure_human_steering(&mut self, settings: HumanSteerSettings) {
        for human in &mut self.humans {
            human.refresh_limits(&settings);
        }
        self.services.human_steer_settings = settings;
    }

    pub fn human_steer_settings(&self) -> &HumanSteerSettings {
        &self.services.human_steer_settings
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.time += dt;
        self.services.physics.set_timestep(dt);

        {
            let mut ctx = self.services.context(self.time, dt);
            for human in &mut self.humans {
                human.update(&mut ctx);
            }
            for dog in &mut self.dogs {
                let human_position = dog
                    .human()
                    .and_then(|id| self.humans.iter().find(|human| human.id == id))
                    .map(HumanCharacter::position);
                dog.update(human_position, &mut ctx);
            }
        }

        self.services.physics.step();
        for human in &mut self.humans {
            human.sync_transform(&self.services.physics);
        }
        for dog in &mut self.dogs {
            dog.sync_transform(&self.services.physics);
        }

        self.deliver_messages();
    }

    fn deliver_messages(&mut self) {
        for _ in 0..MAX_DELIVERY_ROUNDS {
            let due = self.services.messages.drain_due(self.time);
            if due.is_empty() {
                return;
            }
            for telegram in due {
                self.deliver(telegram);
            }
        }
    }

    fn deliver(&mut self, telegram: GameTelegram) {
        let mut ctx = self.services.context(self.time, 0.0);
        match telegram.receiver {
            Recipient::Gui => {
                if !self.hud.handle_message(&telegram.message) {
                    debug!("HUD ignored {:?}", telegram.message);
                }
            }
            Recipient::Dog(id) => match self.dogs.iter_mut().find(|dog| dog.id == id) {
                Some(dog) => {
                    dog.handle_message(&telegram.message, &mut ctx);
                }
                None => debug!("Dropping {:?}: dog {id} is gone", telegram.message),
            },
            Recipient::Human(id) => match self.humans.iter_mut().find(|human| human.id == id) {
                Some(human) => {
                    if !fsm::handle_message(human, &mut ctx, &telegram) {
                        debug!("Human {id} ignored {:?}", telegram.message);
                    }
                }
                None => debug!("Dropping {:?}: human {id} is gone", telegram.message),
            },
        }
    }

    /// Draw the skeleton of every character
    pub fn debug_draw(&self, list: &mut DebugDrawList) {
        let drawer = ArmatureDebugDrawer::new();
        for human in &self.humans {
            drawer.draw_armature(list, Some(human), ARMATURE_ROOT);
        }
        for dog in &self.dogs {
            drawer.draw_armature(list, Some(dog), ARMATURE_ROOT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::audio::Sound;
    use crate::engine::game_loop::FIXED_TIMESTEP;
    use crate::engine::physics::CollisionLayer;
    use crate::game::hud::DogButton;

    fn run(world: &mut GameWorld, seconds: f32) {
        let ticks = (seconds / FIXED_TIMESTEP).ceil() as usize;
        for _ in 0..ticks {
            world.tick(FIXED_TIMESTEP);
        }
    }

    /// Ground, a human and its dog
    fn setup() -> (GameWorld, CharacterId, CharacterId) {
        let mut world = GameWorld::new(GameSettings::with_seed(42));
        world.add_ground();
        let human = world.spawn_human("Alice", Vec3::ZERO);
        let dog = world.spawn_dog("Rex", Vec3::new(2.0, 0.0, 0.0));
        world.assign_dog(human, dog).unwrap();
        (world, human, dog)
    }

    #[test]
    fn test_spawned_human_stands() {
        let mut world = GameWorld::new(GameSettings::default());
        let id = world.spawn_human("Bob", Vec3::ZERO);
        let human = world.human(id).unwrap();
        assert_eq!(human.current_state(), Some(HumanState::IdleStand));
        assert_eq!(world.hud().dog_button(id), DogButton::Hidden);
    }

    #[test]
    fn test_assigning_dog_shows_whistle() {
        let (mut world, human, dog) = setup();
        world.tick(FIXED_TIMESTEP);
        assert_eq!(world.hud().dog_button(human), DogButton::Whistle);
        assert_eq!(world.human(human).unwrap().dog(), Some(dog));
        assert_eq!(world.dog(dog).unwrap().human(), Some(human));
    }

    #[test]
    fn test_dog_cannot_have_two_owners() {
        let (mut world, _, dog) = setup();
        let other = world.spawn_human("Bob", Vec3::new(5.0, 0.0, 0.0));
        assert!(matches!(
            world.assign_dog(other, dog),
            Err(CharacterError::DogAlreadyOwned { .. })
        ));
    }

    #[test]
    fn test_unknown_characters() {
        let (mut world, human, _) = setup();
        assert!(matches!(
            world.assign_dog(human, 99),
            Err(CharacterError::UnknownDog(99))
        ));
        assert!(matches!(
            world.request_state_change(99, HumanState::Dead),
            Err(CharacterError::UnknownHuman(99))
        ));
    }

    #[test]
    fn test_whistle_starts_playtime() {
        let (mut world, human, dog) = setup();
        run(&mut world, 0.5);

        world.request_state_change(human, HumanState::Whistle).unwrap();
        run(&mut world, 2.5);

        assert_eq!(world.human(human).unwrap().current_state(), Some(HumanState::IdleStand));
        assert!(world.dog(dog).unwrap().human_wants_to_play());
        assert_eq!(world.hud().dog_button(human), DogButton::Throw);
        assert!(world.sounds_mut().drain().contains(&Sound::Whistle));
    }

    #[test]
    fn test_death_and_resurrection() {
        let (mut world, human, dog) = setup();
        run(&mut world, 0.5);

        world.request_state_change(human, HumanState::Dead).unwrap();
        run(&mut world, 2.5);
        assert!(world.human(human).unwrap().is_dead());
        assert!(world.dog(dog).unwrap().human_is_dead());
        assert_eq!(world.hud().dog_button(human), DogButton::Hidden);
        assert!(world.sounds_mut().drain().contains(&Sound::Whine));

        world.request_state_change(human, HumanState::IdleStand).unwrap();
        run(&mut world, 2.0);
        assert!(!world.dog(dog).unwrap().human_is_dead());
        assert_eq!(world.hud().dog_button(human), DogButton::Whistle);
    }

    #[test]
    fn test_vanished_dog_is_tolerated() {
        let (mut world, human, dog) = setup();
        world.request_state_change(human, HumanState::MoveRun).unwrap();
        assert!(world.pending_messages() > 0);

        world.despawn_dog(dog).unwrap();
        run(&mut world, 2.5);

        assert_eq!(world.pending_messages(), 0);
        assert_eq!(world.human(human).unwrap().dog(), None);
        assert_eq!(world.hud().dog_button(human), DogButton::Hidden);
    }

    #[test]
    fn test_pick_ray_moves_human() {
        let mut world = GameWorld::new(GameSettings::default());
        world.add_ground();
        let human = world.spawn_human("Alice", Vec3::ZERO);
        world.tick(FIXED_TIMESTEP);

        let accepted = world
            .request_movement(
                human,
                MovementRequest::Pick {
                    origin: Vec3::new(3.0, 10.0, 0.0),
                    direction: Vec3::NEG_Y,
                },
                LayerMask::only(CollisionLayer::Ground),
            )
            .unwrap();
        assert!(accepted);

        world.tick(FIXED_TIMESTEP);
        assert_eq!(world.human(human).unwrap().current_state(), Some(HumanState::MoveWalk));

        run(&mut world, 3.0);
        assert!(world.human(human).unwrap().position().x > 1.0);
    }

    #[test]
    fn test_reconfigured_steering_applies_to_humans() {
        let (mut world, human, _) = setup();
        world.configure_human_steering(HumanSteerSettings {
            max_linear_speed: 3.0,
            ..HumanSteerSettings::default()
        });
        assert_eq!(world.human(human).unwrap().limits().max_linear_speed, 3.0);
        assert_eq!(world.human_steer_settings().max_linear_speed, 3.0);
    }

    #[test]
    fn test_debug_draw_every_character() {
        let (world, _, _) = setup();
        let mut list = DebugDrawList::new();
        world.debug_draw(&mut list);
        assert!(list.line_count() > 0);
        // Nodes of both rigs plus two hand markers
        let nodes = world.humans()[0].skeleton().len() + world.dogs()[0].skeleton().len();
        assert_eq!(list.box_count(), nodes + 2);
    }

    #[test]
    fn test_debug_draw_crowd() {
        let mut world = GameWorld::new(GameSettings::with_seed(1));
        for i in 0..400 {
            world.spawn_human("Extra", Vec3::new(i as f32 * 2.0, 0.0, 0.0));
        }
        let mut list = DebugDrawList::new();
        world.debug_draw(&mut list);

        let vertex_count = list.vertices().len();
        assert!(vertex_count > u16::MAX as usize);
        assert!(list.indices().iter().all(|&i| (i as usize) < vertex_count));
        assert_eq!(list.indices().last().copied(), Some(vertex_count as u32 - 1));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "Unknown human state")]
    fn test_unknown_state_name_panics_in_debug() {
        let (mut world, human, _) = setup();
        let _ = world.command_state(human, "Fly");
    }

    #[test]
    fn test_command_state_by_name() {
        let (mut world, human, _) = setup();
        world.command_state(human, "IdleCrouch").unwrap();
        assert_eq!(world.human(human).unwrap().current_state(), Some(HumanState::IdleCrouch));
    }
}
