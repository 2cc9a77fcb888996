// Finite state machine driver
//
// The machine lives inside the entity it drives, so the driving functions
// take the entity itself and reach the machine through `Agent`. Hooks get the
// entity mutably and may request further transitions; those are queued and
// applied in request order once the running transition has finished.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

/// Behavior of one state for entity `E` in context `C`
pub trait State<E, C>: Copy + Eq + fmt::Debug {
    /// Message type understood by `on_message`
    type Message;

    fn enter(self, _entity: &mut E, _ctx: &mut C) {}

    fn update(self, _entity: &mut E, _ctx: &mut C) {}

    fn exit(self, _entity: &mut E, _ctx: &mut C) {}

    /// Returns whether the message was consumed
    fn on_message(self, _entity: &mut E, _ctx: &mut C, _message: &Self::Message) -> bool {
        false
    }
}

/// Entity owning a state machine
pub trait Agent<C>: Sized {
    type State: State<Self, C>;

    fn state_machine(&self) -> &StateMachine<Self::State>;

    fn state_machine_mut(&mut self) -> &mut StateMachine<Self::State>;
}

/// Current/previous state pair plus the queue of pending transitions
#[derive(Debug, Clone)]
pub struct StateMachine<S> {
    current: Option<S>,
    previous: Option<S>,
    pending: VecDeque<S>,
    in_transition: bool,
}

impl<S: Copy + Eq> StateMachine<S> {
    /// Machine with no state yet; the first transition skips `exit`
    pub fn new() -> Self {
        Self {
            current: None,
            previous: None,
            pending: VecDeque::new(),
            in_transition: false,
        }
    }

    pub fn current_state(&self) -> Option<S> {
        self.current
    }

    pub fn previous_state(&self) -> Option<S> {
        self.previous
    }

    pub fn is_in_state(&self, state: S) -> bool {
        self.current == Some(state)
    }

    /// Whether a transition is being applied right now
    pub fn is_in_transition(&self) -> bool {
        self.in_transition
    }
}

impl<S: Copy + Eq> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exit the current state and enter `target`.
///
/// Called from inside a hook, the request is queued and runs after the
/// transition in progress, in the order requests were made.
pub fn change_state<E, C>(entity: &mut E, target: E::State, ctx: &mut C)
where
    E: Agent<C>,
{
    let machine = entity.state_machine_mut();
    machine.pending.push_back(target);
    if machine.in_transition {
        return;
    }
    machine.in_transition = true;

    while let Some(next) = entity.state_machine_mut().pending.pop_front() {
        if let Some(current) = entity.state_machine().current {
            current.exit(entity, ctx);
        }

        let machine = entity.state_machine_mut();
        debug!("State change {:?} -> {:?}", machine.current, next);
        machine.previous = machine.current.replace(next);

        next.enter(entity, ctx);
    }

    entity.state_machine_mut().in_transition = false;
}

/// Run the update hook of the current state
pub fn update<E, C>(entity: &mut E, ctx: &mut C)
where
    E: Agent<C>,
{
    if let Some(current) = entity.state_machine().current {
        current.update(entity, ctx);
    }
}

/// Offer a message to the current state, returns whether it was consumed
pub fn handle_message<E, C>(
    entity: &mut E,
    ctx: &mut C,
    message: &<E::State as State<E, C>>::Message,
) -> bool
where
    E: Agent<C>,
{
    match entity.state_machine().current {
        Some(current) => current.on_message(entity, ctx, message),
        None => false,
    }
}
