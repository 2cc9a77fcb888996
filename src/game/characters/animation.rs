// Skeletal animation playback and completion tracking

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

/// Loop count meaning "repeat until replaced"
pub const LOOP_FOREVER: i32 = -1;

/// Animation errors
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error("Unknown animation clip: {0}")]
    UnknownClip(String),
}

/// A named animation clip of a model
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Clip id, e.g. "armature|move_walk"
    pub name: String,
    /// Length of one cycle in seconds
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: &str, duration: f32) -> Self {
        Self {
            name: name.to_string(),
            duration,
        }
    }
}

/// Completion latch for a fire-and-forget clip.
///
/// A state hands a clone to the controller when it starts its clip and polls
/// its own copy on update. The controller sets the latch when the clip ends.
#[derive(Debug, Clone, Default)]
pub struct AnimationListener {
    completed: Rc<Cell<bool>>,
}

impl AnimationListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bound clip has finished playing
    pub fn is_animation_completed(&self) -> bool {
        self.completed.get()
    }

    pub fn set_animation_completed(&self, completed: bool) {
        self.completed.set(completed);
    }

    /// Called by the controller when the bound clip runs out of loops
    fn on_end(&self) {
        self.completed.set(true);
    }
}

/// A clip being played
#[derive(Debug, Clone)]
struct Playback {
    clip: String,
    duration: f32,
    /// Remaining loops, `LOOP_FOREVER` for endless
    loop_count: i32,
    speed: f32,
    time: f32,
    finished: bool,
    listener: Option<AnimationListener>,
}

impl Playback {
    fn advance(&mut self, delta: f32) {
        if self.finished || self.duration <= 0.0 {
            return;
        }
        self.time += delta * self.speed;
        while self.time >= self.duration {
            if self.loop_count == LOOP_FOREVER {
                self.time -= self.duration;
                continue;
            }
            self.loop_count -= 1;
            if self.loop_count <= 0 {
                self.time = self.duration;
                self.finished = true;
                if let Some(listener) = &self.listener {
                    listener.on_end();
                }
                break;
            }
            self.time -= self.duration;
        }
    }
}

/// Plays clips on one model instance, cross-blending between them
#[derive(Debug, Default)]
pub struct AnimationController {
    clips: HashMap<String, AnimationClip>,
    current: Option<Playback>,
    /// Clip being blended out
    previous: Option<Playback>,
    transition_time: f32,
    transition_elapsed: f32,
    /// While paused `update` does nothing
    pub paused: bool,
}

impl AnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller with the given clips
    pub fn with_clips(clips: impl IntoIterator<Item = AnimationClip>) -> Self {
        let mut controller = Self::new();
        for clip in clips {
            controller.add_clip(clip);
        }
        controller
    }

    /// Add an animation clip
    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Start a clip, blending from the current one over `transition_time` seconds
    pub fn animate(
        &mut self,
        id: &str,
        loop_count: i32,
        speed: f32,
        listener: Option<AnimationListener>,
        transition_time: f32,
    ) -> Result<(), AnimationError> {
        let clip = self
            .clips
            .get(id)
            .ok_or_else(|| AnimationError::UnknownClip(id.to_string()))?;

        let playback = Playback {
            clip: clip.name.clone(),
            duration: clip.duration,
            loop_count,
            speed,
            time: 0.0,
            finished: false,
            listener,
        };

        trace!("Animating {id} (loops {loop_count}, blend {transition_time}s)");
        self.previous = self.current.replace(playback);
        self.transition_time = transition_time.max(0.0);
        self.transition_elapsed = 0.0;
        Ok(())
    }

    /// Switch to a clip immediately, without blending or listener
    pub fn set_animation(&mut self, id: &str, loop_count: i32) -> Result<(), AnimationError> {
        self.animate(id, loop_count, 1.0, None, 0.0)?;
        self.previous = None;
        Ok(())
    }

    /// Advance playback by `delta` seconds
    pub fn update(&mut self, delta: f32) {
        if self.paused {
            return;
        }

        if self.previous.is_some() {
            self.transition_elapsed += delta;
            if self.transition_elapsed >= self.transition_time {
                self.previous = None;
            } else if let Some(previous) = self.previous.as_mut() {
                previous.advance(delta);
            }
        }

        if let Some(current) = self.current.as_mut() {
            current.advance(delta);
        }
    }

    /// Id of the clip currently playing
    pub fn current_clip(&self) -> Option<&str> {
        self.current.as_ref().map(|playback| playback.clip.as_str())
    }

    /// Listener bound to the current clip, if any
    pub fn current_listener(&self) -> Option<&AnimationListener> {
        self.current.as_ref().and_then(|playback| playback.listener.as_ref())
    }

    /// Whether the listener of the current clip reports completion.
    /// `false` when nothing is bound.
    pub fn is_current_completed(&self) -> bool {
        self.current_listener()
            .is_some_and(AnimationListener::is_animation_completed)
    }

    /// Playback position of the current clip in seconds
    pub fn current_time(&self) -> f32 {
        self.current.as_ref().map_or(0.0, |playback| playback.time)
    }

    /// Weight of the current clip in the blend (1.0 once the transition is over)
    pub fn blend_weight(&self) -> f32 {
        if self.previous.is_none() || self.transition_time <= 0.0 {
            1.0
        } else {
            (self.transition_elapsed / self.transition_time).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> AnimationController {
        AnimationController::with_clips([
            AnimationClip::new("idle", 2.0),
            AnimationClip::new("throw", 1.0),
        ])
    }

    #[test]
    fn test_listener_defaults_to_not_completed() {
        let listener = AnimationListener::new();
        assert!(!listener.is_animation_completed());
    }

    #[test]
    fn test_unbound_controller_not_completed() {
        let controller = controller();
        assert!(controller.current_clip().is_none());
        assert!(!controller.is_current_completed());
    }

    #[test]
    fn test_unknown_clip() {
        let mut controller = controller();
        let err = controller.animate("dance", 1, 1.0, None, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "Unknown animation clip: dance");
    }

    #[test]
    fn test_one_shot_fires_listener() {
        let mut controller = controller();
        let listener = AnimationListener::new();
        controller
            .animate("throw", 1, 1.0, Some(listener.clone()), 0.1)
            .unwrap();

        controller.update(0.6);
        assert!(!listener.is_animation_completed());

        controller.update(0.6);
        assert!(listener.is_animation_completed());
        assert!(controller.is_current_completed());
        assert_relative_eq!(controller.current_time(), 1.0);
    }

    #[test]
    fn test_looping_never_completes() {
        let mut controller = controller();
        let listener = AnimationListener::new();
        controller
            .animate("idle", LOOP_FOREVER, 1.0, Some(listener.clone()), 0.0)
            .unwrap();

        controller.update(5.0);
        assert!(!listener.is_animation_completed());
        assert_relative_eq!(controller.current_time(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_speed_scales_playback() {
        let mut controller = controller();
        controller.animate("throw", 1, 2.0, None, 0.0).unwrap();
        controller.update(0.25);
        assert_relative_eq!(controller.current_time(), 0.5);
    }

    #[test]
    fn test_paused_controller_does_not_advance() {
        let mut controller = controller();
        let listener = AnimationListener::new();
        controller
            .animate("throw", 1, 1.0, Some(listener.clone()), 0.0)
            .unwrap();
        controller.paused = true;
        controller.update(10.0);
        assert!(!listener.is_animation_completed());
        assert_eq!(controller.current_time(), 0.0);
    }

    #[test]
    fn test_cross_blend_weight() {
        let mut controller = controller();
        controller.set_animation("idle", LOOP_FOREVER).unwrap();
        assert_eq!(controller.blend_weight(), 1.0);

        controller.animate("throw", 1, 1.0, None, 0.2).unwrap();
        assert_eq!(controller.blend_weight(), 0.0);
        controller.update(0.1);
        assert_relative_eq!(controller.blend_weight(), 0.5);
        controller.update(0.1);
        assert_eq!(controller.blend_weight(), 1.0);
    }

    #[test]
    fn test_listener_reset_by_owner() {
        let listener = AnimationListener::new();
        listener.set_animation_completed(true);
        let bound = listener.clone();
        listener.set_animation_completed(false);
        assert!(!bound.is_animation_completed());
    }
}
