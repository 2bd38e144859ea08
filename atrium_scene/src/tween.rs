//! Scalar tween scheduler for gallery motion. One tween owns one
//! `(entity, channel)` pair; scheduling a replacement on the same pair
//! cancels the old tween without firing its completion, which is what
//! keeps rapid hover flicker from stacking animations.

use crate::registry::EntityRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Scale,
    PositionX,
    PositionY,
    PositionZ,
    Opacity,
    Emphasis,
}

/// Why a tween was scheduled; completions surface this so controllers
/// can sequence follow-up work (photo close-then-open, entry settling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenPurpose {
    Hover,
    Highlight,
    Entry,
    Expand,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    PowerOut2,
    SineInOut,
    BounceOut,
}

impl Easing {
    pub fn ease(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::PowerOut2 => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::SineInOut => 0.5 - 0.5 * (std::f32::consts::PI * t).cos(),
            Easing::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    /// Play forward then backward; `None` cycles forever.
    Yoyo(Option<u32>),
}

#[derive(Debug, Clone, Copy)]
pub struct Tween {
    pub entity: usize,
    pub channel: Channel,
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub delay: f32,
    pub easing: Easing,
    pub repeat: Repeat,
    pub purpose: TweenPurpose,
}

impl Tween {
    pub fn new(entity: usize, channel: Channel, from: f32, to: f32, duration: f32) -> Self {
        Self {
            entity,
            channel,
            from,
            to,
            duration: duration.max(f32::EPSILON),
            delay: 0.0,
            easing: Easing::PowerOut2,
            repeat: Repeat::Once,
            purpose: TweenPurpose::Hover,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_purpose(mut self, purpose: TweenPurpose) -> Self {
        self.purpose = purpose;
        self
    }
}

/// Emitted once per finished tween; replaced or cancelled tweens never
/// produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenDone {
    pub entity: usize,
    pub channel: Channel,
    pub purpose: TweenPurpose,
}

#[derive(Debug, Clone)]
struct Active {
    tween: Tween,
    elapsed: f32,
    reversed: bool,
    completed_cycles: u32,
}

#[derive(Debug, Default)]
pub struct TweenScheduler {
    active: Vec<Active>,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Schedule a tween, replacing any active tween on the same
    /// `(entity, channel)` pair.
    pub fn spawn(&mut self, tween: Tween) {
        self.active
            .retain(|a| !(a.tween.entity == tween.entity && a.tween.channel == tween.channel));
        self.active.push(Active {
            tween,
            elapsed: 0.0,
            reversed: false,
            completed_cycles: 0,
        });
    }

    /// Drop every tween targeting the entity; no completions fire.
    pub fn cancel_entity(&mut self, entity: usize) {
        self.active.retain(|a| a.tween.entity != entity);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn has_active(&self, entity: usize, channel: Channel) -> bool {
        self.active
            .iter()
            .any(|a| a.tween.entity == entity && a.tween.channel == channel)
    }

    /// Advance all tweens by `dt` seconds, writing current values into
    /// the registry and returning the completions that fired this tick.
    pub fn tick(&mut self, dt: f32, registry: &mut EntityRegistry) -> Vec<TweenDone> {
        let mut done = Vec::new();
        let mut index = 0;
        while index < self.active.len() {
            let finished = {
                let active = &mut self.active[index];
                active.elapsed += dt;
                let local = active.elapsed - active.tween.delay;
                if local < 0.0 {
                    index += 1;
                    continue;
                }

                let mut progress = (local / active.tween.duration).min(1.0);
                let was_reversed = active.reversed;
                let mut finished = progress >= 1.0;
                if finished {
                    match active.tween.repeat {
                        Repeat::Once => {}
                        Repeat::Yoyo(cycles) => {
                            active.completed_cycles += 1;
                            let exhausted =
                                cycles.is_some_and(|limit| active.completed_cycles >= limit);
                            if !exhausted {
                                active.reversed = !active.reversed;
                                active.elapsed = active.tween.delay;
                                progress = 1.0;
                                finished = false;
                            }
                        }
                    }
                }

                let eased = active.tween.easing.ease(progress);
                let (from, to) = if was_reversed {
                    (active.tween.to, active.tween.from)
                } else {
                    (active.tween.from, active.tween.to)
                };
                let value = from + (to - from) * eased;
                apply_channel(registry, active.tween.entity, active.tween.channel, value);
                finished
            };

            if finished {
                let active = self.active.swap_remove(index);
                done.push(TweenDone {
                    entity: active.tween.entity,
                    channel: active.tween.channel,
                    purpose: active.tween.purpose,
                });
            } else {
                index += 1;
            }
        }
        done
    }
}

fn apply_channel(registry: &mut EntityRegistry, entity: usize, channel: Channel, value: f32) {
    let Some(entity) = registry.entity_mut(entity) else {
        return;
    };
    match channel {
        Channel::Scale => entity.scale = value,
        Channel::PositionX => entity.position.x = value,
        Channel::PositionY => entity.position.y = value,
        Channel::PositionZ => entity.position.z = value,
        Channel::Opacity => entity.opacity = value.clamp(0.0, 1.0),
        Channel::Emphasis => entity.emphasis = value.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RingLayout;
    use crate::registry::Payload;

    fn registry_with_one() -> (EntityRegistry, usize) {
        let mut registry = EntityRegistry::new();
        let layout = RingLayout::tilted(10.0);
        let id = registry.insert(
            "video:test",
            Payload::Video {
                video_id: "test".to_string(),
                title: "Test".to_string(),
            },
            layout.slot(0, 1),
            glam::Vec3::splat(1.25),
        );
        (registry, id)
    }

    #[test]
    fn scale_tween_reaches_target_and_reports_done() {
        let (mut registry, id) = registry_with_one();
        let mut scheduler = TweenScheduler::new();
        scheduler.spawn(
            Tween::new(id, Channel::Scale, 1.0, 1.1, 0.3).with_purpose(TweenPurpose::Hover),
        );
        let mut completions = Vec::new();
        for _ in 0..40 {
            completions.extend(scheduler.tick(0.01, &mut registry));
        }
        assert_eq!(
            completions,
            vec![TweenDone {
                entity: id,
                channel: Channel::Scale,
                purpose: TweenPurpose::Hover,
            }]
        );
        let entity = registry.entity(id).expect("entity");
        assert!((entity.scale - 1.1).abs() <= 1e-4);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn replacement_cancels_without_completion() {
        let (mut registry, id) = registry_with_one();
        let mut scheduler = TweenScheduler::new();
        scheduler.spawn(Tween::new(id, Channel::Scale, 1.0, 1.1, 0.3));
        scheduler.tick(0.1, &mut registry);
        scheduler.spawn(Tween::new(id, Channel::Scale, 1.05, 1.0, 0.3));
        assert_eq!(scheduler.len(), 1);
        let mut completions = Vec::new();
        for _ in 0..40 {
            completions.extend(scheduler.tick(0.01, &mut registry));
        }
        // Only the replacement completes.
        assert_eq!(completions.len(), 1);
        let entity = registry.entity(id).expect("entity");
        assert!((entity.scale - 1.0).abs() <= 1e-4);
    }

    #[test]
    fn delayed_tween_holds_until_its_stagger_elapses() {
        let (mut registry, id) = registry_with_one();
        let home_y = registry.entity(id).expect("entity").position.y;
        let mut scheduler = TweenScheduler::new();
        scheduler.spawn(
            Tween::new(id, Channel::PositionY, home_y + 20.0, home_y, 1.0)
                .with_delay(0.5)
                .with_easing(Easing::BounceOut)
                .with_purpose(TweenPurpose::Entry),
        );
        scheduler.tick(0.4, &mut registry);
        // Still before the delay: value untouched.
        assert!((registry.entity(id).expect("entity").position.y - home_y).abs() <= 1e-4);
        let mut completions = Vec::new();
        for _ in 0..120 {
            completions.extend(scheduler.tick(0.0125, &mut registry));
        }
        assert_eq!(completions.len(), 1);
        assert!((registry.entity(id).expect("entity").position.y - home_y).abs() <= 1e-3);
    }

    #[test]
    fn bounce_out_lands_exactly_at_one() {
        assert!((Easing::BounceOut.ease(1.0) - 1.0).abs() <= 1e-6);
        assert!(Easing::BounceOut.ease(0.0).abs() <= 1e-6);
        // Overshoot-free at the tail of the curve.
        assert!(Easing::BounceOut.ease(0.99) <= 1.0 + 1e-4);
    }

    #[test]
    fn unbounded_yoyo_never_completes() {
        let (mut registry, id) = registry_with_one();
        let mut scheduler = TweenScheduler::new();
        scheduler.spawn(
            Tween::new(id, Channel::Emphasis, 0.0, 1.0, 0.5)
                .with_easing(Easing::SineInOut)
                .with_repeat(Repeat::Yoyo(None)),
        );
        let mut completions = Vec::new();
        for _ in 0..400 {
            completions.extend(scheduler.tick(0.016, &mut registry));
        }
        assert!(completions.is_empty());
        assert_eq!(scheduler.len(), 1);
        let emphasis = registry.entity(id).expect("entity").emphasis;
        assert!((0.0..=1.0).contains(&emphasis));
    }

    #[test]
    fn cancel_entity_drops_all_channels_silently() {
        let (mut registry, id) = registry_with_one();
        let mut scheduler = TweenScheduler::new();
        scheduler.spawn(Tween::new(id, Channel::Scale, 1.0, 1.2, 0.5));
        scheduler.spawn(Tween::new(id, Channel::Opacity, 1.0, 0.0, 0.5));
        scheduler.cancel_entity(id);
        assert!(scheduler.is_empty());
        assert!(scheduler.tick(1.0, &mut registry).is_empty());
    }
}
