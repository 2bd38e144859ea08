//! Per-section gallery controller. One controller owns a viewport
//! session, the entities it laid out, their tweens, and the resource
//! ledger that proves teardown released everything. The controller never
//! touches the GPU; the viewer renders frame snapshots and performs the
//! texture loads the controller requests.

use std::path::PathBuf;

use glam::{Mat4, Vec3};
use log::{debug, info, warn};

use crate::catalog::{Catalog, GalleryPreset, SectionKind};
use crate::error::SceneError;
use crate::interaction::{CursorIcon, HoverKind, HoverState, Selection};
use crate::layout::{RingLayout, stagger_delay};
use crate::loader::{LoadGate, LoadTicket};
use crate::picking::{PointerNdc, pick_nearest};
use crate::registry::{Entity, EntityRegistry, Payload, VisualState};
use crate::resources::{ResourceHandle, ResourceKind, ResourceLedger};
use crate::tween::{Channel, Easing, Repeat, Tween, TweenPurpose, TweenScheduler};
use crate::viewport::{OrbitLimits, SurfaceDirectory, ViewportOptions, ViewportSession};

pub const HOVER_GROW: f32 = 1.1;
pub const CURRENT_GROW: f32 = 1.2;
/// Depth nudge toward the camera for the current video.
pub const CURRENT_NUDGE: f32 = 1.0;
pub const HOVER_SECONDS: f32 = 0.3;
pub const HIGHLIGHT_SECONDS: f32 = 0.5;
pub const EXPAND_SECONDS: f32 = 0.5;
pub const ENTRY_SECONDS: f32 = 1.0;

const IDLE_SPIN_RATE: f32 = 0.4;
const IDLE_BOB_AMPLITUDE: f32 = 0.15;
const IDLE_BOB_FREQUENCY: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Active,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStyle {
    /// Drop from above and settle with a bounce, staggered per index.
    BounceDrop,
    FadeIn,
    ScaleIn,
}

/// What clicking an entity means in this section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickBehavior {
    /// Mark the entity current and open its playback panel.
    SelectAndPlay,
    /// Fade the entity out and show its flat overlay, one at a time.
    ExpandOverlay,
    /// Hand the entity's URL to the shell.
    OpenLink,
}

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub section: SectionKind,
    pub layout: RingLayout,
    pub camera_distance: f32,
    pub orbit: Option<OrbitLimits>,
    pub entry: EntryStyle,
    pub stagger_increment: f32,
    pub click: ClickBehavior,
    pub base_scale: f32,
    pub hover_scale: f32,
    pub half_extents: Vec3,
    pub idle_motion: bool,
}

impl GalleryConfig {
    /// Section defaults, with optional catalog tuning applied on top.
    pub fn for_section(section: SectionKind, preset: Option<&GalleryPreset>) -> Self {
        let mut config = match section {
            SectionKind::Projects => Self {
                section,
                layout: RingLayout::tilted(10.0),
                camera_distance: 15.0,
                orbit: Some(OrbitLimits {
                    min_distance: 8.0,
                    max_distance: 25.0,
                }),
                entry: EntryStyle::BounceDrop,
                stagger_increment: 0.1,
                click: ClickBehavior::SelectAndPlay,
                base_scale: 1.0,
                hover_scale: HOVER_GROW,
                half_extents: Vec3::splat(1.25),
                idle_motion: true,
            },
            SectionKind::About => Self {
                section,
                layout: RingLayout::tilted(8.0),
                camera_distance: 15.0,
                orbit: Some(OrbitLimits {
                    min_distance: 6.0,
                    max_distance: 20.0,
                }),
                entry: EntryStyle::FadeIn,
                stagger_increment: 0.1,
                click: ClickBehavior::ExpandOverlay,
                base_scale: 1.0,
                hover_scale: HOVER_GROW,
                half_extents: Vec3::new(1.5, 1.0, 0.05),
                idle_motion: true,
            },
            SectionKind::Contacts => Self {
                section,
                layout: RingLayout::camera_facing(6.0),
                camera_distance: 12.0,
                orbit: None,
                entry: EntryStyle::ScaleIn,
                stagger_increment: 0.1,
                click: ClickBehavior::OpenLink,
                base_scale: 0.5,
                hover_scale: 0.7,
                half_extents: Vec3::splat(0.5),
                idle_motion: true,
            },
        };
        if let Some(preset) = preset {
            if let Some(radius) = preset.radius {
                config.layout.radius = radius;
            }
            if let Some(flatten_y) = preset.flatten_y {
                config.layout.flatten_y = flatten_y;
            }
            if let Some(flatten_z) = preset.flatten_z {
                config.layout.flatten_z = flatten_z;
            }
            if let Some(distance) = preset.camera_distance {
                config.camera_distance = distance;
            }
        }
        config
    }
}

/// Side effects the shell must act on; draining them is how panel state,
/// cursor shape, and external navigation leave the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEffect {
    CursorChanged(CursorIcon),
    OpenPlayback { embed_url: String, title: String },
    ClosePlayback,
    ShowOverlay { image: PathBuf, caption: String },
    HideOverlay,
    OpenExternal { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadSource {
    RemoteThumbnail(String),
    LocalImage(PathBuf),
    /// No asset behind the entity; the viewer synthesizes a texture.
    Procedural(String),
}

/// Texture work requested at init. The result must present the ticket;
/// stale tickets are dropped at the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub entity: usize,
    pub source: LoadSource,
}

#[derive(Debug, Clone, Copy)]
pub struct EntityFrame<'a> {
    pub identity: &'a str,
    pub model: Mat4,
    pub opacity: f32,
    pub emphasis: f32,
    pub state: VisualState,
    pub payload: &'a Payload,
}

/// Immutable per-frame view the renderer consumes.
pub struct FrameSnapshot<'a> {
    pub section: SectionKind,
    pub view_projection: Mat4,
    pub entities: Vec<EntityFrame<'a>>,
}

#[derive(Debug)]
pub struct GalleryController {
    config: GalleryConfig,
    phase: Phase,
    session: Option<ViewportSession>,
    registry: EntityRegistry,
    scheduler: TweenScheduler,
    hover: HoverState,
    selection: Selection,
    ledger: ResourceLedger,
    gate: LoadGate,
    pending_loads: Vec<LoadRequest>,
    /// Photo overlay bookkeeping: at most one expanded at a time, and a
    /// close finishes before the next expand starts.
    expanded: Option<usize>,
    closing: Option<usize>,
    pending_expand: Option<usize>,
    elapsed: f32,
}

impl GalleryController {
    pub fn new(config: GalleryConfig) -> Self {
        Self {
            config,
            phase: Phase::Uninitialized,
            session: None,
            registry: EntityRegistry::new(),
            scheduler: TweenScheduler::new(),
            hover: HoverState::new(),
            selection: Selection::new(),
            ledger: ResourceLedger::new(),
            gate: LoadGate::new(),
            pending_loads: Vec::new(),
            expanded: None,
            closing: None,
            pending_expand: None,
            elapsed: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn section(&self) -> SectionKind {
        self.config.section
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn session(&self) -> Option<&ViewportSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ViewportSession> {
        self.session.as_mut()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.current()
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Build the session, lay out the section's entities, start the
    /// entry choreography, and queue texture loads.
    pub fn init(
        &mut self,
        catalog: &Catalog,
        directory: &SurfaceDirectory,
    ) -> Result<(), SceneError> {
        if self.phase != Phase::Uninitialized {
            debug!(
                "gallery '{}' already initialized; skipping",
                self.config.section.title()
            );
            return Ok(());
        }
        let section = self.config.section;
        if catalog.section_len(section) == 0 {
            return Err(SceneError::EmptySection(section.title().to_string()));
        }
        let session = ViewportSession::create(
            section.container_id(),
            directory,
            ViewportOptions {
                camera_distance: self.config.camera_distance,
                orbit: self.config.orbit,
                ..ViewportOptions::default()
            },
        )?;
        self.session = Some(session);

        let count = catalog.section_len(section);
        for index in 0..count {
            let (identity, payload, source) = match section {
                SectionKind::Projects => {
                    let video = &catalog.videos[index];
                    (
                        format!("video:{}", video.id),
                        Payload::Video {
                            video_id: video.id.clone(),
                            title: video.title.clone(),
                        },
                        LoadSource::RemoteThumbnail(video.thumbnail_url()),
                    )
                }
                SectionKind::About => {
                    let photo = &catalog.photos[index];
                    (
                        format!("photo:{}", photo.id),
                        Payload::Photo {
                            image: photo.image.clone(),
                            caption: photo.caption.clone(),
                        },
                        LoadSource::LocalImage(photo.image.clone()),
                    )
                }
                SectionKind::Contacts => {
                    let contact = &catalog.contacts[index];
                    (
                        format!("contact:{}", contact.id),
                        Payload::Contact {
                            label: contact.label.clone(),
                            url: contact.url.clone(),
                        },
                        LoadSource::Procedural(contact.label.clone()),
                    )
                }
            };
            let slot = self.config.layout.slot(index, count);
            let entity =
                self.registry
                    .insert(&identity, payload, slot, self.config.half_extents);
            {
                let item = self
                    .registry
                    .entity_mut(entity)
                    .ok_or_else(|| SceneError::EmptySection(section.title().to_string()))?;
                item.scale = self.config.base_scale;
            }

            self.ledger
                .allocate(ResourceHandle::new(ResourceKind::Geometry, &identity));
            self.ledger
                .allocate(ResourceHandle::new(ResourceKind::Material, &identity));
            self.ledger
                .allocate(ResourceHandle::new(ResourceKind::Texture, &identity));
            self.pending_loads.push(LoadRequest {
                ticket: self.gate.issue(),
                entity,
                source,
            });

            self.spawn_entry(entity, index);
        }

        self.phase = Phase::Active;
        info!(
            "gallery '{}' initialized with {} entities",
            section.title(),
            count
        );
        Ok(())
    }

    fn spawn_entry(&mut self, entity: usize, index: usize) {
        let delay = stagger_delay(index, self.config.stagger_increment);
        let Some(item) = self.registry.entity(entity) else {
            return;
        };
        let home = item.home_position;
        let base = self.config.base_scale;
        match self.config.entry {
            EntryStyle::BounceDrop => {
                if let Some(item) = self.registry.entity_mut(entity) {
                    item.position.y = home.y + 20.0;
                }
                self.scheduler.spawn(
                    Tween::new(entity, Channel::PositionY, home.y + 20.0, home.y, ENTRY_SECONDS)
                        .with_delay(delay)
                        .with_easing(Easing::BounceOut)
                        .with_purpose(TweenPurpose::Entry),
                );
            }
            EntryStyle::FadeIn => {
                if let Some(item) = self.registry.entity_mut(entity) {
                    item.opacity = 0.0;
                }
                self.scheduler.spawn(
                    Tween::new(entity, Channel::Opacity, 0.0, 1.0, ENTRY_SECONDS)
                        .with_delay(delay)
                        .with_easing(Easing::SineInOut)
                        .with_purpose(TweenPurpose::Entry),
                );
            }
            EntryStyle::ScaleIn => {
                if let Some(item) = self.registry.entity_mut(entity) {
                    item.scale = 0.0;
                }
                self.scheduler.spawn(
                    Tween::new(entity, Channel::Scale, 0.0, base, ENTRY_SECONDS)
                        .with_delay(delay)
                        .with_easing(Easing::BounceOut)
                        .with_purpose(TweenPurpose::Entry),
                );
            }
        }
    }

    /// Drain texture work queued by `init`.
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.pending_loads)
    }

    /// Present a finished load. Returns true when the gallery still wants
    /// it; a stale ticket from a disposed generation is refused.
    pub fn complete_load(&mut self, ticket: LoadTicket, entity: usize) -> bool {
        if !self.gate.admits(ticket) {
            debug!("dropping stale texture load for entity {entity}");
            return false;
        }
        self.registry.entity(entity).is_some()
    }

    /// Feed the pointer position in container pixels.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> Vec<GalleryEffect> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        let target = self.entity_under(x, y);
        let (transitions, cursor) = self.hover.pointer_target(target);
        let mut effects = Vec::new();
        if !transitions.is_empty() {
            effects.push(GalleryEffect::CursorChanged(cursor));
        }
        for transition in transitions {
            let entity = transition.entity;
            let is_current = self.selection.current() == Some(entity);
            match transition.kind {
                HoverKind::Begin => {
                    if let Some(item) = self.registry.entity_mut(entity) {
                        if item.visual_state == VisualState::Default {
                            item.visual_state = VisualState::Hovered;
                        }
                    }
                    // The current item already holds its larger scale.
                    if !is_current {
                        let from = self
                            .registry
                            .entity(entity)
                            .map(|item| item.scale)
                            .unwrap_or(self.config.base_scale);
                        self.scheduler.spawn(
                            Tween::new(
                                entity,
                                Channel::Scale,
                                from,
                                self.config.hover_scale,
                                HOVER_SECONDS,
                            )
                            .with_purpose(TweenPurpose::Hover),
                        );
                    }
                }
                HoverKind::End => {
                    if let Some(item) = self.registry.entity_mut(entity) {
                        if item.visual_state == VisualState::Hovered {
                            item.visual_state = VisualState::Default;
                        }
                    }
                    if !is_current {
                        let from = self
                            .registry
                            .entity(entity)
                            .map(|item| item.scale)
                            .unwrap_or(self.config.hover_scale);
                        self.scheduler.spawn(
                            Tween::new(
                                entity,
                                Channel::Scale,
                                from,
                                self.config.base_scale,
                                HOVER_SECONDS,
                            )
                            .with_purpose(TweenPurpose::Hover),
                        );
                    }
                }
            }
        }
        effects
    }

    /// Handle a primary click at the given container pixel position.
    pub fn pointer_clicked(&mut self, x: f32, y: f32) -> Vec<GalleryEffect> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        let target = self.entity_under(x, y);
        match self.config.click {
            ClickBehavior::SelectAndPlay => self.click_select(target),
            ClickBehavior::ExpandOverlay => self.click_expand(target),
            ClickBehavior::OpenLink => self.click_link(target),
        }
    }

    fn click_select(&mut self, target: Option<usize>) -> Vec<GalleryEffect> {
        let Some(entity) = target else {
            return Vec::new();
        };
        let Some(change) = self.selection.select(Some(entity)) else {
            // Re-selecting the current item is a no-op.
            return Vec::new();
        };
        let mut effects = Vec::new();
        if let Some(previous) = change.previous {
            self.demote(previous);
        }
        if let Some(item) = self.registry.entity_mut(entity) {
            item.visual_state = VisualState::Current;
            let home = item.home_position;
            let scale = item.scale;
            let z = item.position.z;
            self.scheduler.spawn(
                Tween::new(entity, Channel::Scale, scale, CURRENT_GROW, HIGHLIGHT_SECONDS)
                    .with_purpose(TweenPurpose::Highlight),
            );
            self.scheduler.spawn(
                Tween::new(
                    entity,
                    Channel::PositionZ,
                    z,
                    home.z + CURRENT_NUDGE,
                    HIGHLIGHT_SECONDS,
                )
                .with_purpose(TweenPurpose::Highlight),
            );
            self.scheduler.spawn(
                Tween::new(entity, Channel::Emphasis, 0.0, 1.0, HIGHLIGHT_SECONDS)
                    .with_purpose(TweenPurpose::Highlight),
            );
        }
        if let Some(Payload::Video { video_id, title }) =
            self.registry.entity(entity).map(|item| &item.payload)
        {
            effects.push(GalleryEffect::OpenPlayback {
                embed_url: format!("https://www.youtube.com/embed/{video_id}?autoplay=1"),
                title: title.clone(),
            });
        }
        effects
    }

    /// Return a previously current entity to its resting look.
    fn demote(&mut self, entity: usize) {
        let Some(item) = self.registry.entity_mut(entity) else {
            return;
        };
        item.visual_state = VisualState::Default;
        let home = item.home_position;
        let scale = item.scale;
        let z = item.position.z;
        let emphasis = item.emphasis;
        self.scheduler.spawn(
            Tween::new(
                entity,
                Channel::Scale,
                scale,
                self.config.base_scale,
                HIGHLIGHT_SECONDS,
            )
            .with_purpose(TweenPurpose::Highlight),
        );
        self.scheduler.spawn(
            Tween::new(entity, Channel::PositionZ, z, home.z, HIGHLIGHT_SECONDS)
                .with_purpose(TweenPurpose::Highlight),
        );
        self.scheduler.spawn(
            Tween::new(entity, Channel::Emphasis, emphasis, 0.0, HIGHLIGHT_SECONDS)
                .with_purpose(TweenPurpose::Highlight),
        );
    }

    fn click_expand(&mut self, target: Option<usize>) -> Vec<GalleryEffect> {
        match (target, self.expanded) {
            (Some(entity), None) if self.closing.is_none() => self.begin_expand(entity),
            (Some(entity), Some(open)) if entity != open => {
                // Close the open overlay first; the new expand waits for
                // the collapse to finish.
                self.pending_expand = Some(entity);
                self.begin_collapse(open)
            }
            (Some(_), Some(_)) => Vec::new(),
            (Some(entity), None) => {
                // A collapse is still running; queue behind it.
                self.pending_expand = Some(entity);
                Vec::new()
            }
            (None, Some(open)) => self.begin_collapse(open),
            (None, None) => Vec::new(),
        }
    }

    fn begin_expand(&mut self, entity: usize) -> Vec<GalleryEffect> {
        let Some(item) = self.registry.entity_mut(entity) else {
            return Vec::new();
        };
        item.visual_state = VisualState::Expanded;
        let opacity = item.opacity;
        self.expanded = Some(entity);
        self.scheduler.spawn(
            Tween::new(entity, Channel::Opacity, opacity, 0.0, EXPAND_SECONDS)
                .with_purpose(TweenPurpose::Expand),
        );
        let Some(Payload::Photo { image, caption }) =
            self.registry.entity(entity).map(|item| &item.payload)
        else {
            return Vec::new();
        };
        vec![GalleryEffect::ShowOverlay {
            image: image.clone(),
            caption: caption.clone(),
        }]
    }

    fn begin_collapse(&mut self, entity: usize) -> Vec<GalleryEffect> {
        self.expanded = None;
        self.closing = Some(entity);
        if let Some(item) = self.registry.entity_mut(entity) {
            item.visible = true;
            item.visual_state = VisualState::Default;
            let opacity = item.opacity;
            self.scheduler.spawn(
                Tween::new(entity, Channel::Opacity, opacity, 1.0, EXPAND_SECONDS)
                    .with_purpose(TweenPurpose::Collapse),
            );
        }
        vec![GalleryEffect::HideOverlay]
    }

    fn click_link(&mut self, target: Option<usize>) -> Vec<GalleryEffect> {
        let Some(entity) = target else {
            return Vec::new();
        };
        let Some(Payload::Contact { url, label }) =
            self.registry.entity(entity).map(|item| &item.payload)
        else {
            return Vec::new();
        };
        debug!("opening contact link '{label}'");
        vec![GalleryEffect::OpenExternal { url: url.clone() }]
    }

    /// Close whatever panel is open: collapse the expanded photo, or
    /// drop the current video back to its resting look.
    pub fn dismiss(&mut self) -> Vec<GalleryEffect> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        if let Some(open) = self.expanded {
            return self.begin_collapse(open);
        }
        if let Some(current) = self.selection.current() {
            self.selection.reset();
            self.demote(current);
            return vec![GalleryEffect::ClosePlayback];
        }
        Vec::new()
    }

    /// Advance animations and idle motion by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Vec<GalleryEffect> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        self.elapsed += dt;
        let mut effects = Vec::new();

        let completions = self.scheduler.tick(dt, &mut self.registry);
        for done in completions {
            match done.purpose {
                TweenPurpose::Expand => {
                    // Fully faded: hide the 3D visual behind the overlay.
                    if let Some(item) = self.registry.entity_mut(done.entity) {
                        item.visible = false;
                    }
                }
                TweenPurpose::Collapse => {
                    if self.closing == Some(done.entity) {
                        self.closing = None;
                    }
                    if let Some(next) = self.pending_expand.take() {
                        effects.extend(self.begin_expand(next));
                    }
                }
                _ => {}
            }
        }

        if self.config.idle_motion {
            for index in 0..self.registry.len() {
                // Expanded entities sit behind the overlay; the one mid-close
                // is still animating back. Neither takes idle motion.
                if self.closing == Some(index) {
                    continue;
                }
                let entry_settling = self.scheduler.has_active(index, Channel::PositionY);
                if let Some(item) = self.registry.entity_mut(index) {
                    if item.visual_state == VisualState::Expanded {
                        continue;
                    }
                    item.spin += dt * IDLE_SPIN_RATE;
                    item.bob = if entry_settling {
                        0.0
                    } else {
                        (self.elapsed * IDLE_BOB_FREQUENCY + index as f32).sin()
                            * IDLE_BOB_AMPLITUDE
                    };
                }
            }
        }

        if let Some(session) = self.session.as_mut() {
            session.update_controls();
        }
        effects
    }

    fn entity_under(&self, x: f32, y: f32) -> Option<usize> {
        let session = self.session.as_ref()?;
        let (width, height) = session.size();
        let ndc = PointerNdc::from_screen(x, y, width as f32, height as f32);
        let ray = session.camera.pointer_ray(ndc)?;
        pick_nearest(ray, &self.registry).map(|hit| hit.entity)
    }

    pub fn snapshot(&self) -> Option<FrameSnapshot<'_>> {
        let session = self.session.as_ref()?;
        let entities = self
            .registry
            .entities()
            .iter()
            .filter(|entity| entity.visible)
            .map(|entity: &Entity| EntityFrame {
                identity: entity.identity.as_str(),
                model: entity.model_matrix(),
                opacity: entity.opacity,
                emphasis: entity.emphasis,
                state: entity.visual_state,
                payload: &entity.payload,
            })
            .collect();
        Some(FrameSnapshot {
            section: self.config.section,
            view_projection: session.camera.view_projection(),
            entities,
        })
    }

    /// Tear the gallery down: cancel animations, release every tracked
    /// resource, invalidate in-flight loads, detach the session. Safe to
    /// call more than once; repeats release nothing further.
    pub fn dispose(&mut self) -> usize {
        if self.phase == Phase::Disposed {
            return 0;
        }
        self.phase = Phase::Disposed;
        self.scheduler.clear();
        self.hover.reset();
        self.selection.reset();
        self.expanded = None;
        self.closing = None;
        self.pending_expand = None;
        self.pending_loads.clear();
        self.gate.advance();
        let released = self.ledger.release_all();
        if self.ledger.outstanding() > 0 {
            warn!(
                "gallery '{}' leaked {} resources",
                self.config.section.title(),
                self.ledger.outstanding()
            );
        }
        self.registry.clear();
        if let Some(session) = self.session.as_mut() {
            session.dispose();
        }
        info!(
            "gallery '{}' disposed, released {released} resources",
            self.config.section.title()
        );
        released
    }
}

/// Looping emphasis pulse for an entity; used by the landing hotspots.
pub fn spawn_pulse(scheduler: &mut TweenScheduler, entity: usize) {
    scheduler.spawn(
        Tween::new(entity, Channel::Emphasis, 0.0, 1.0, 0.8)
            .with_easing(Easing::SineInOut)
            .with_repeat(Repeat::Yoyo(None))
            .with_purpose(TweenPurpose::Highlight),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    fn directory() -> SurfaceDirectory {
        let mut directory = SurfaceDirectory::new();
        directory.register("projects-3d-container", 1280, 720);
        directory.register("about-3d-container", 1280, 720);
        directory.register("contacts-3d-container", 1280, 720);
        directory
    }

    fn active(section: SectionKind) -> GalleryController {
        let catalog = default_catalog();
        let mut controller =
            GalleryController::new(GalleryConfig::for_section(section, None));
        controller
            .init(&catalog, &directory())
            .expect("gallery init");
        controller
    }

    /// Run entry choreography to completion so home poses are restored.
    fn settle(controller: &mut GalleryController) {
        for _ in 0..400 {
            controller.tick(0.016);
        }
    }

    fn screen_position(controller: &GalleryController, entity: usize) -> (f32, f32) {
        let session = controller.session().expect("session");
        let (width, height) = session.size();
        let position = controller
            .registry()
            .entity(entity)
            .expect("entity")
            .position;
        let clip = session.camera.view_projection() * position.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        (
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        )
    }

    #[test]
    fn init_lays_out_every_catalog_entry() {
        let catalog = default_catalog();
        let controller = active(SectionKind::Projects);
        assert_eq!(controller.phase(), Phase::Active);
        assert_eq!(controller.registry().len(), catalog.videos.len());
    }

    #[test]
    fn init_twice_is_a_no_op() {
        let catalog = default_catalog();
        let mut controller = active(SectionKind::Projects);
        controller.take_load_requests();
        assert!(controller.init(&catalog, &directory()).is_ok());
        assert_eq!(controller.phase(), Phase::Active);
        // No duplicate entities, no re-queued loads.
        assert_eq!(controller.registry().len(), catalog.videos.len());
        assert!(controller.take_load_requests().is_empty());
    }

    #[test]
    fn init_queues_one_load_per_entity() {
        let mut controller = active(SectionKind::Projects);
        let requests = controller.take_load_requests();
        assert_eq!(requests.len(), controller.registry().len());
        assert!(requests
            .iter()
            .all(|request| matches!(request.source, LoadSource::RemoteThumbnail(_))));
        // Drained once; a second take yields nothing.
        assert!(controller.take_load_requests().is_empty());
    }

    #[test]
    fn hover_grows_and_release_restores() {
        let mut controller = active(SectionKind::Projects);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 2);
        let effects = controller.pointer_moved(x, y);
        assert!(effects.contains(&GalleryEffect::CursorChanged(CursorIcon::Pointer)));
        settle(&mut controller);
        let entity = controller.registry().entity(2).expect("entity");
        assert_eq!(entity.visual_state, VisualState::Hovered);
        assert!((entity.scale - HOVER_GROW).abs() <= 1e-3);

        // Idempotent while the pointer stays put.
        assert!(controller.pointer_moved(x, y).is_empty());

        let effects = controller.pointer_moved(0.0, 0.0);
        assert!(effects.contains(&GalleryEffect::CursorChanged(CursorIcon::Default)));
        settle(&mut controller);
        let entity = controller.registry().entity(2).expect("entity");
        assert_eq!(entity.visual_state, VisualState::Default);
        assert!((entity.scale - 1.0).abs() <= 1e-3);
    }

    #[test]
    fn selecting_a_video_highlights_it_and_opens_playback() {
        let mut controller = active(SectionKind::Projects);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 1);
        let effects = controller.pointer_clicked(x, y);
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, GalleryEffect::OpenPlayback { embed_url, .. }
                if embed_url.contains("autoplay=1"))));
        settle(&mut controller);
        let entity = controller.registry().entity(1).expect("entity");
        assert_eq!(entity.visual_state, VisualState::Current);
        assert!((entity.scale - CURRENT_GROW).abs() <= 1e-3);
        assert!(
            (entity.position.z - (entity.home_position.z + CURRENT_NUDGE)).abs() <= 1e-3
        );
        assert!((entity.emphasis - 1.0).abs() <= 1e-3);

        // Clicking the same video again is a no-op.
        let (x, y) = screen_position(&controller, 1);
        assert!(controller.pointer_clicked(x, y).is_empty());
    }

    #[test]
    fn selecting_another_video_demotes_the_previous_one() {
        let mut controller = active(SectionKind::Projects);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 1);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 4);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let previous = controller.registry().entity(1).expect("entity");
        assert_eq!(previous.visual_state, VisualState::Default);
        assert!((previous.scale - 1.0).abs() <= 1e-3);
        assert!((previous.position.z - previous.home_position.z).abs() <= 1e-3);
        assert!(previous.emphasis.abs() <= 1e-3);
        let current = controller.registry().entity(4).expect("entity");
        assert_eq!(current.visual_state, VisualState::Current);
    }

    #[test]
    fn expanding_a_photo_fades_it_and_shows_the_overlay() {
        let mut controller = active(SectionKind::About);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 0);
        let effects = controller.pointer_clicked(x, y);
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, GalleryEffect::ShowOverlay { .. })));
        assert_eq!(controller.expanded(), Some(0));
        settle(&mut controller);
        let entity = controller.registry().entity(0).expect("entity");
        assert!(!entity.visible);
        assert!(entity.opacity <= 1e-3);
    }

    #[test]
    fn clicking_empty_space_closes_the_open_overlay() {
        let mut controller = active(SectionKind::About);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 0);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let effects = controller.pointer_clicked(1.0, 1.0);
        assert!(effects.contains(&GalleryEffect::HideOverlay));
        assert_eq!(controller.expanded(), None);
        settle(&mut controller);
        let entity = controller.registry().entity(0).expect("entity");
        assert!(entity.visible);
        assert!((entity.opacity - 1.0).abs() <= 1e-3);
    }

    #[test]
    fn idle_motion_leaves_the_expanded_photo_still() {
        let mut controller = active(SectionKind::About);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 0);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let before = controller.registry().entity(0).expect("entity");
        let (spin, bob) = (before.spin, before.bob);
        controller.tick(0.016);
        let after = controller.registry().entity(0).expect("entity");
        assert_eq!(after.spin, spin);
        assert_eq!(after.bob, bob);
        // The rest of the ring keeps drifting.
        let neighbour = controller.registry().entity(1).expect("entity");
        assert!(neighbour.spin > 0.0);
    }

    #[test]
    fn second_photo_waits_for_the_first_to_close() {
        let mut controller = active(SectionKind::About);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 0);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 5);
        let effects = controller.pointer_clicked(x, y);
        // The close starts immediately; the new overlay is not shown yet.
        assert!(effects.contains(&GalleryEffect::HideOverlay));
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, GalleryEffect::ShowOverlay { .. })));
        let mut opened = Vec::new();
        for _ in 0..400 {
            opened.extend(controller.tick(0.016));
        }
        assert!(opened
            .iter()
            .any(|effect| matches!(effect, GalleryEffect::ShowOverlay { .. })));
        assert_eq!(controller.expanded(), Some(5));
        let first = controller.registry().entity(0).expect("entity");
        assert!(first.visible);
    }

    #[test]
    fn dismiss_closes_playback_and_demotes_the_video() {
        let mut controller = active(SectionKind::Projects);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 1);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let effects = controller.dismiss();
        assert!(effects.contains(&GalleryEffect::ClosePlayback));
        assert_eq!(controller.selected(), None);
        settle(&mut controller);
        let entity = controller.registry().entity(1).expect("entity");
        assert_eq!(entity.visual_state, VisualState::Default);
        assert!((entity.scale - 1.0).abs() <= 1e-3);
    }

    #[test]
    fn contact_click_hands_out_the_link() {
        let mut controller = active(SectionKind::Contacts);
        settle(&mut controller);
        let (x, y) = screen_position(&controller, 0);
        let effects = controller.pointer_clicked(x, y);
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, GalleryEffect::OpenExternal { url } if !url.is_empty())));
    }

    #[test]
    fn dispose_releases_everything_and_goes_quiet() {
        let mut controller = active(SectionKind::Projects);
        settle(&mut controller);
        let expected = controller.registry().len() * 3;
        let released = controller.dispose();
        assert_eq!(released, expected);
        assert_eq!(controller.phase(), Phase::Disposed);
        assert!(controller.registry().is_empty());
        // Idempotent: a second dispose releases nothing.
        assert_eq!(controller.dispose(), 0);
        assert!(controller.pointer_moved(100.0, 100.0).is_empty());
        assert!(controller.tick(0.016).is_empty());
    }

    #[test]
    fn stale_load_ticket_is_refused_after_dispose() {
        let mut controller = active(SectionKind::Projects);
        let requests = controller.take_load_requests();
        let first = requests.first().expect("request").clone();
        assert!(controller.complete_load(first.ticket, first.entity));
        controller.dispose();
        assert!(!controller.complete_load(first.ticket, first.entity));
    }

    #[test]
    fn entry_choreography_staggers_by_display_index() {
        let controller = active(SectionKind::Projects);
        // All entities start lifted; the controller settles them over
        // roughly one second plus stagger.
        for entity in controller.registry().entities() {
            assert!(entity.position.y > entity.home_position.y + 10.0);
        }
        let mut controller = controller;
        settle(&mut controller);
        for entity in controller.registry().entities() {
            assert!((entity.position.y - entity.home_position.y).abs() <= 1e-3);
        }
    }

    #[test]
    fn snapshot_skips_hidden_entities() {
        let mut controller = active(SectionKind::About);
        settle(&mut controller);
        let total = controller.registry().len();
        let (x, y) = screen_position(&controller, 0);
        controller.pointer_clicked(x, y);
        settle(&mut controller);
        let snapshot = controller.snapshot().expect("snapshot");
        assert_eq!(snapshot.entities.len(), total - 1);
    }
}
