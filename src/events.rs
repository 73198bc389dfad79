use crate::renderer::RenderId;
use crate::shapes::ShapeKind;
use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec3;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaygroundEvent {
    EntitySpawned { entity: Entity, kind: ShapeKind },
    EntityCulled { entity: Entity, render: RenderId },
    EntityRemoved { entity: Entity, render: RenderId },
    ImpactCue { entity: Entity, magnitude: f32 },
    DragStarted { entity: Entity },
    DragReleased { entity: Entity, velocity: Vec3 },
    DragCancelled { entity: Entity },
    GravityGunEngaged { anchor: Vec3, captured: usize },
    GravityGunReleased,
    BlastScheduled { count: usize },
}

impl PlaygroundEvent {
    /// Render node that must be disposed because of this event, if any.
    pub fn disposed_render(&self) -> Option<RenderId> {
        match self {
            PlaygroundEvent::EntityCulled { render, .. } | PlaygroundEvent::EntityRemoved { render, .. } => {
                Some(*render)
            }
            _ => None,
        }
    }
}

impl fmt::Display for PlaygroundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaygroundEvent::EntitySpawned { entity, kind } => {
                write!(f, "EntitySpawned entity={} kind={}", entity.index(), kind.label())
            }
            PlaygroundEvent::EntityCulled { entity, render } => {
                write!(f, "EntityCulled entity={} render={}", entity.index(), render.0)
            }
            PlaygroundEvent::EntityRemoved { entity, render } => {
                write!(f, "EntityRemoved entity={} render={}", entity.index(), render.0)
            }
            PlaygroundEvent::ImpactCue { entity, magnitude } => {
                write!(f, "ImpactCue entity={} magnitude={:.3}", entity.index(), magnitude)
            }
            PlaygroundEvent::DragStarted { entity } => write!(f, "DragStarted entity={}", entity.index()),
            PlaygroundEvent::DragReleased { entity, velocity } => {
                write!(f, "DragReleased entity={} speed={:.3}", entity.index(), velocity.length())
            }
            PlaygroundEvent::DragCancelled { entity } => write!(f, "DragCancelled entity={}", entity.index()),
            PlaygroundEvent::GravityGunEngaged { anchor, captured } => write!(
                f,
                "GravityGunEngaged anchor=({:.2}, {:.2}, {:.2}) captured={}",
                anchor.x, anchor.y, anchor.z, captured
            ),
            PlaygroundEvent::GravityGunReleased => write!(f, "GravityGunReleased"),
            PlaygroundEvent::BlastScheduled { count } => write!(f, "BlastScheduled count={count}"),
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<PlaygroundEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: PlaygroundEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<PlaygroundEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
