//! Subscriber lists for collision events.
//!
//! Each collider system owns one list. Events gathered during a system pass
//! are dispatched when that pass finishes, to every subscriber in
//! registration order, on the caller's stack.

use hecs::World;

use crate::events::CollisionEvent;

type Subscriber = Box<dyn FnMut(&mut World, &CollisionEvent)>;

#[derive(Default)]
pub struct CollisionCallbacks {
    subscribers: Vec<Subscriber>,
}

impl CollisionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&mut World, &CollisionEvent) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn dispatch(&mut self, world: &mut World, events: &[CollisionEvent]) {
        for event in events {
            for subscriber in &mut self.subscribers {
                subscriber(world, event);
            }
        }
    }
}
