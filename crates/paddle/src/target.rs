use glam::{Vec2, Vec3};

/// Non-owning handle to a request tracked by some external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request entity a paddle can follow.
pub trait RequestTarget {
    fn id(&self) -> RequestId;

    /// Predicted point where the request reaches the paddle column.
    fn finish(&self) -> Vec2;

    /// Seconds until the request reaches [`RequestTarget::finish`].
    fn arrival_time(&self) -> f32;

    fn colour(&self) -> Vec3;
}
