use glam::Vec3;

/// Axis-aligned box published to the host as center + size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    /// Zero-size box at the origin; the result for an absent curve.
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        size: Vec3::ZERO,
    };

    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Inclusive containment test with a small tolerance.
    #[must_use]
    pub fn contains(&self, point: Vec3, epsilon: f32) -> bool {
        let min = self.min() - Vec3::splat(epsilon);
        let max = self.max() + Vec3::splat(epsilon);
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

/// Grows a box one position at a time.
///
/// The first position seeds a zero-size box; later ones encapsulate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsAccumulator {
    extent: Option<(Vec3, Vec3)>,
}

impl BoundsAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encapsulate(&mut self, point: Vec3) {
        self.extent = Some(match self.extent {
            None => (point, point),
            Some((min, max)) => (min.min(point), max.max(point)),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extent.is_none()
    }

    /// The accumulated box, or [`Bounds::EMPTY`] if nothing was added.
    #[must_use]
    pub fn finish(&self) -> Bounds {
        self.extent
            .map_or(Bounds::EMPTY, |(min, max)| Bounds::from_min_max(min, max))
    }
}

impl Extend<Vec3> for BoundsAccumulator {
    fn extend<T: IntoIterator<Item = Vec3>>(&mut self, iter: T) {
        for point in iter {
            self.encapsulate(point);
        }
    }
}
