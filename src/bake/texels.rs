//! Buffer Packer
//!
//! Lays a 1-D sample sequence out as a square, power-of-two grid of
//! half-float RGBA texels, row-major from texel 0.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use half::f16;

/// One RGBA16F texel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Texel(pub [f16; 4]);

impl Texel {
    pub const ZERO: Self = Self([f16::ZERO; 4]);

    /// Written to every texel when the curve source is absent: zero position
    /// with a unit auxiliary channel, which also reads as an identity
    /// quaternion in the rotation map.
    pub const SENTINEL: Self = Self([f16::ZERO, f16::ZERO, f16::ZERO, f16::ONE]);

    #[must_use]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self([
            f16::from_f32(x),
            f16::from_f32(y),
            f16::from_f32(z),
            f16::from_f32(w),
        ])
    }

    /// Position texel: `(x, y, z, auxiliary)`.
    #[must_use]
    pub fn from_position(position: Vec3, auxiliary: f32) -> Self {
        Self::new(position.x, position.y, position.z, auxiliary)
    }

    /// Rotation texel: `(qx, qy, qz, qw)`.
    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self::new(rotation.x, rotation.y, rotation.z, rotation.w)
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        self.0.map(f16::to_f32)
    }

    #[must_use]
    pub fn xyz(self) -> Vec3 {
        let [x, y, z, _] = self.to_array();
        Vec3::new(x, y, z)
    }

    #[must_use]
    pub fn w(self) -> f32 {
        self.0[3].to_f32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFormat {
    #[default]
    Rgba16Float,
}

impl TextureFormat {
    #[must_use]
    pub fn bytes_per_texel(self) -> usize {
        match self {
            TextureFormat::Rgba16Float => std::mem::size_of::<Texel>(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Side length of the square grid holding `point_count` texels.
///
/// The smallest power of two whose square is at least `point_count`.
#[must_use]
pub fn side_length(point_count: usize) -> u32 {
    let mut side = point_count.isqrt();
    if side * side < point_count {
        side += 1;
    }
    // A 0 or 1 point request still needs one texel.
    let side = side.max(1).next_power_of_two();
    u32::try_from(side).unwrap_or(u32::MAX)
}

// ============================================================================
// Texel buffer
// ============================================================================

/// CPU-side storage of one baked map.
///
/// `version` changes whenever texel data is written; `generation_id` only
/// when the buffer is reallocated.
#[derive(Debug, Clone, PartialEq)]
pub struct TexelBuffer {
    side: u32,
    texels: Vec<Texel>,
    format: TextureFormat,
    filter: FilterMode,
    version: u64,
    generation_id: u64,
}

impl TexelBuffer {
    /// A zeroed `side × side` buffer with nearest filtering.
    #[must_use]
    pub fn new(side: u32) -> Self {
        let len = side as usize * side as usize;
        Self {
            side,
            texels: vec![Texel::ZERO; len],
            format: TextureFormat::Rgba16Float,
            filter: FilterMode::Nearest,
            version: 1,
            generation_id: 1,
        }
    }

    #[must_use]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.side
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.side
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.texels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    #[must_use]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[must_use]
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Point sampling only; interpolating between neighbouring samples
    /// would blend unrelated points.
    pub fn set_filter(&mut self, filter: FilterMode) {
        if filter != FilterMode::Nearest {
            log::warn!("Texel buffers are always point-sampled; ignoring {filter:?}");
        }
        self.filter = FilterMode::Nearest;
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn generation_id(&self) -> u64 {
        self.generation_id
    }

    #[must_use]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    #[must_use]
    pub fn texel(&self, index: usize) -> Option<Texel> {
        self.texels.get(index).copied()
    }

    #[must_use]
    pub fn texel_at(&self, x: u32, y: u32) -> Option<Texel> {
        if x >= self.side || y >= self.side {
            return None;
        }
        self.texel(y as usize * self.side as usize + x as usize)
    }

    /// Raw upload bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Row pitch in bytes.
    #[must_use]
    pub fn bytes_per_row(&self) -> usize {
        self.side as usize * self.format.bytes_per_texel()
    }

    /// Writes `texels` starting at texel 0; trailing texels keep their content.
    pub fn write(&mut self, texels: impl IntoIterator<Item = Texel>) {
        for (slot, texel) in self.texels.iter_mut().zip(texels) {
            *slot = texel;
        }
        self.version = self.version.wrapping_add(1);
    }

    /// Overwrites every texel.
    pub fn fill(&mut self, texel: Texel) {
        self.texels.fill(texel);
        self.version = self.version.wrapping_add(1);
    }

    fn reallocate(&mut self, side: u32) {
        self.side = side;
        self.texels.clear();
        self.texels.resize(side as usize * side as usize, Texel::ZERO);
        self.generation_id = self.generation_id.wrapping_add(1);
        self.version = self.version.wrapping_add(1);
    }
}

// ============================================================================
// Path buffers
// ============================================================================

/// The position and rotation maps owned by one binder.
#[derive(Debug, Clone, Default)]
pub struct PathBuffers {
    point_count: usize,
    maps: Option<(TexelBuffer, TexelBuffer)>,
}

impl PathBuffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure both maps exist and are sized for `point_count`.
    ///
    /// Returns `true` if storage was (re)allocated.
    pub fn ensure(&mut self, point_count: usize) -> bool {
        let side = side_length(point_count);
        match &mut self.maps {
            Some((position, rotation)) if self.point_count == point_count => {
                debug_assert_eq!(position.side(), rotation.side());
                false
            }
            Some((position, rotation)) => {
                log::info!(
                    "Resizing path maps: {} -> {point_count} points ({side}x{side})",
                    self.point_count
                );
                position.reallocate(side);
                rotation.reallocate(side);
                self.point_count = point_count;
                true
            }
            None => {
                log::info!("Allocating path maps: {point_count} points ({side}x{side})");
                self.maps = Some((TexelBuffer::new(side), TexelBuffer::new(side)));
                self.point_count = point_count;
                true
            }
        }
    }

    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.maps.is_some()
    }

    /// Point count the maps are currently sized for.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    #[must_use]
    pub fn position_map(&self) -> Option<&TexelBuffer> {
        self.maps.as_ref().map(|(position, _)| position)
    }

    #[must_use]
    pub fn rotation_map(&self) -> Option<&TexelBuffer> {
        self.maps.as_ref().map(|(_, rotation)| rotation)
    }

    pub(crate) fn maps_mut(&mut self) -> Option<(&mut TexelBuffer, &mut TexelBuffer)> {
        self.maps
            .as_mut()
            .map(|(position, rotation)| (position, rotation))
    }

    /// Writes the absent-curve sentinel into every texel of both maps.
    pub fn fill_sentinel(&mut self) {
        if let Some((position, rotation)) = self.maps_mut() {
            position.fill(Texel::SENTINEL);
            rotation.fill(Texel::SENTINEL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_is_smallest_power_of_two() {
        assert_eq!(side_length(1), 1);
        assert_eq!(side_length(2), 2);
        assert_eq!(side_length(4), 2);
        assert_eq!(side_length(5), 4);
        assert_eq!(side_length(16), 4);
        assert_eq!(side_length(17), 8);
        assert_eq!(side_length(64), 8);
        assert_eq!(side_length(65), 16);
    }

    #[test]
    fn texel_is_eight_bytes() {
        assert_eq!(std::mem::size_of::<Texel>(), 8);
        let buffer = TexelBuffer::new(4);
        assert_eq!(buffer.as_bytes().len(), 4 * 4 * 8);
        assert_eq!(buffer.bytes_per_row(), 32);
    }

    #[test]
    fn ensure_reallocates_only_on_point_count_change() {
        let mut buffers = PathBuffers::new();
        assert!(buffers.ensure(5));
        let generation = buffers.position_map().unwrap().generation_id();
        assert!(!buffers.ensure(5));
        assert!(buffers.ensure(6));
        assert_eq!(buffers.position_map().unwrap().side(), 4);
        assert_ne!(buffers.position_map().unwrap().generation_id(), generation);
    }
}
