//! CPU reference of the IBL integrals.
//!
//! The same estimators the bake shaders evaluate per texel: the diffuse
//! irradiance hemisphere sum, the GGX prefiltered radiance and the
//! split-sum BRDF table. Used to bake small maps headless and to check
//! the GPU bakes against known answers.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

use crate::graphics_device::CubeFace;

/// Angular step of the irradiance hemisphere sum, in radians
pub const IRRADIANCE_SAMPLE_DELTA: f32 = 0.025;

/// Van der Corput radical inverse in base 2
pub fn radical_inverse_vdc(bits: u32) -> f32 {
    bits.reverse_bits() as f32 * 2.328_306_4e-10
}

/// Point `i` of an `n`-point Hammersley set in [0, 1)²
pub fn hammersley(i: u32, n: u32) -> Vec2 {
    Vec2::new(i as f32 / n as f32, radical_inverse_vdc(i))
}

/// GGX-distributed half vector around `normal` for the sample `xi`
pub fn importance_sample_ggx(xi: Vec2, normal: Vec3, roughness: f32) -> Vec3 {
    let a = roughness * roughness;

    let phi = TAU * xi.x;
    let cos_theta = ((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y)).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let h = Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta);

    let (tangent, bitangent) = tangent_frame(normal);
    (tangent * h.x + bitangent * h.y + normal * h.z).normalize()
}

/// Schlick-GGX geometry term with the IBL remapping `k = roughness² / 2`
pub fn geometry_schlick_ggx_ibl(n_dot_v: f32, roughness: f32) -> f32 {
    let k = (roughness * roughness) / 2.0;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

/// Smith geometry term for view and light directions
pub fn geometry_smith_ibl(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    geometry_schlick_ggx_ibl(n_dot_v, roughness) * geometry_schlick_ggx_ibl(n_dot_l, roughness)
}

/// Split-sum scale and bias of the Fresnel term
pub fn integrate_brdf(n_dot_v: f32, roughness: f32, sample_count: u32) -> Vec2 {
    let v = Vec3::new((1.0 - n_dot_v * n_dot_v).max(0.0).sqrt(), 0.0, n_dot_v);
    let n = Vec3::Z;

    let mut scale = 0.0;
    let mut bias = 0.0;
    for i in 0..sample_count {
        let h = importance_sample_ggx(hammersley(i, sample_count), n, roughness);
        let l = (2.0 * v.dot(h) * h - v).normalize();

        let n_dot_l = l.z.max(0.0);
        let n_dot_h = h.z.max(0.0);
        let v_dot_h = v.dot(h).max(0.0);
        if n_dot_l > 0.0 {
            let g = geometry_smith_ibl(n_dot_v, n_dot_l, roughness);
            let g_vis = (g * v_dot_h) / (n_dot_h * n_dot_v);
            let fc = (1.0 - v_dot_h).powi(5);
            scale += (1.0 - fc) * g_vis;
            bias += fc * g_vis;
        }
    }
    Vec2::new(scale, bias) / sample_count as f32
}

/// Cosine-weighted irradiance arriving at `normal`
///
/// Riemann sum over the hemisphere with a fixed step, each sample weighted
/// by `cos θ · sin θ`, normalized by the sample count and scaled by π.
pub fn irradiance_at(normal: Vec3, radiance: impl Fn(Vec3) -> Vec3) -> Vec3 {
    let normal = normal.normalize();
    let (right, up) = tangent_frame(normal);

    let mut sum = Vec3::ZERO;
    let mut count = 0u32;
    for phi in steps(TAU) {
        for theta in steps(FRAC_PI_2) {
            let tangent = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
            let direction = tangent.x * right + tangent.y * up + tangent.z * normal;
            sum += radiance(direction) * theta.cos() * theta.sin();
            count += 1;
        }
    }
    PI * sum / count.max(1) as f32
}

/// GGX prefiltered radiance for `direction` (view = normal = reflection)
pub fn prefilter_at(direction: Vec3, roughness: f32, sample_count: u32, radiance: impl Fn(Vec3) -> Vec3) -> Vec3 {
    let n = direction.normalize();
    let v = n;

    let mut sum = Vec3::ZERO;
    let mut weight = 0.0;
    for i in 0..sample_count {
        let h = importance_sample_ggx(hammersley(i, sample_count), n, roughness);
        let l = (2.0 * v.dot(h) * h - v).normalize();
        let n_dot_l = n.dot(l);
        if n_dot_l > 0.0 {
            sum += radiance(l) * n_dot_l;
            weight += n_dot_l;
        }
    }
    if weight > 0.0 {
        sum / weight
    } else {
        radiance(n)
    }
}

fn steps(end: f32) -> impl Iterator<Item = f32> {
    (0u32..)
        .map(|i| i as f32 * IRRADIANCE_SAMPLE_DELTA)
        .take_while(move |angle| *angle < end)
}

/// Orthonormal tangent and bitangent around `normal`
fn tangent_frame(normal: Vec3) -> (Vec3, Vec3) {
    let up = if normal.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent = up.cross(normal).normalize();
    let bitangent = normal.cross(tangent);
    (tangent, bitangent)
}

// ============================================================================
// CPU CUBEMAP
// ============================================================================

/// Square RGB float cubemap held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct CpuCubemap {
    size: u32,
    faces: [Vec<Vec3>; 6],
}

impl CpuCubemap {
    pub fn solid(size: u32, color: Vec3) -> Self {
        let texels = vec![color; (size * size) as usize];
        Self {
            size,
            faces: std::array::from_fn(|_| texels.clone()),
        }
    }

    /// Evaluate `radiance` at every texel center
    pub fn from_fn(size: u32, radiance: impl Fn(Vec3) -> Vec3) -> Self {
        let faces = CubeFace::ALL.map(|face| {
            (0..size * size)
                .map(|i| radiance(texel_direction(face, i % size, i / size, size)))
                .collect()
        });
        Self { size, faces }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texel(&self, face: CubeFace, x: u32, y: u32) -> Vec3 {
        self.faces[face.index()][(y * self.size + x) as usize]
    }

    /// Nearest texel in `direction`
    pub fn sample(&self, direction: Vec3) -> Vec3 {
        let (face, u, v) = face_coordinates(direction);
        let to_texel = |c: f32| ((c * self.size as f32) as u32).min(self.size - 1);
        self.texel(face, to_texel(u), to_texel(v))
    }

    /// Diffuse irradiance map of this environment
    pub fn convolve_irradiance(&self, size: u32) -> CpuCubemap {
        CpuCubemap::from_fn(size, |normal| irradiance_at(normal, |d| self.sample(d)))
    }

    /// One roughness level of the specular prefilter
    pub fn prefilter(&self, size: u32, roughness: f32, sample_count: u32) -> CpuCubemap {
        CpuCubemap::from_fn(size, |direction| {
            prefilter_at(direction, roughness, sample_count, |d| self.sample(d))
        })
    }
}

/// Direction through the center of texel (x, y) of `face`
pub fn texel_direction(face: CubeFace, x: u32, y: u32, size: u32) -> Vec3 {
    let s = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
    let t = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
    let direction = match face {
        CubeFace::PositiveX => Vec3::new(1.0, -t, -s),
        CubeFace::NegativeX => Vec3::new(-1.0, -t, s),
        CubeFace::PositiveY => Vec3::new(s, 1.0, t),
        CubeFace::NegativeY => Vec3::new(s, -1.0, -t),
        CubeFace::PositiveZ => Vec3::new(s, -t, 1.0),
        CubeFace::NegativeZ => Vec3::new(-s, -t, -1.0),
    };
    direction.normalize()
}

/// Face and [0, 1]² coordinates hit by `direction`
fn face_coordinates(direction: Vec3) -> (CubeFace, f32, f32) {
    let a = direction.abs();
    let (face, s, t, major) = if a.x >= a.y && a.x >= a.z {
        if direction.x > 0.0 {
            (CubeFace::PositiveX, -direction.z, -direction.y, a.x)
        } else {
            (CubeFace::NegativeX, direction.z, -direction.y, a.x)
        }
    } else if a.y >= a.z {
        if direction.y > 0.0 {
            (CubeFace::PositiveY, direction.x, direction.z, a.y)
        } else {
            (CubeFace::NegativeY, direction.x, -direction.z, a.y)
        }
    } else if direction.z > 0.0 {
        (CubeFace::PositiveZ, direction.x, -direction.y, a.z)
    } else {
        (CubeFace::NegativeZ, -direction.x, -direction.y, a.z)
    };
    let major = major.max(f32::EPSILON);
    (face, (s / major + 1.0) * 0.5, (t / major + 1.0) * 0.5)
}

#[cfg(test)]
#[path = "sampling_tests.rs"]
mod tests;
