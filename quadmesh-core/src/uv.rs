//! Texture coordinate channels
//!
//! A mesh buffer carries up to [`UV_CHANNEL_COUNT`] texture coordinate
//! channels. Each channel holds coordinates of exactly one dimensionality
//! (2D, 3D or 4D), so replacing a channel with another dimensionality drops
//! the previous data.

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Number of texture coordinate channels per mesh
pub const UV_CHANNEL_COUNT: usize = 4;

/// One texture coordinate channel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum UvChannel {
    #[default]
    Empty,
    Uv2(Vec<Vector2f>),
    Uv3(Vec<Vector3f>),
    Uv4(Vec<Vector4f>),
}

impl UvChannel {
    /// Number of components per coordinate, or 0 when the channel is empty
    pub fn dimension(&self) -> usize {
        match self {
            UvChannel::Empty => 0,
            UvChannel::Uv2(_) => 2,
            UvChannel::Uv3(_) => 3,
            UvChannel::Uv4(_) => 4,
        }
    }

    /// Number of coordinates stored in the channel
    pub fn len(&self) -> usize {
        match self {
            UvChannel::Empty => 0,
            UvChannel::Uv2(uvs) => uvs.len(),
            UvChannel::Uv3(uvs) => uvs.len(),
            UvChannel::Uv4(uvs) => uvs.len(),
        }
    }

    /// Check if the channel holds no coordinates
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_2d(&self) -> Option<&[Vector2f]> {
        match self {
            UvChannel::Uv2(uvs) => Some(uvs),
            _ => None,
        }
    }

    pub fn as_3d(&self) -> Option<&[Vector3f]> {
        match self {
            UvChannel::Uv3(uvs) => Some(uvs),
            _ => None,
        }
    }

    pub fn as_4d(&self) -> Option<&[Vector4f]> {
        match self {
            UvChannel::Uv4(uvs) => Some(uvs),
            _ => None,
        }
    }

    /// The `(s, t)` pair of a coordinate, whatever the channel's dimensionality
    pub fn st(&self, index: usize) -> Option<(f32, f32)> {
        match self {
            UvChannel::Empty => None,
            UvChannel::Uv2(uvs) => uvs.get(index).map(|uv| (uv.x, uv.y)),
            UvChannel::Uv3(uvs) => uvs.get(index).map(|uv| (uv.x, uv.y)),
            UvChannel::Uv4(uvs) => uvs.get(index).map(|uv| (uv.x, uv.y)),
        }
    }

    /// Exact comparison of two coordinates. Empty channels never compare equal.
    pub fn values_equal(&self, a: usize, b: usize) -> bool {
        match self {
            UvChannel::Empty => false,
            UvChannel::Uv2(uvs) => uvs[a] == uvs[b],
            UvChannel::Uv3(uvs) => uvs[a] == uvs[b],
            UvChannel::Uv4(uvs) => uvs[a] == uvs[b],
        }
    }

    /// Overwrite the coordinate at `dst` with the one at `src`
    pub fn copy_value(&mut self, dst: usize, src: usize) {
        match self {
            UvChannel::Empty => {}
            UvChannel::Uv2(uvs) => uvs[dst] = uvs[src],
            UvChannel::Uv3(uvs) => uvs[dst] = uvs[src],
            UvChannel::Uv4(uvs) => uvs[dst] = uvs[src],
        }
    }

    /// Replace the coordinate at `dst` with the average of `dst` and `src`
    pub fn blend_values(&mut self, dst: usize, src: usize) {
        match self {
            UvChannel::Empty => {}
            UvChannel::Uv2(uvs) => uvs[dst] = (uvs[dst] + uvs[src]) * 0.5,
            UvChannel::Uv3(uvs) => uvs[dst] = (uvs[dst] + uvs[src]) * 0.5,
            UvChannel::Uv4(uvs) => uvs[dst] = (uvs[dst] + uvs[src]) * 0.5,
        }
    }

    /// Shorten the channel to `len` coordinates
    pub fn truncate(&mut self, len: usize) {
        match self {
            UvChannel::Empty => {}
            UvChannel::Uv2(uvs) => uvs.truncate(len),
            UvChannel::Uv3(uvs) => uvs.truncate(len),
            UvChannel::Uv4(uvs) => uvs.truncate(len),
        }
    }
}

impl From<Vec<Vector2f>> for UvChannel {
    fn from(uvs: Vec<Vector2f>) -> Self {
        if uvs.is_empty() {
            UvChannel::Empty
        } else {
            UvChannel::Uv2(uvs)
        }
    }
}

impl From<Vec<Vector3f>> for UvChannel {
    fn from(uvs: Vec<Vector3f>) -> Self {
        if uvs.is_empty() {
            UvChannel::Empty
        } else {
            UvChannel::Uv3(uvs)
        }
    }
}

impl From<Vec<Vector4f>> for UvChannel {
    fn from(uvs: Vec<Vector4f>) -> Self {
        if uvs.is_empty() {
            UvChannel::Empty
        } else {
            UvChannel::Uv4(uvs)
        }
    }
}
