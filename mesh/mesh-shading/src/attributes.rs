//! Named attribute lookup.
//!
//! Mesh storage lives outside this crate. The named entry points
//! ([`compute_normals_from`](crate::compute_normals_from),
//! [`compute_tangents_from`](crate::compute_tangents_from)) only need to
//! find arrays by name, which is what [`PrimitiveVariables`] describes.
//! [`AttributeMap`] is a small owned implementation for callers without a
//! container of their own.
//!
//! # UV set naming
//!
//! | UV set | u array | v array | index array |
//! |--------|---------|---------|-------------|
//! | `st`   | `s`     | `t`     | `stIndices` |
//! | `uv`   | `uv_s`  | `uv_t`  | `uvIndices` |

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::vector::GeometryVector;

/// Name of the default UV set.
pub const DEFAULT_UV_SET: &str = "st";

/// A UV set name and the attribute names derived from it.
///
/// # Example
///
/// ```
/// use mesh_shading::UvSet;
///
/// let st = UvSet::default();
/// assert_eq!((st.u_name(), st.v_name()), ("s".to_string(), "t".to_string()));
///
/// let uv = UvSet::new("map1");
/// assert_eq!(uv.u_name(), "map1_s");
/// assert_eq!(uv.indices_name(), "map1Indices");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UvSet {
    name: String,
}

impl Default for UvSet {
    fn default() -> Self {
        Self::new(DEFAULT_UV_SET)
    }
}

impl UvSet {
    /// Create a UV set by name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the per-facevertex u coordinate array.
    #[must_use]
    pub fn u_name(&self) -> String {
        if self.name == DEFAULT_UV_SET {
            "s".to_string()
        } else {
            format!("{}_s", self.name)
        }
    }

    /// Name of the per-facevertex v coordinate array.
    #[must_use]
    pub fn v_name(&self) -> String {
        if self.name == DEFAULT_UV_SET {
            "t".to_string()
        } else {
            format!("{}_t", self.name)
        }
    }

    /// Name of the optional per-facevertex connectivity array.
    #[must_use]
    pub fn indices_name(&self) -> String {
        format!("{}Indices", self.name)
    }
}

impl std::fmt::Display for UvSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Read access to named mesh arrays.
///
/// Implement this for an existing primitive-variable container to use the
/// named entry points. Lookups return `None` for absent names; length and
/// range checks happen in the pipelines.
pub trait PrimitiveVariables<V: GeometryVector> {
    /// A vector array, such as positions.
    fn vectors(&self, name: &str) -> Option<&[V]>;

    /// A scalar array, such as one UV coordinate.
    fn scalars(&self, name: &str) -> Option<&[V::Scalar]>;

    /// An index array, such as UV connectivity.
    fn indices(&self, name: &str) -> Option<&[u32]>;
}

/// Owned name-to-array storage implementing [`PrimitiveVariables`].
///
/// # Example
///
/// ```
/// use mesh_shading::{AttributeMap, PrimitiveVariables};
/// use nalgebra::Vector3;
///
/// let mut attributes = AttributeMap::new();
/// attributes.insert_vectors("P", vec![Vector3::new(0.0_f32, 0.0, 0.0)]);
/// attributes.insert_scalars("s", vec![0.5]);
///
/// assert_eq!(attributes.vectors("P").map(<[_]>::len), Some(1));
/// assert!(attributes.indices("stIndices").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct AttributeMap<V: GeometryVector> {
    vectors: HashMap<String, Vec<V>>,
    scalars: HashMap<String, Vec<V::Scalar>>,
    indices: HashMap<String, Vec<u32>>,
}

impl<V: GeometryVector> Default for AttributeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: GeometryVector> AttributeMap<V> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vectors: HashMap::new(),
            scalars: HashMap::new(),
            indices: HashMap::new(),
        }
    }

    /// Store a vector array, replacing any previous array of that name.
    pub fn insert_vectors(&mut self, name: impl Into<String>, values: Vec<V>) {
        self.vectors.insert(name.into(), values);
    }

    /// Store a scalar array, replacing any previous array of that name.
    pub fn insert_scalars(&mut self, name: impl Into<String>, values: Vec<V::Scalar>) {
        self.scalars.insert(name.into(), values);
    }

    /// Store an index array, replacing any previous array of that name.
    pub fn insert_indices(&mut self, name: impl Into<String>, values: Vec<u32>) {
        self.indices.insert(name.into(), values);
    }

    /// Store per-facevertex u and v coordinates under a UV set's names.
    pub fn insert_uv_set(&mut self, set: &UvSet, u: Vec<V::Scalar>, v: Vec<V::Scalar>) {
        self.insert_scalars(set.u_name(), u);
        self.insert_scalars(set.v_name(), v);
    }

    /// Number of stored arrays of all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len() + self.scalars.len() + self.indices.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: GeometryVector> PrimitiveVariables<V> for AttributeMap<V> {
    fn vectors(&self, name: &str) -> Option<&[V]> {
        self.vectors.get(name).map(Vec::as_slice)
    }

    fn scalars(&self, name: &str) -> Option<&[V::Scalar]> {
        self.scalars.get(name).map(Vec::as_slice)
    }

    fn indices(&self, name: &str) -> Option<&[u32]> {
        self.indices.get(name).map(Vec::as_slice)
    }
}
