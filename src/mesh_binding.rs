//! Binding of renderable links to the segments whose poses they take.
//!
//! Forward kinematics works per segment, but consumers want poses per renderable link. Each
//! link is bound to its nearest ancestor (the link itself included) whose visual geometry is a
//! loadable mesh. Links with no such ancestor up to the root are not bound and will never
//! receive a pose.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use crate::description::RobotDescription;
use crate::kinematics_error::KinematicsError;
use crate::tree::KinematicTree;

#[derive(Debug, Clone, Default)]
pub struct LinkMeshBinding {
    /// Bound link names, in the order the description lists them.
    links: Vec<String>,
    segment_of: HashMap<String, String>,
    mesh_of: HashMap<String, String>,
}

impl LinkMeshBinding {
    /// # Errors
    /// `KinematicsError::NotFound` if a link of the description has no segment in the tree,
    /// meaning the tree was built from another description.
    pub fn new(description: &RobotDescription, tree: &KinematicTree) -> Result<Self, KinematicsError> {
        let meshes: HashMap<&str, &str> = description.links.iter()
            .filter_map(|link| link.renderable_mesh().map(|mesh| (link.name.as_str(), mesh)))
            .collect();

        let mut binding = LinkMeshBinding::default();
        for link in &description.links {
            let bearer = tree.path_to_root(&link.name)?
                .into_iter()
                .find_map(|segment| meshes.get(segment.name.as_str())
                    .map(|mesh| (segment.name.as_str(), *mesh)));

            if let Some((segment, mesh)) = bearer {
                debug!("link {} is descendant of {}", link.name, segment);
                binding.insert(&link.name, segment, Some(mesh));
            }
        }
        Ok(binding)
    }

    /// Binding given explicitly as (link, segment) pairs, without mesh information.
    pub fn from_pairs<L: Into<String>, S: Into<String>>(pairs: impl IntoIterator<Item = (L, S)>) -> Self {
        let mut binding = LinkMeshBinding::default();
        for (link, segment) in pairs {
            let (link, segment): (String, String) = (link.into(), segment.into());
            binding.insert(&link, &segment, None);
        }
        binding
    }

    fn insert(&mut self, link: &str, segment: &str, mesh: Option<&str>) {
        if self.segment_of.insert(link.to_string(), segment.to_string()).is_none() {
            self.links.push(link.to_string());
        }
        if let Some(mesh) = mesh {
            self.mesh_of.insert(segment.to_string(), mesh.to_string());
        }
    }

    /// Segment whose pose the link takes.
    pub fn segment_of(&self, link: &str) -> Option<&str> {
        self.segment_of.get(link).map(String::as_str)
    }

    /// Mesh file rendered for the link (the mesh of its bound segment).
    pub fn mesh_filename(&self, link: &str) -> Option<&str> {
        self.mesh_of.get(self.segment_of(link)?).map(String::as_str)
    }

    /// Bound links with their mesh files, in description order.
    pub fn mesh_paths(&self) -> Vec<(&str, &str)> {
        self.links()
            .filter_map(|link| self.mesh_filename(link).map(|mesh| (link, mesh)))
            .collect()
    }

    /// Bound link names, in description order.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    /// Distinct segments that at least one link is bound to, sorted.
    pub fn segments(&self) -> BTreeSet<&str> {
        self.segment_of.values().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
