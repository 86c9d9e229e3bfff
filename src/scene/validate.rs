use thiserror::Error;

use super::document::SceneDocument;

/// A scene document that breaks an invariant the renderer relies on
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("{owner} references {kind} {index}, but only {len} exist")]
    MissingReference {
        owner: String,
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("accessor {0} is used for drawing but has no buffer view")]
    UnbackedAccessor(usize),

    #[error("accessor {accessor} reads past the end of buffer view {view}")]
    AccessorOutOfBounds { accessor: usize, view: usize },

    #[error("buffer view {view} ends at byte {end}, past the end of buffer {buffer} ({len} bytes)")]
    ViewOutOfBounds {
        view: usize,
        buffer: usize,
        end: usize,
        len: usize,
    },

    #[error("mesh {mesh} primitive {primitive} has neither indices nor attributes")]
    EmptyPrimitive { mesh: usize, primitive: usize },

    #[error("node {0} has more than one parent")]
    MultipleParents(usize),

    #[error("scene {scene} lists node {node} as a root, but it is the child of another node")]
    RootHasParent { scene: usize, node: usize },

    #[error("node {0} is part of a cycle")]
    Cycle(usize),
}

fn check(owner: impl FnOnce() -> String, kind: &'static str, index: usize, len: usize) -> Result<(), SceneError> {
    if index < len {
        Ok(())
    } else {
        Err(SceneError::MissingReference {
            owner: owner(),
            kind,
            index,
            len,
        })
    }
}

impl SceneDocument {
    /// Check every invariant traversal and draw submission assume: indices
    /// in range, byte ranges inside their buffers, and a node hierarchy that
    /// forms a forest.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.validate_references()?;
        self.validate_byte_ranges()?;
        self.validate_hierarchy()
    }

    fn validate_references(&self) -> Result<(), SceneError> {
        if let Some(scene) = self.default_scene {
            check(|| "document".into(), "scene", scene, self.scenes.len())?;
        }

        for (s, scene) in self.scenes.iter().enumerate() {
            for &node in &scene.nodes {
                check(|| format!("scene {s}"), "node", node, self.nodes.len())?;
            }
        }

        for (n, node) in self.nodes.iter().enumerate() {
            if let Some(mesh) = node.mesh {
                check(|| format!("node {n}"), "mesh", mesh, self.meshes.len())?;
            }
            if let Some(light) = node.light {
                check(|| format!("node {n}"), "light", light, self.lights.len())?;
            }
            for &child in &node.children {
                check(|| format!("node {n}"), "node", child, self.nodes.len())?;
            }
        }

        for (m, mesh) in self.meshes.iter().enumerate() {
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                let owner = || format!("mesh {m} primitive {p}");
                if primitive.indices.is_none() && primitive.attributes.is_empty() {
                    return Err(SceneError::EmptyPrimitive { mesh: m, primitive: p });
                }
                for &accessor in primitive.attributes.values().chain(primitive.indices.iter()) {
                    check(owner, "accessor", accessor, self.accessors.len())?;
                    if self.accessors[accessor].buffer_view.is_none() {
                        return Err(SceneError::UnbackedAccessor(accessor));
                    }
                }
                if let Some(material) = primitive.material {
                    check(owner, "material", material, self.materials.len())?;
                }
            }
        }

        for (a, accessor) in self.accessors.iter().enumerate() {
            if let Some(view) = accessor.buffer_view {
                check(|| format!("accessor {a}"), "buffer view", view, self.buffer_views.len())?;
            }
        }

        for (v, view) in self.buffer_views.iter().enumerate() {
            check(|| format!("buffer view {v}"), "buffer", view.buffer, self.buffers.len())?;
        }

        Ok(())
    }

    fn validate_byte_ranges(&self) -> Result<(), SceneError> {
        for (v, view) in self.buffer_views.iter().enumerate() {
            let end = view.byte_offset + view.byte_length;
            let len = self.buffers[view.buffer].data.len();
            if end > len {
                return Err(SceneError::ViewOutOfBounds {
                    view: v,
                    buffer: view.buffer,
                    end,
                    len,
                });
            }
        }

        for (a, accessor) in self.accessors.iter().enumerate() {
            let Some(view) = accessor.buffer_view else {
                continue;
            };
            if accessor.count == 0 {
                continue;
            }
            let end = accessor.byte_offset
                + self.accessor_stride(a) * (accessor.count - 1)
                + accessor.element_size();
            if end > self.buffer_views[view].byte_length {
                return Err(SceneError::AccessorOutOfBounds { accessor: a, view });
            }
        }

        Ok(())
    }

    fn validate_hierarchy(&self) -> Result<(), SceneError> {
        let mut has_parent = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                if std::mem::replace(&mut has_parent[child], true) {
                    return Err(SceneError::MultipleParents(child));
                }
            }
        }

        for (s, scene) in self.scenes.iter().enumerate() {
            if let Some(&node) = scene.nodes.iter().find(|&&node| has_parent[node]) {
                return Err(SceneError::RootHasParent { scene: s, node });
            }
        }

        // With at most one parent per node, anything not reachable from a
        // parentless node sits on a cycle.
        let mut reached = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = (0..self.nodes.len()).filter(|&n| !has_parent[n]).collect();
        while let Some(node) = stack.pop() {
            reached[node] = true;
            stack.extend(self.nodes[node].children.iter().copied());
        }

        match reached.iter().position(|&r| !r) {
            Some(node) => Err(SceneError::Cycle(node)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Accessor, Buffer, BufferView, ComponentType, ElementType, Mesh, Node, Primitive, Scene};

    fn chain(len: usize) -> SceneDocument {
        let nodes = (0..len)
            .map(|i| Node {
                children: if i + 1 < len { vec![i + 1] } else { vec![] },
                ..Default::default()
            })
            .collect();
        SceneDocument {
            scenes: vec![Scene {
                name: None,
                nodes: vec![0],
            }],
            nodes,
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_chain() {
        assert_eq!(chain(4).validate(), Ok(()));
    }

    #[test]
    fn rejects_cycle() {
        let mut document = chain(3);
        document.scenes[0].nodes.clear();
        document.nodes[2].children.push(0);
        assert_eq!(document.validate(), Err(SceneError::Cycle(0)));
    }

    #[test]
    fn rejects_shared_child() {
        let mut document = chain(3);
        document.nodes[0].children.push(2);
        assert_eq!(document.validate(), Err(SceneError::MultipleParents(2)));
    }

    #[test]
    fn rejects_child_listed_as_root() {
        let mut document = chain(2);
        document.scenes[0].nodes.push(1);
        assert_eq!(document.validate(), Err(SceneError::RootHasParent { scene: 0, node: 1 }));
    }

    #[test]
    fn rejects_missing_child() {
        let mut document = chain(2);
        document.nodes[1].children.push(7);
        assert!(matches!(
            document.validate(),
            Err(SceneError::MissingReference { kind: "node", index: 7, .. })
        ));
    }

    #[test]
    fn rejects_primitive_without_data() {
        let mut document = chain(1);
        document.meshes.push(Mesh {
            name: None,
            primitives: vec![Primitive::default()],
        });
        document.nodes[0].mesh = Some(0);
        assert_eq!(
            document.validate(),
            Err(SceneError::EmptyPrimitive { mesh: 0, primitive: 0 })
        );
    }

    #[test]
    fn rejects_accessor_past_view_end() {
        let mut document = chain(1);
        document.buffers.push(Buffer { data: vec![0; 24] });
        document.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: 0,
            byte_length: 24,
            byte_stride: None,
            target: None,
        });
        document.accessors.push(Accessor {
            buffer_view: Some(0),
            byte_offset: 0,
            component_type: ComponentType::F32,
            element_type: ElementType::Vec3,
            normalized: false,
            count: 3,
        });
        assert_eq!(
            document.validate(),
            Err(SceneError::AccessorOutOfBounds { accessor: 0, view: 0 })
        );

        document.accessors[0].count = 2;
        assert_eq!(document.validate(), Ok(()));
    }

    #[test]
    fn rejects_view_past_buffer_end() {
        let mut document = chain(1);
        document.buffers.push(Buffer { data: vec![0; 8] });
        document.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: 4,
            byte_length: 8,
            byte_stride: None,
            target: None,
        });
        assert_eq!(
            document.validate(),
            Err(SceneError::ViewOutOfBounds {
                view: 0,
                buffer: 0,
                end: 12,
                len: 8
            })
        );
    }
}
