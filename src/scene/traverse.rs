use glam::Mat4;

use super::document::{Node, SceneDocument};

/// Depth-first walk below `node_index`.
///
/// `visitor` receives each node together with its local-to-world matrix
/// (`parent * local`). A node is visited before its children, and children
/// in listed order. The hierarchy must be acyclic.
pub fn visit_node<F>(document: &SceneDocument, node_index: usize, parent: &Mat4, visitor: &mut F)
where
    F: FnMut(usize, &Node, &Mat4),
{
    let node = &document.nodes[node_index];
    let local_to_world = *parent * node.transform.matrix();

    visitor(node_index, node, &local_to_world);

    for &child in &node.children {
        visit_node(document, child, &local_to_world, visitor);
    }
}

/// Walk every root of `scene_index` starting from the identity transform
pub fn visit_scene<F>(document: &SceneDocument, scene_index: usize, mut visitor: F)
where
    F: FnMut(usize, &Node, &Mat4),
{
    for &root in &document.scenes[scene_index].nodes {
        visit_node(document, root, &Mat4::IDENTITY, &mut visitor);
    }
}
