use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::node::{NodeId, UrdfNode};

use super::Robot;

impl Robot {
	/// Update absolute transforms by combining each node's local transform with its parent's,
	/// in a pre-order traversal so parents are done before children.
	///
	/// Only stale nodes and the subtrees below them are recomputed. Returns how many nodes were.
	pub fn update_world_transforms(&mut self) -> usize {
		let order: Vec<NodeId> = self.nodes.pre_order_ids().collect();
		let mut recomputed = HashSet::new();

		for id in order {
			let parent = self.nodes.parent_id(id);
			let parent_moved = parent.is_some_and(|parent| recomputed.contains(&parent));
			let base = parent
				.and_then(|parent| self.nodes.get_node(parent))
				.map_or(Mat4::IDENTITY, UrdfNode::absolute);

			let Some(node) = self.nodes.get_node_mut(id) else {
				continue;
			};
			if !node.world_stale && !parent_moved {
				continue;
			}

			node.absolute = base * node.transform.to_matrix();
			node.world_stale = false;
			recomputed.insert(id);
		}

		recomputed.len()
	}

	/// Absolute transform of a frame as of the last `update_world_transforms()`.
	pub fn world_transform(&self, name: &str) -> Option<Mat4> {
		self.get_frame(name).map(UrdfNode::absolute)
	}

	/// Origin of a frame in robot space, as of the last `update_world_transforms()`.
	pub fn world_position(&self, name: &str) -> Option<Vec3> {
		Some(self.world_transform(name)?.transform_point3(Vec3::ZERO))
	}
}
