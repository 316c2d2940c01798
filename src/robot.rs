mod builder;
#[cfg(test)]
pub(crate) mod test_robots;
mod transforms;
mod tree;

use std::collections::HashMap;
use std::fmt;

use crate::node::joint::{Joint, JointValues};
use crate::node::{NodeId, NodeKind, UrdfNode};

pub use builder::{BuildRobotError, BuildRobotResult, RobotBuilder};
pub use tree::UrdfNodeTree;

/// Articulated robot: the node tree plus name lookups into it.
///
/// Names are unique within each category (links, joints, visuals, colliders) but may repeat across them.
/// `frames` holds all of them, joints taking precedence over links, links over visuals, visuals over colliders.
#[derive(Debug)]
pub struct Robot {
	pub name: String,
	pub(crate) nodes: UrdfNodeTree,
	links: HashMap<String, NodeId>,
	joints: HashMap<String, NodeId>,
	visuals: HashMap<String, NodeId>,
	colliders: HashMap<String, NodeId>,
	frames: HashMap<String, NodeId>,
}

impl Robot {
	pub(crate) fn new(name: String, nodes: UrdfNodeTree) -> Self {
		let mut robot = Self {
			name,
			nodes,
			links: HashMap::new(),
			joints: HashMap::new(),
			visuals: HashMap::new(),
			colliders: HashMap::new(),
			frames: HashMap::new(),
		};
		robot.index_nodes();
		robot
	}

	/// Rebuild the category maps and `frames` by walking the tree.
	fn index_nodes(&mut self) {
		self.links.clear();
		self.joints.clear();
		self.visuals.clear();
		self.colliders.clear();

		for (id, node) in self.nodes.pre_order_iter() {
			let map = match node.kind() {
				NodeKind::Root | NodeKind::Link => &mut self.links,
				NodeKind::Joint(_) => &mut self.joints,
				NodeKind::Visual => &mut self.visuals,
				NodeKind::Collider => &mut self.colliders,
			};

			if map.insert(node.name.clone(), id).is_some() {
				tracing::warn!("Duplicate {} name {:?}, keeping the last one", node.category(), node.name);
			}
		}

		// later entries win
		self.frames = self
			.colliders
			.iter()
			.chain(&self.visuals)
			.chain(&self.links)
			.chain(&self.joints)
			.map(|(name, id)| (name.clone(), *id))
			.collect();
	}

	pub fn nodes(&self) -> &UrdfNodeTree {
		&self.nodes
	}

	pub fn root_id(&self) -> NodeId {
		self.nodes.root_id()
	}

	pub fn node(&self, id: NodeId) -> Option<&UrdfNode> {
		self.nodes.get_node(id)
	}

	pub fn links(&self) -> &HashMap<String, NodeId> {
		&self.links
	}

	pub fn joints(&self) -> &HashMap<String, NodeId> {
		&self.joints
	}

	pub fn visuals(&self) -> &HashMap<String, NodeId> {
		&self.visuals
	}

	pub fn colliders(&self) -> &HashMap<String, NodeId> {
		&self.colliders
	}

	pub fn frames(&self) -> &HashMap<String, NodeId> {
		&self.frames
	}

	pub fn frame_id(&self, name: &str) -> Option<NodeId> {
		self.frames.get(name).copied()
	}

	/// Any named link, joint, visual or collider.
	pub fn get_frame(&self, name: &str) -> Option<&UrdfNode> {
		self.nodes.get_node(*self.frames.get(name)?)
	}

	pub fn link(&self, name: &str) -> Option<&UrdfNode> {
		self.nodes.get_node(*self.links.get(name)?)
	}

	pub fn visual(&self, name: &str) -> Option<&UrdfNode> {
		self.nodes.get_node(*self.visuals.get(name)?)
	}

	pub fn collider(&self, name: &str) -> Option<&UrdfNode> {
		self.nodes.get_node(*self.colliders.get(name)?)
	}

	pub fn joint_node(&self, name: &str) -> Option<&UrdfNode> {
		self.nodes.get_node(*self.joints.get(name)?)
	}

	pub fn joint(&self, name: &str) -> Option<&Joint> {
		self.joint_node(name)?.as_joint()
	}

	/// Set the values of the joint named `name`. Unknown names are ignored and return `false`.
	///
	/// Returns whether the joint or any of its mimic joints changed.
	pub fn set_joint_value(&mut self, name: &str, values: impl Into<JointValues>) -> bool {
		let Some(id) = self.joints.get(name).copied() else {
			tracing::debug!("No joint named {name:?}, ignoring");
			return false;
		};

		self.set_joint_value_by_id(id, &values.into())
	}

	/// Set several joints at once, in iteration order. Every entry is applied.
	///
	/// Returns whether any of them changed.
	pub fn set_joint_values<K, V, I>(&mut self, values: I) -> bool
	where
		K: AsRef<str>,
		V: Into<JointValues>,
		I: IntoIterator<Item = (K, V)>,
	{
		let mut changed = false;
		for (name, value) in values {
			changed |= self.set_joint_value(name.as_ref(), value);
		}
		changed
	}

	/// Update entry point of a joint: every mimic joint is refreshed with the mapped incoming values first,
	/// then the joint itself is moved.
	pub fn set_joint_value_by_id(&mut self, id: NodeId, values: &[Option<f32>]) -> bool {
		let Some(joint) = self.nodes.get_node(id).and_then(UrdfNode::as_joint) else {
			return false;
		};

		let mimics: Vec<_> = joint
			.mimic_joints()
			.iter()
			.filter_map(|&mimic_id| {
				let mimic = self.nodes.get_node(mimic_id)?.as_joint()?.mimic()?;
				Some((mimic_id, *mimic))
			})
			.collect();

		let mut changed = false;
		for (mimic_id, mimic) in mimics {
			changed |= self.set_joint_value_by_id(mimic_id, &mimic.map(values));
		}

		if let Some(node) = self.nodes.get_node_mut(id) {
			changed |= node.apply_joint_values(values);
		}

		tracing::trace!("Joint {id:?} updated with {values:?}, changed: {changed}");
		changed
	}
}

/// Copies the whole tree. Name maps are rebuilt from the copy and mimic relations point into it.
impl Clone for Robot {
	fn clone(&self) -> Self {
		let (mut nodes, id_map) = self.nodes.deep_copy();

		let ids: Vec<NodeId> = nodes.pre_order_ids().collect();
		for id in ids {
			let Some(joint) = nodes.get_node_mut(id).and_then(UrdfNode::as_joint_mut) else {
				continue;
			};

			joint.mimic_joints = joint
				.mimic_joints
				.iter()
				.filter_map(|old| id_map.get(old).copied())
				.collect();
			if let Some(mimic) = joint.mimic.as_mut() {
				if let Some(source) = id_map.get(&mimic.source) {
					mimic.source = *source;
				}
			}
		}

		let robot = Robot::new(self.name.clone(), nodes);
		debug_assert!(robot.frames.len() == self.frames.len() && robot.frames.keys().all(|k| self.frames.contains_key(k)));
		robot
	}
}

impl fmt::Display for Robot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Robot {:?}", self.name)?;
		write!(f, "{}", self.nodes)
	}
}
