use std::collections::{HashMap, HashSet};

use crate::node::joint::Mimic;
use crate::node::{NodeId, UrdfNode};

use super::tree::UrdfNodeTree;
use super::Robot;

pub type BuildRobotResult<T> = Result<T, BuildRobotError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildRobotError {
	#[error("Parent node {0:?} is not part of this robot")]
	UnknownParent(NodeId),
	#[error("Duplicate {category} name {name:?}")]
	DuplicateName { category: &'static str, name: String },
	#[error("Mimic node {0:?} is not a joint")]
	MimicNotAJoint(String),
	#[error("Mimic joint {joint:?} follows unknown joint {followed:?}")]
	UnknownMimicSource { joint: String, followed: String },
	#[error("Mimic joint {0:?} ends up following itself")]
	MimicCycle(String),
}

struct PendingMimic {
	joint: NodeId,
	followed: String,
	multiplier: f32,
	offset: f32,
}

/// Assembles a robot tree. Mimic relations are given by name and resolved in `build()`.
pub struct RobotBuilder {
	name: String,
	nodes: UrdfNodeTree,
	mimics: Vec<PendingMimic>,
}

impl RobotBuilder {
	pub fn new(robot_name: impl Into<String>, root_link: impl Into<String>) -> Self {
		Self {
			name: robot_name.into(),
			nodes: UrdfNodeTree::new_with_root(UrdfNode::root(root_link)),
			mimics: Vec::new(),
		}
	}

	/// The root link.
	pub fn root(&self) -> NodeId {
		self.nodes.root_id()
	}

	pub fn add(&mut self, parent: NodeId, node: UrdfNode) -> BuildRobotResult<NodeId> {
		self.nodes.add(parent, node).ok_or(BuildRobotError::UnknownParent(parent))
	}

	/// Add a joint whose values follow the joint named `followed`, as `v * multiplier + offset`.
	pub fn add_mimic(
		&mut self,
		parent: NodeId,
		node: UrdfNode,
		followed: impl Into<String>,
		multiplier: f32,
		offset: f32,
	) -> BuildRobotResult<NodeId> {
		if !node.is_joint() {
			return Err(BuildRobotError::MimicNotAJoint(node.name));
		}

		let joint = self.add(parent, node)?;
		self.mimics.push(PendingMimic {
			joint,
			followed: followed.into(),
			multiplier,
			offset,
		});
		Ok(joint)
	}

	/// Validate the tree and index it into a `Robot`.
	pub fn build(mut self) -> BuildRobotResult<Robot> {
		check_unique_names(&self.nodes)?;

		let joints: HashMap<String, NodeId> = self
			.nodes
			.pre_order_iter()
			.filter(|(_, node)| node.is_joint())
			.map(|(id, node)| (node.name.clone(), id))
			.collect();

		let mut resolved = Vec::with_capacity(self.mimics.len());
		for pending in &self.mimics {
			let Some(&source) = joints.get(&pending.followed) else {
				return Err(BuildRobotError::UnknownMimicSource {
					joint: node_name(&self.nodes, pending.joint),
					followed: pending.followed.clone(),
				});
			};

			if let Some(joint) = self.nodes.get_node_mut(pending.joint).and_then(UrdfNode::as_joint_mut) {
				joint.mimic = Some(Mimic::new(source, pending.multiplier, pending.offset));
			}
			resolved.push((pending.joint, source));
		}

		check_mimic_cycles(&self.nodes)?;

		for (mimic, source) in resolved {
			warn_on_dof_mismatch(&self.nodes, mimic, source);
			if let Some(joint) = self.nodes.get_node_mut(source).and_then(UrdfNode::as_joint_mut) {
				joint.mimic_joints.push(mimic);
			}
		}

		tracing::debug!("Built robot {:?} with {} mimic joints", self.name, self.mimics.len());
		Ok(Robot::new(self.name, self.nodes))
	}
}

fn node_name(nodes: &UrdfNodeTree, id: NodeId) -> String {
	nodes.get_node(id).map(|node| node.name.clone()).unwrap_or_default()
}

fn check_unique_names(nodes: &UrdfNodeTree) -> BuildRobotResult<()> {
	let mut seen = HashSet::new();
	for (_, node) in nodes.pre_order_iter() {
		let category = node.category();
		if !seen.insert((category, node.name.as_str())) {
			return Err(BuildRobotError::DuplicateName {
				category,
				name: node.name.clone(),
			});
		}
	}
	Ok(())
}

/// Every mimic follows exactly one joint, so walking the followed chain from each mimic either ends or loops.
fn check_mimic_cycles(nodes: &UrdfNodeTree) -> BuildRobotResult<()> {
	let followed = |id: NodeId| nodes.get_node(id)?.as_joint()?.mimic().map(Mimic::source);

	for (start, node) in nodes.pre_order_iter() {
		let mut visited = HashSet::new();
		let mut current = start;
		while let Some(next) = followed(current) {
			if next == start {
				return Err(BuildRobotError::MimicCycle(node.name.clone()));
			}
			if !visited.insert(next) {
				// a loop further up, reported when walking from one of its members
				break;
			}
			current = next;
		}
	}
	Ok(())
}

fn warn_on_dof_mismatch(nodes: &UrdfNodeTree, mimic: NodeId, source: NodeId) {
	let kind_of = |id: NodeId| nodes.get_node(id)?.as_joint().map(|joint| joint.kind());
	let (Some(mimic_kind), Some(source_kind)) = (kind_of(mimic), kind_of(source)) else {
		return;
	};

	if mimic_kind.dof_count() > source_kind.dof_count() {
		tracing::warn!(
			"Mimic joint {:?} ({mimic_kind}) has more degrees of freedom than {:?} ({source_kind}), extra values stay unchanged",
			node_name(nodes, mimic),
			node_name(nodes, source),
		);
	}
}
