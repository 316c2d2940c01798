use std::collections::HashMap;
use std::fmt::Display;

use indextree::{Arena, NodeId};

use crate::node::{NodeKind, UrdfNode};

#[derive(Debug)]
pub struct UrdfNodeTree {
	root_id: NodeId,
	arena: Arena<UrdfNode>,
}

impl UrdfNodeTree {
	pub fn new_with_root(node: UrdfNode) -> Self {
		let mut arena = Arena::new();
		let root_id = arena.new_node(node);

		Self { root_id, arena }
	}

	/// Append `node` under `parent`. `None` if the parent is not in this tree.
	pub fn add(&mut self, parent: NodeId, node: UrdfNode) -> Option<NodeId> {
		if self.arena.get(parent)?.is_removed() {
			return None;
		}

		let node_id = self.arena.new_node(node);
		parent.append(node_id, &mut self.arena);
		Some(node_id)
	}

	pub fn root_id(&self) -> NodeId {
		self.root_id
	}

	fn get_internal_node(&self, id: NodeId) -> Option<&indextree::Node<UrdfNode>> {
		self.arena.get(id).filter(|node| !node.is_removed())
	}

	pub fn get_node(&self, id: NodeId) -> Option<&UrdfNode> {
		Some(self.get_internal_node(id)?.get())
	}

	pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut UrdfNode> {
		let node = self.arena.get_mut(id)?;
		if node.is_removed() {
			return None;
		}
		Some(node.get_mut())
	}

	pub fn get_parent(&self, id: NodeId) -> Option<&UrdfNode> {
		let node = self.get_internal_node(id)?;
		self.get_node(node.parent()?)
	}

	pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
		self.get_internal_node(id)?.parent()
	}

	pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		id.children(&self.arena)
	}

	/// Root first, parents before children.
	pub fn pre_order_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.root_id.descendants(&self.arena)
	}

	pub fn pre_order_iter(&self) -> impl Iterator<Item = (NodeId, &UrdfNode)> + '_ {
		self.pre_order_ids()
			.filter_map(|id| self.get_node(id).map(|node| (id, node)))
	}

	/// Copy every reachable node into a fresh, compact tree.
	/// Returns the copy and the mapping from old to new ids.
	pub fn deep_copy(&self) -> (Self, HashMap<NodeId, NodeId>) {
		let mut arena = Arena::with_capacity(self.arena.count());
		let mut id_map = HashMap::new();
		let mut root_id = None;

		for (old_id, node) in self.pre_order_iter() {
			let new_id = arena.new_node(node.clone());
			match self.parent_id(old_id).and_then(|parent| id_map.get(&parent)) {
				Some(new_parent) => NodeId::append(*new_parent, new_id, &mut arena),
				None => root_id = Some(new_id),
			}
			id_map.insert(old_id, new_id);
		}

		let root_id = root_id.unwrap_or_else(|| arena.new_node(UrdfNode::root("")));
		(Self { root_id, arena }, id_map)
	}
}

fn type_label(node: &UrdfNode) -> String {
	match &node.kind {
		NodeKind::Joint(joint) if joint.mimic().is_some() => format!("Joint:{} mimic", joint.kind()),
		NodeKind::Joint(joint) => format!("Joint:{}", joint.kind()),
		kind => kind.type_name().to_owned(),
	}
}

fn fmt_node(indent: usize, f: &mut std::fmt::Formatter<'_>, node: &UrdfNode) -> std::fmt::Result {
	let type_name = type_label(node);
	#[cfg(feature = "owo")]
	let type_name = {
		use owo_colors::OwoColorize;
		type_name.magenta()
	};

	write!(f, "{}- [{}] {}", "  ".repeat(indent), type_name, node.name)?;
	match node.as_joint() {
		Some(joint) if !joint.values().is_empty() => writeln!(f, " {:?}", joint.values()),
		_ => writeln!(f),
	}
}

fn rec_fmt(indent: usize, f: &mut std::fmt::Formatter<'_>, node_id: NodeId, arena: &Arena<UrdfNode>) -> std::fmt::Result {
	let Some(node) = arena.get(node_id) else {
		return Ok(());
	};

	fmt_node(indent, f, node.get())?;
	for child in node_id.children(arena) {
		rec_fmt(indent + 1, f, child, arena)?;
	}

	Ok(())
}

impl Display for UrdfNodeTree {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.arena.get(self.root_id).is_none() {
			return write!(f, "(empty)");
		}

		rec_fmt(0, f, self.root_id, &self.arena)
	}
}
