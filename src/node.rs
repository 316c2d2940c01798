/*!
URDF element kinds to node kinds:
- robot root link -> Root
- link -> Link
- visual -> Visual
- collision -> Collider
- joint (with or without mimic) -> Joint
*/

pub mod joint;

use glam::Mat4;

use crate::math::transform::Transform;

use joint::Joint;

pub use indextree::NodeId;

/// Opaque handle to the document element a node was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DocumentRef(pub u32);

#[derive(Debug, Clone)]
pub enum NodeKind {
	Root,
	Link,
	Visual,
	Collider,
	Joint(Joint),
}

impl NodeKind {
	pub fn type_name(&self) -> &'static str {
		match self {
			NodeKind::Root => "Root",
			NodeKind::Link => "Link",
			NodeKind::Visual => "Visual",
			NodeKind::Collider => "Collider",
			NodeKind::Joint(_) => "Joint",
		}
	}
}

#[derive(Debug, Clone)]
pub struct UrdfNode {
	pub name: String,
	pub document: Option<DocumentRef>,
	pub(crate) transform: Transform,
	/// Absolute transform as of the last `Robot::update_world_transforms()`.
	pub(crate) absolute: Mat4,
	pub(crate) world_stale: bool,
	pub(crate) kind: NodeKind,
}

impl UrdfNode {
	fn new(name: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			name: name.into(),
			document: None,
			transform: Transform::default(),
			absolute: Mat4::IDENTITY,
			world_stale: true,
			kind,
		}
	}

	pub(crate) fn root(name: impl Into<String>) -> Self {
		Self::new(name, NodeKind::Root)
	}

	pub fn link(name: impl Into<String>) -> Self {
		Self::new(name, NodeKind::Link)
	}

	pub fn visual(name: impl Into<String>) -> Self {
		Self::new(name, NodeKind::Visual)
	}

	pub fn collider(name: impl Into<String>) -> Self {
		Self::new(name, NodeKind::Collider)
	}

	pub fn joint(name: impl Into<String>, joint: Joint) -> Self {
		Self::new(name, NodeKind::Joint(joint))
	}

	pub fn with_transform(mut self, transform: Transform) -> Self {
		self.transform = transform;
		self
	}

	pub fn with_document(mut self, document: DocumentRef) -> Self {
		self.document = Some(document);
		self
	}

	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	pub fn transform(&self) -> &Transform {
		&self.transform
	}

	/// Replace the local transform. Flags the world transform for recomputation.
	pub fn set_transform(&mut self, transform: Transform) {
		self.transform = transform;
		self.world_stale = true;
	}

	pub fn absolute(&self) -> Mat4 {
		self.absolute
	}

	pub fn is_world_stale(&self) -> bool {
		self.world_stale
	}

	pub fn as_joint(&self) -> Option<&Joint> {
		match &self.kind {
			NodeKind::Joint(joint) => Some(joint),
			_ => None,
		}
	}

	pub fn as_joint_mut(&mut self) -> Option<&mut Joint> {
		match &mut self.kind {
			NodeKind::Joint(joint) => Some(joint),
			_ => None,
		}
	}

	/// Every node kind carries a local transform.
	pub fn has_transform(&self) -> bool {
		true
	}

	pub fn is_root(&self) -> bool {
		matches!(self.kind, NodeKind::Root)
	}

	/// Links, including the robot root.
	pub fn is_link(&self) -> bool {
		matches!(self.kind, NodeKind::Root | NodeKind::Link)
	}

	pub fn is_visual(&self) -> bool {
		matches!(self.kind, NodeKind::Visual)
	}

	pub fn is_collider(&self) -> bool {
		matches!(self.kind, NodeKind::Collider)
	}

	pub fn is_joint(&self) -> bool {
		matches!(self.kind, NodeKind::Joint(_))
	}

	/// Name map this node is registered in.
	pub fn category(&self) -> &'static str {
		match self.kind {
			NodeKind::Root | NodeKind::Link => "link",
			NodeKind::Visual => "visual",
			NodeKind::Collider => "collider",
			NodeKind::Joint(_) => "joint",
		}
	}

	pub fn is_mimic(&self) -> bool {
		self.as_joint().is_some_and(|joint| joint.mimic().is_some())
	}

	/// Run the joint update algorithm on this node alone, without touching mimics.
	pub(crate) fn apply_joint_values(&mut self, values: &[Option<f32>]) -> bool {
		let NodeKind::Joint(joint) = &mut self.kind else {
			return false;
		};

		let changed = joint.apply(&mut self.transform, values);
		if changed {
			self.world_stale = true;
		}
		changed
	}
}
