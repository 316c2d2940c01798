use std::fmt;
use std::ops::Deref;

use glam::{Quat, Vec3};

use crate::math::transform::Transform;

use super::NodeId;

/// Motion type of a joint. Decides how many values the joint holds and how they move it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
	/// No motion.
	#[default]
	Fixed,
	/// Unlimited rotation about the axis.
	Continuous,
	/// Rotation about the axis, clamped into the limit.
	Revolute,
	/// Translation along the axis, clamped into the limit.
	Prismatic,
	/// Translation along local X and Y, rotation about local Z.
	Planar,
	/// Free motion. Not supported, updates are ignored.
	Floating,
}

impl JointKind {
	pub const VALUES: [JointKind; 6] = [
		JointKind::Fixed,
		JointKind::Continuous,
		JointKind::Revolute,
		JointKind::Prismatic,
		JointKind::Planar,
		JointKind::Floating,
	];

	pub const fn dof_count(self) -> usize {
		match self {
			JointKind::Fixed => 0,
			JointKind::Continuous | JointKind::Revolute | JointKind::Prismatic => 1,
			JointKind::Planar => 3,
			JointKind::Floating => 6,
		}
	}

	/// Whether values are clamped into `Limit` (unless the joint ignores limits).
	pub const fn is_limited(self) -> bool {
		matches!(self, JointKind::Revolute | JointKind::Prismatic)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			JointKind::Fixed => "fixed",
			JointKind::Continuous => "continuous",
			JointKind::Revolute => "revolute",
			JointKind::Prismatic => "prismatic",
			JointKind::Planar => "planar",
			JointKind::Floating => "floating",
		}
	}
}

impl fmt::Display for JointKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown joint kind {0:?}")]
pub struct UnknownJointKindError(String);

impl TryFrom<&str> for JointKind {
	type Error = UnknownJointKindError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"fixed" => Ok(JointKind::Fixed),
			"continuous" => Ok(JointKind::Continuous),
			"revolute" => Ok(JointKind::Revolute),
			"prismatic" => Ok(JointKind::Prismatic),
			"planar" => Ok(JointKind::Planar),
			"floating" => Ok(JointKind::Floating),
			unknown => Err(UnknownJointKindError(unknown.to_owned())),
		}
	}
}

/// Motion limits (radians or meters).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Limit {
	pub lower: f32,
	pub upper: f32,
}

impl Limit {
	pub fn new(lower: f32, upper: f32) -> Self {
		Self { lower, upper }
	}

	/// An inverted limit resolves to `lower`.
	pub fn clamp(&self, value: f32) -> f32 {
		value.min(self.upper).max(self.lower)
	}
}

/// Relation of a mimic joint to the joint it follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mimic {
	pub(crate) source: NodeId,
	pub multiplier: f32,
	pub offset: f32,
}

impl Mimic {
	pub(crate) fn new(source: NodeId, multiplier: f32, offset: f32) -> Self {
		Self {
			source,
			multiplier,
			offset,
		}
	}

	/// The joint this mimic follows.
	pub fn source(&self) -> NodeId {
		self.source
	}

	/// `v * multiplier + offset` for every requested value. Missing values stay missing.
	pub fn map(&self, values: &[Option<f32>]) -> Vec<Option<f32>> {
		values
			.iter()
			.map(|value| value.map(|v| v * self.multiplier + self.offset))
			.collect()
	}
}

/// Requested degree-of-freedom values. `None` leaves that DoF as it is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JointValues(pub Vec<Option<f32>>);

impl Deref for JointValues {
	type Target = [Option<f32>];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<f32> for JointValues {
	fn from(value: f32) -> Self {
		Self(vec![Some(value)])
	}
}

impl From<Option<f32>> for JointValues {
	fn from(value: Option<f32>) -> Self {
		Self(vec![value])
	}
}

impl From<&[f32]> for JointValues {
	fn from(values: &[f32]) -> Self {
		Self(values.iter().copied().map(Some).collect())
	}
}

impl From<Vec<f32>> for JointValues {
	fn from(values: Vec<f32>) -> Self {
		Self::from(values.as_slice())
	}
}

impl<const N: usize> From<[f32; N]> for JointValues {
	fn from(values: [f32; N]) -> Self {
		Self::from(values.as_slice())
	}
}

impl From<&[Option<f32>]> for JointValues {
	fn from(values: &[Option<f32>]) -> Self {
		Self(values.to_vec())
	}
}

impl From<Vec<Option<f32>>> for JointValues {
	fn from(values: Vec<Option<f32>>) -> Self {
		Self(values)
	}
}

impl<const N: usize> From<[Option<f32>; N]> for JointValues {
	fn from(values: [Option<f32>; N]) -> Self {
		Self(values.to_vec())
	}
}

#[derive(Debug, Clone)]
pub struct Joint {
	kind: JointKind,
	/// Always `kind.dof_count()` long.
	values: Vec<f32>,
	axis: Vec3,
	limit: Limit,
	ignore_limits: bool,
	/// Pose before any joint motion, captured on first update.
	origin: Option<Transform>,
	pub(crate) mimic_joints: Vec<NodeId>,
	pub(crate) mimic: Option<Mimic>,
}

impl Default for Joint {
	fn default() -> Self {
		Self {
			kind: JointKind::Fixed,
			values: Vec::new(),
			axis: Self::DEFAULT_AXIS,
			limit: Limit::default(),
			ignore_limits: false,
			origin: None,
			mimic_joints: Vec::new(),
			mimic: None,
		}
	}
}

impl Joint {
	pub const DEFAULT_AXIS: Vec3 = Vec3::X;
	/// Planar joints move in their local XY plane and turn about local Z.
	pub const PLANAR_AXIS: Vec3 = Vec3::Z;

	pub fn new(kind: JointKind) -> Self {
		let mut joint = Self::default();
		joint.set_kind(kind);
		joint
	}

	pub fn revolute(axis: Vec3, limit: Limit) -> Self {
		Self::new(JointKind::Revolute).with_axis(axis).with_limit(limit)
	}

	pub fn continuous(axis: Vec3) -> Self {
		Self::new(JointKind::Continuous).with_axis(axis)
	}

	pub fn prismatic(axis: Vec3, limit: Limit) -> Self {
		Self::new(JointKind::Prismatic).with_axis(axis).with_limit(limit)
	}

	pub fn planar() -> Self {
		Self::new(JointKind::Planar)
	}

	pub fn floating() -> Self {
		Self::new(JointKind::Floating)
	}

	pub fn with_axis(mut self, axis: Vec3) -> Self {
		self.set_axis(axis);
		self
	}

	pub fn with_limit(mut self, limit: Limit) -> Self {
		self.limit = limit;
		self
	}

	pub fn with_ignore_limits(mut self, ignore_limits: bool) -> Self {
		self.ignore_limits = ignore_limits;
		self
	}

	/// Changing the kind resets the values to zeros of the new DoF count.
	pub fn set_kind(&mut self, kind: JointKind) {
		if self.kind == kind && self.values.len() == kind.dof_count() {
			return;
		}

		self.kind = kind;
		self.values = vec![0.; kind.dof_count()];
		if kind == JointKind::Planar {
			self.axis = Self::PLANAR_AXIS;
		}
	}

	/// The axis is normalized. A zero axis falls back to `DEFAULT_AXIS`.
	pub fn set_axis(&mut self, axis: Vec3) {
		let normalized = axis.normalize_or_zero();
		if normalized == Vec3::ZERO {
			tracing::warn!("Joint axis {axis} has no direction, using {}", Self::DEFAULT_AXIS);
			self.axis = Self::DEFAULT_AXIS;
		} else {
			self.axis = normalized;
		}
	}

	pub fn set_limit(&mut self, limit: Limit) {
		self.limit = limit;
	}

	pub fn set_ignore_limits(&mut self, ignore_limits: bool) {
		self.ignore_limits = ignore_limits;
	}

	pub fn kind(&self) -> JointKind {
		self.kind
	}

	pub fn values(&self) -> &[f32] {
		&self.values
	}

	/// First DoF value, `0` for joints without any.
	pub fn angle(&self) -> f32 {
		self.values.first().copied().unwrap_or(0.)
	}

	pub fn axis(&self) -> Vec3 {
		self.axis
	}

	pub fn limit(&self) -> Limit {
		self.limit
	}

	pub fn ignore_limits(&self) -> bool {
		self.ignore_limits
	}

	pub fn origin(&self) -> Option<&Transform> {
		self.origin.as_ref()
	}

	pub fn mimic(&self) -> Option<&Mimic> {
		self.mimic.as_ref()
	}

	pub fn mimic_joints(&self) -> &[NodeId] {
		&self.mimic_joints
	}

	/// Move `transform` according to `values`. Only this joint is updated, mimics are driven by the robot.
	///
	/// Excess values are ignored, missing or `None` values leave their DoF unchanged.
	/// Returns whether any stored value changed.
	pub fn apply(&mut self, transform: &mut Transform, values: &[Option<f32>]) -> bool {
		if self.kind == JointKind::Floating {
			tracing::warn!("Floating joints are not supported, ignoring update");
			return false;
		}

		let origin = *self.origin.get_or_insert(*transform);
		match self.kind {
			JointKind::Fixed | JointKind::Floating => false,
			JointKind::Continuous | JointKind::Revolute => self.apply_rotation(transform, &origin, value_at(values, 0)),
			JointKind::Prismatic => self.apply_translation(transform, &origin, value_at(values, 0)),
			JointKind::Planar => self.apply_planar(transform, &origin, values),
		}
	}

	fn limited(&self, value: f32) -> f32 {
		if self.kind.is_limited() && !self.ignore_limits {
			self.limit.clamp(value)
		} else {
			value
		}
	}

	fn apply_rotation(&mut self, transform: &mut Transform, origin: &Transform, angle: Option<f32>) -> bool {
		let Some(angle) = angle else {
			return false;
		};
		if angle == self.values[0] {
			return false;
		}

		let angle = self.limited(angle);
		transform.rotation = rotated(origin.rotation, self.axis, angle);

		store(&mut self.values[0], angle)
	}

	fn apply_translation(&mut self, transform: &mut Transform, origin: &Transform, distance: Option<f32>) -> bool {
		let Some(distance) = distance else {
			return false;
		};
		if distance == self.values[0] {
			return false;
		}

		let distance = self.limited(distance);
		let axis = transform.rotation * self.axis;
		transform.translation = origin.translation + axis * distance;

		store(&mut self.values[0], distance)
	}

	fn apply_planar(&mut self, transform: &mut Transform, origin: &Transform, values: &[Option<f32>]) -> bool {
		let requested = [value_at(values, 0), value_at(values, 1), value_at(values, 2)];
		let unchanged = requested
			.iter()
			.zip(&self.values)
			.all(|(requested, stored)| requested.map_or(true, |r| r == *stored));
		if unchanged {
			return false;
		}

		let mut changed = [false; 3];

		if requested[0].is_some() || requested[1].is_some() {
			let x = requested[0].unwrap_or(self.values[0]);
			let y = requested[1].unwrap_or(self.values[1]);

			transform.translation = origin.translation;
			transform.translation += (transform.rotation * Vec3::X) * x;
			transform.translation += (transform.rotation * Vec3::Y) * y;

			changed[0] = store(&mut self.values[0], x);
			changed[1] = store(&mut self.values[1], y);
		}

		if let Some(angle) = requested[2] {
			transform.rotation = rotated(origin.rotation, self.axis, angle);
			changed[2] = store(&mut self.values[2], angle);
		}

		changed.iter().any(|c| *c)
	}
}

fn value_at(values: &[Option<f32>], index: usize) -> Option<f32> {
	values.get(index).copied().flatten()
}

/// Rotation by `angle` about `axis`, expressed in the frame of `origin`.
fn rotated(origin: Quat, axis: Vec3, angle: f32) -> Quat {
	(origin * Quat::from_axis_angle(axis, angle)).normalize()
}

fn store(slot: &mut f32, value: f32) -> bool {
	if *slot == value {
		false
	} else {
		*slot = value;
		true
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::{Quat, Vec3};

	use super::*;

	fn apply(joint: &mut Joint, transform: &mut Transform, values: &[f32]) -> bool {
		let values: Vec<_> = values.iter().copied().map(Some).collect();
		joint.apply(transform, &values)
	}

	#[test]
	fn kind_sets_dof_count() {
		for kind in JointKind::VALUES {
			assert_eq!(Joint::new(kind).values().len(), kind.dof_count());
		}
	}

	#[test]
	fn changing_kind_resets_values() {
		let mut joint = Joint::new(JointKind::Continuous);
		let mut transform = Transform::default();
		apply(&mut joint, &mut transform, &[1.0]);
		assert_eq!(joint.values(), &[1.0]);

		joint.set_kind(JointKind::Planar);
		assert_eq!(joint.values(), &[0., 0., 0.]);
		assert_eq!(joint.axis(), Joint::PLANAR_AXIS);
	}

	#[test]
	fn kind_names_round_trip() {
		for kind in JointKind::VALUES {
			assert_eq!(JointKind::try_from(kind.as_str()).unwrap(), kind);
		}
		assert!(JointKind::try_from("ball").is_err());
	}

	#[test]
	fn axis_is_normalized() {
		let joint = Joint::continuous(Vec3::new(0., 0., 3.));
		assert_eq!(joint.axis(), Vec3::Z);

		let joint = Joint::continuous(Vec3::ZERO);
		assert_eq!(joint.axis(), Joint::DEFAULT_AXIS);
	}

	#[test]
	fn same_values_are_idempotent() {
		let cases: [(Joint, &[f32]); 5] = [
			(Joint::new(JointKind::Fixed), &[0.3]),
			(Joint::continuous(Vec3::Z), &[0.3]),
			(Joint::revolute(Vec3::Z, Limit::new(-1., 1.)), &[0.3]),
			(Joint::prismatic(Vec3::X, Limit::new(-1., 1.)), &[0.3]),
			(Joint::planar(), &[0.1, 0.2, 0.3]),
		];

		for (mut joint, values) in cases {
			let mut transform = Transform::default();
			let expect_first = joint.kind() != JointKind::Fixed;
			assert_eq!(apply(&mut joint, &mut transform, values), expect_first, "{}", joint.kind());
			assert!(!apply(&mut joint, &mut transform, values), "{}", joint.kind());
		}
	}

	#[test]
	fn revolute_clamps_into_limit() {
		let limit = Limit::new(-0.5, 0.75);
		for requested in [-3.0, -0.5, -0.1, 0.0, 0.6, 0.75, 2.0] {
			let mut joint = Joint::revolute(Vec3::Z, limit);
			let mut transform = Transform::default();
			apply(&mut joint, &mut transform, &[requested]);
			assert_eq!(joint.angle(), limit.clamp(requested));
		}
	}

	#[test]
	fn prismatic_clamps_into_limit() {
		let limit = Limit::new(0., 0.2);
		let mut joint = Joint::prismatic(Vec3::Y, limit);
		let mut transform = Transform::default();

		assert!(apply(&mut joint, &mut transform, &[1.0]));
		assert_eq!(joint.angle(), 0.2);
		assert!(transform.translation.abs_diff_eq(Vec3::new(0., 0.2, 0.), 1e-6));

		// clamps to the same stored value
		assert!(!apply(&mut joint, &mut transform, &[5.0]));
	}

	#[test]
	fn ignored_limits_keep_requested_value() {
		for requested in [-3.0, 0.25, 9.5] {
			let mut joint = Joint::revolute(Vec3::Z, Limit::new(0., 0.1)).with_ignore_limits(true);
			let mut transform = Transform::default();
			apply(&mut joint, &mut transform, &[requested]);
			assert_eq!(joint.angle(), requested);

			let mut joint = Joint::prismatic(Vec3::Z, Limit::new(0., 0.1)).with_ignore_limits(true);
			apply(&mut joint, &mut transform, &[requested]);
			assert_eq!(joint.angle(), requested);
		}
	}

	#[test]
	fn continuous_is_never_clamped() {
		let mut joint = Joint::continuous(Vec3::Z).with_limit(Limit::new(0., 0.1));
		let mut transform = Transform::default();
		apply(&mut joint, &mut transform, &[10.0]);
		assert_eq!(joint.angle(), 10.0);
	}

	#[test]
	fn rotation_is_relative_to_origin() {
		let start = Quat::from_rotation_x(FRAC_PI_2);
		let mut transform = Transform::new(Vec3::ZERO, start);
		let mut joint = Joint::continuous(Vec3::Z);

		apply(&mut joint, &mut transform, &[0.4]);
		apply(&mut joint, &mut transform, &[FRAC_PI_2]);

		let expected = start * Quat::from_rotation_z(FRAC_PI_2);
		assert!(transform.rotation.abs_diff_eq(expected, 1e-6));
		assert!(transform.rotation.is_normalized());
		assert!(joint.origin().unwrap().rotation.abs_diff_eq(start, 1e-6));
	}

	#[test]
	fn prismatic_is_not_cumulative() {
		let start = Vec3::new(1., 2., 3.);
		let mut transform = Transform::default().with_translation(start);
		let mut joint = Joint::prismatic(Vec3::X, Limit::new(-2., 2.));

		apply(&mut joint, &mut transform, &[1.0]);
		apply(&mut joint, &mut transform, &[0.5]);

		assert!(transform.translation.abs_diff_eq(start + Vec3::new(0.5, 0., 0.), 1e-6));
	}

	#[test]
	fn prismatic_axis_follows_node_rotation() {
		let mut transform = Transform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2));
		let mut joint = Joint::prismatic(Vec3::X, Limit::new(-2., 2.));

		apply(&mut joint, &mut transform, &[1.0]);
		assert!(transform.translation.abs_diff_eq(Vec3::Y, 1e-6));
	}

	#[test]
	fn planar_translation_is_not_cumulative() {
		let mut transform = Transform::default();
		let mut joint = Joint::planar();

		apply(&mut joint, &mut transform, &[1.0, 1.0, 0.0]);
		apply(&mut joint, &mut transform, &[0.5, 0.25, 0.0]);

		assert!(transform.translation.abs_diff_eq(Vec3::new(0.5, 0.25, 0.), 1e-6));
	}

	#[test]
	fn planar_rotation_only_keeps_xy() {
		let mut transform = Transform::default();
		let mut joint = Joint::planar();
		apply(&mut joint, &mut transform, &[0.1, 0.2, 0.0]);
		let translation = transform.translation;

		assert!(joint.apply(&mut transform, &[None, None, Some(0.4)]));
		assert_eq!(joint.values(), &[0.1, 0.2, 0.4]);
		assert_eq!(transform.translation, translation);
		assert!(transform.rotation.abs_diff_eq(Quat::from_rotation_z(0.4), 1e-6));
	}

	#[test]
	fn planar_partial_translation_keeps_other_axis() {
		let mut transform = Transform::default();
		let mut joint = Joint::planar();
		apply(&mut joint, &mut transform, &[0.3, 0.6, 0.0]);

		assert!(joint.apply(&mut transform, &[None, Some(0.1)]));
		assert_eq!(joint.values(), &[0.3, 0.1, 0.0]);
		assert!(transform.translation.abs_diff_eq(Vec3::new(0.3, 0.1, 0.), 1e-6));
	}

	#[test]
	fn floating_is_ignored() {
		let mut transform = Transform::default().with_translation(Vec3::ONE);
		let mut joint = Joint::floating();

		assert!(!apply(&mut joint, &mut transform, &[1., 2., 3., 4., 5., 6.]));
		assert_eq!(joint.values(), &[0.; 6]);
		assert_eq!(transform.translation, Vec3::ONE);
		assert!(joint.origin().is_none());
	}

	#[test]
	fn fixed_never_moves() {
		let start = Transform::from_xyz_rpy(Vec3::new(0., 1., 0.), Vec3::new(0.1, 0.2, 0.3));
		let mut transform = start;
		let mut joint = Joint::default();

		let inputs: [&[f32]; 3] = [&[1.0], &[], &[1., 2., 3.]];
		for values in inputs {
			assert!(!apply(&mut joint, &mut transform, values));
		}
		assert_eq!(transform, start);
	}

	#[test]
	fn missing_values_change_nothing() {
		let mut transform = Transform::default();
		let mut joint = Joint::continuous(Vec3::Z);
		assert!(!joint.apply(&mut transform, &[]));
		assert!(!joint.apply(&mut transform, &[None]));
		assert_eq!(transform, Transform::default());
	}

	#[test]
	fn mimic_map_is_affine() {
		let mut arena = indextree::Arena::new();
		let source = arena.new_node(());
		let mimic = Mimic::new(source, 2., 0.1);

		let mapped = mimic.map(&[Some(0.3), None]);
		assert!((mapped[0].unwrap() - 0.7).abs() < 1e-6);
		assert_eq!(mapped[1], None);
	}

	#[test]
	fn joint_values_conversions() {
		assert_eq!(JointValues::from(0.5).0, vec![Some(0.5)]);
		assert_eq!(JointValues::from([0.1, 0.2]).0, vec![Some(0.1), Some(0.2)]);
		assert_eq!(JointValues::from(vec![None, Some(1.)]).0, vec![None, Some(1.)]);
	}
}
