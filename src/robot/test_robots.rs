use glam::Vec3;

use crate::math::transform::Transform;
use crate::node::joint::{Joint, Limit};
use crate::node::{DocumentRef, UrdfNode};

use super::{Robot, RobotBuilder};

fn offset(x: f32, y: f32, z: f32) -> Transform {
	Transform::default().with_translation(Vec3::new(x, y, z))
}

/// Arm with a prismatic carriage, a mimicking gripper, a fixed tool mount driving a mimic,
/// plus a planar table and a floating drone hanging off the base.
pub(crate) fn sample_arm() -> Robot {
	let mut builder = RobotBuilder::new("sample_arm", "base_link");
	let base = builder.root();

	let shoulder = builder
		.add(
			base,
			UrdfNode::joint("shoulder", Joint::revolute(Vec3::Z, Limit::new(-1.5, 1.5)))
				.with_transform(offset(0., 0., 0.5))
				.with_document(DocumentRef(1)),
		)
		.unwrap();
	let upper_arm = builder.add(shoulder, UrdfNode::link("upper_arm")).unwrap();
	builder.add(upper_arm, UrdfNode::visual("upper_arm_visual")).unwrap();
	builder.add(upper_arm, UrdfNode::collider("upper_arm_collision")).unwrap();

	let slider = builder
		.add(
			upper_arm,
			UrdfNode::joint("slider", Joint::prismatic(Vec3::X, Limit::new(0., 1.))).with_transform(offset(0., 0., 1.)),
		)
		.unwrap();
	let carriage = builder.add(slider, UrdfNode::link("carriage")).unwrap();

	let left = builder
		.add(
			carriage,
			UrdfNode::joint("finger_left_joint", Joint::revolute(Vec3::Y, Limit::new(0., 0.8))),
		)
		.unwrap();
	builder.add(left, UrdfNode::link("finger_left")).unwrap();
	let right = builder
		.add_mimic(
			carriage,
			UrdfNode::joint("finger_right_joint", Joint::revolute(Vec3::Y, Limit::new(-0.8, 0.))),
			"finger_left_joint",
			-1.,
			0.,
		)
		.unwrap();
	builder.add(right, UrdfNode::link("finger_right")).unwrap();

	let wrist = builder
		.add(carriage, UrdfNode::joint("wrist_mount", Joint::default()).with_transform(offset(0., 0., 0.2)))
		.unwrap();
	let tool = builder.add(wrist, UrdfNode::link("tool")).unwrap();
	let roll = builder
		.add_mimic(tool, UrdfNode::joint("tool_roll", Joint::continuous(Vec3::Z)), "wrist_mount", 2., 0.1)
		.unwrap();
	builder.add(roll, UrdfNode::link("tool_tip")).unwrap();

	let table = builder.add(base, UrdfNode::joint("table", Joint::planar())).unwrap();
	builder.add(table, UrdfNode::link("table_top")).unwrap();

	let mount = builder.add(base, UrdfNode::joint("drone_mount", Joint::floating())).unwrap();
	builder.add(mount, UrdfNode::link("drone")).unwrap();

	builder.build().unwrap()
}
