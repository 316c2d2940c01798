use clap::Parser;
use glam::Vec3;
use urdf_rig::math::transform::Transform;
use urdf_rig::{BuildRobotError, Joint, JointValues, Limit, Robot, RobotBuilder, UrdfNode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(
		help = "Joint assignments, e.g. `shoulder=0.4` or `table=0.1,_,0.3` (`_` leaves a value unchanged)",
		value_parser = parse_assignment
	)]
	assignments: Vec<(String, JointValues)>,
	#[arg(long, help = "Ignore joint limits on every joint")]
	ignore_limits: bool,
}

fn parse_assignment(arg: &str) -> Result<(String, JointValues), String> {
	let (name, values) = arg
		.split_once('=')
		.ok_or_else(|| format!("expected NAME=VALUE[,VALUE...], got {arg:?}"))?;

	let values = values
		.split(',')
		.map(|value| match value.trim() {
			"_" => Ok(None),
			value => value.parse::<f32>().map(Some).map_err(|e| format!("{value:?}: {e}")),
		})
		.collect::<Result<Vec<_>, _>>()?;

	Ok((name.to_owned(), JointValues::from(values)))
}

fn demo_arm(ignore_limits: bool) -> Result<Robot, BuildRobotError> {
	let up = |z: f32| Transform::default().with_translation(Vec3::new(0., 0., z));

	let mut builder = RobotBuilder::new("demo_arm", "base_link");
	let base = builder.root();

	let shoulder = builder.add(
		base,
		UrdfNode::joint(
			"shoulder",
			Joint::revolute(Vec3::Z, Limit::new(-1.5, 1.5)).with_ignore_limits(ignore_limits),
		)
		.with_transform(up(0.5)),
	)?;
	let upper_arm = builder.add(shoulder, UrdfNode::link("upper_arm"))?;
	builder.add(upper_arm, UrdfNode::visual("upper_arm_visual"))?;

	let elbow = builder.add(
		upper_arm,
		UrdfNode::joint(
			"elbow",
			Joint::revolute(Vec3::Y, Limit::new(-2., 2.)).with_ignore_limits(ignore_limits),
		)
		.with_transform(up(1.)),
	)?;
	let forearm = builder.add(elbow, UrdfNode::link("forearm"))?;

	let slider = builder.add(
		forearm,
		UrdfNode::joint(
			"extend",
			Joint::prismatic(Vec3::Z, Limit::new(0., 0.4)).with_ignore_limits(ignore_limits),
		)
		.with_transform(up(0.8)),
	)?;
	let hand = builder.add(slider, UrdfNode::link("hand"))?;

	let left = builder.add(
		hand,
		UrdfNode::joint("finger_left_joint", Joint::prismatic(Vec3::Y, Limit::new(0., 0.05))),
	)?;
	builder.add(left, UrdfNode::link("finger_left"))?;
	let right = builder.add_mimic(
		hand,
		UrdfNode::joint("finger_right_joint", Joint::prismatic(Vec3::Y, Limit::new(-0.05, 0.))),
		"finger_left_joint",
		-1.,
		0.,
	)?;
	builder.add(right, UrdfNode::link("finger_right"))?;

	let table = builder.add(base, UrdfNode::joint("table", Joint::planar()))?;
	builder.add(table, UrdfNode::link("table_top"))?;

	builder.build()
}

fn main() {
	tracing_subscriber::fmt::init();

	let cli = Cli::parse();
	let mut robot = demo_arm(cli.ignore_limits).unwrap();

	let changed = robot.set_joint_values(cli.assignments);
	robot.update_world_transforms();

	println!("== Joints (changed: {changed}) ==\n{robot}");
	println!("== Link positions ==");
	let mut links: Vec<_> = robot.links().keys().cloned().collect();
	links.sort();
	for name in links {
		if let Some(position) = robot.world_position(&name) {
			println!("{name:>14}: [{:.3}, {:.3}, {:.3}]", position.x, position.y, position.z);
		}
	}
}
