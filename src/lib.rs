pub mod math;
pub mod node;
pub mod robot;

pub use node::joint::{Joint, JointKind, JointValues, Limit, Mimic};
pub use node::{DocumentRef, NodeId, NodeKind, UrdfNode};
pub use robot::{BuildRobotError, Robot, RobotBuilder};
