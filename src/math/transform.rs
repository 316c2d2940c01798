use glam::{EulerRot, Mat4, Quat, Vec3};

/// relative transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
	/// X Y Z
	pub translation: Vec3,
	/// Always kept unit length
	pub rotation: Quat,
}

impl Default for Transform {
	fn default() -> Self {
		Self {
			translation: Vec3::ZERO,
			rotation: Quat::IDENTITY,
		}
	}
}

impl Transform {
	pub fn new(translation: Vec3, rotation: Quat) -> Self {
		Self {
			translation,
			rotation: rotation.normalize(),
		}
	}

	/// URDF style origin: `rpy` are fixed-axis roll, pitch, yaw (applied X, then Y, then Z).
	pub fn from_xyz_rpy(xyz: Vec3, rpy: Vec3) -> Self {
		Self::new(xyz, Quat::from_euler(EulerRot::ZYX, rpy.z, rpy.y, rpy.x))
	}

	pub fn with_translation(mut self, translation: Vec3) -> Self {
		self.translation = translation;
		self
	}

	pub fn with_rotation(mut self, rotation: Quat) -> Self {
		self.rotation = rotation.normalize();
		self
	}

	pub fn to_matrix(&self) -> Mat4 {
		Mat4::from_rotation_translation(self.rotation, self.translation)
	}
}
